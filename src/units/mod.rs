// Units module - smallest-unit amounts and decimal string conversion

mod amount;
mod convert;

pub use amount::Amount;
pub use convert::{format_units, parse_units, unit_scale, UnitsError};
