// Scripts module - deployment and scenario runs against the development network

mod common;
mod deploy;
mod simulate;
mod walkthrough;

pub use common::*;
pub use deploy::*;
pub use simulate::*;
pub use walkthrough::*;
