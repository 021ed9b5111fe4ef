// Ledger module - the token contract: state, rules, interface and events

mod events;
mod interface;
mod token;

pub use events::{Log, TokenEvent};
pub use interface::{decode_revert, encode_revert, AbiError, TokenCall, IERC20};
pub use token::{TokenError, TokenInit, TokenLedger};
