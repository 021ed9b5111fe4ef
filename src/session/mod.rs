// Session module - connection plus signing identity
// Reads token state and submits signed mutations on behalf of one account

mod client;
mod token;

pub use client::*;
pub use token::*;
