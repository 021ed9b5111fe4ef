//! tokendash - client, dashboard and scripts for ERC-20 style tokens
//!
//! The library is layered leaves first: `identity` and `units` hold the
//! primitives, `ledger` the token contract, `host` the networks that run it,
//! then `session`, `workflow` and `dashboard` for the client side and
//! `scripts` for the development-network scenarios.

pub mod config;
pub mod dashboard;
pub mod host;
pub mod identity;
pub mod ledger;
pub mod scripts;
pub mod session;
pub mod storage;
pub mod units;
pub mod workflow;
