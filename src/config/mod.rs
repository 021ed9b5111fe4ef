// Config module - client configuration and file/environment settings

mod client;
mod settings;

pub use client::*;
pub use settings::*;
