// ClientConfig - what a session expects of the network it talks to

use crate::identity::Address;
use std::time::Duration;
use thiserror::Error;

/// Chain id the dashboard expects by default (Sepolia)
pub const DEFAULT_CHAIN_ID: u64 = 11_155_111;

/// Display name of the default network
pub const DEFAULT_NETWORK_NAME: &str = "Sepolia";

/// Transaction link prefix of the default network's block explorer
pub const DEFAULT_EXPLORER_URL: &str = "https://sepolia.etherscan.io/tx/";

/// Errors from loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse settings file: {0}")]
    Parse(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Configuration for a client session
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Chain id the session expects; a mismatch is a warning
    pub expected_chain_id: u64,
    /// Human name of the expected network, used in messages
    pub network_name: String,
    /// Prefix joined with a transaction hash to form an explorer link
    pub explorer_url: String,
    /// Token contract the session reads and mutates
    pub token_address: Option<Address>,
    /// How long to wait for a receipt before declaring failure
    pub confirmation_timeout_secs: u64,
    /// Delay between receipt polls
    pub poll_interval_ms: u64,
}

impl ClientConfig {
    /// Create a new config with builder pattern
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expected_chain_id(mut self, chain_id: u64) -> Self {
        self.expected_chain_id = chain_id;
        self
    }

    pub fn with_network_name(mut self, name: &str) -> Self {
        self.network_name = name.to_string();
        self
    }

    pub fn with_explorer_url(mut self, url: &str) -> Self {
        self.explorer_url = url.to_string();
        self
    }

    pub fn with_token_address(mut self, address: Address) -> Self {
        self.token_address = Some(address);
        self
    }

    pub fn with_confirmation_timeout_secs(mut self, secs: u64) -> Self {
        self.confirmation_timeout_secs = secs;
        self
    }

    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expected_chain_id == 0 {
            return Err(ConfigError::Invalid(
                "expected_chain_id must be > 0".to_string(),
            ));
        }
        if self.confirmation_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "confirmation_timeout_secs must be > 0".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be > 0".to_string(),
            ));
        }
        if self.explorer_url.is_empty() {
            return Err(ConfigError::Invalid("explorer_url is empty".to_string()));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            expected_chain_id: DEFAULT_CHAIN_ID,
            network_name: DEFAULT_NETWORK_NAME.to_string(),
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            token_address: None,
            confirmation_timeout_secs: 120,
            poll_interval_ms: 500,
        }
    }
}
