// Settings - optional `tokendash.toml` plus TOKENDASH_* environment overrides

use super::{ClientConfig, ConfigError};
use crate::identity::{Address, Keypair};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings file read from the working directory when present
pub const SETTINGS_FILE: &str = "tokendash.toml";

/// Environment variables that override file settings
pub mod env {
    pub const RPC_URL: &str = "TOKENDASH_RPC_URL";
    pub const PRIVATE_KEY: &str = "TOKENDASH_PRIVATE_KEY";
    pub const TOKEN_ADDRESS: &str = "TOKENDASH_TOKEN_ADDRESS";
    pub const CHAIN_ID: &str = "TOKENDASH_CHAIN_ID";
    pub const EXPLORER_URL: &str = "TOKENDASH_EXPLORER_URL";
    pub const DATA_DIR: &str = "TOKENDASH_DATA_DIR";
}

/// Raw settings as written by the user
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// JSON-RPC endpoint; without one the local development network is used
    pub rpc_url: Option<String>,
    /// Hex private key of the signing account
    pub private_key: Option<String>,
    pub token_address: Option<String>,
    pub chain_id: Option<u64>,
    pub network_name: Option<String>,
    pub explorer_url: Option<String>,
    /// Where the development network keeps its chain
    pub data_dir: PathBuf,
    pub confirmation_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rpc_url: None,
            private_key: None,
            token_address: None,
            chain_id: None,
            network_name: None,
            explorer_url: None,
            data_dir: PathBuf::from(".tokendash"),
            confirmation_timeout_secs: None,
        }
    }
}

impl Settings {
    /// Load `path` (or `tokendash.toml` when `None`) if it exists, then apply
    /// environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or_else(|| Path::new(SETTINGS_FILE));
        let mut settings = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply overrides from `lookup`, keyed by the `env` variable names
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(env::RPC_URL) {
            self.rpc_url = Some(v);
        }
        if let Some(v) = lookup(env::PRIVATE_KEY) {
            self.private_key = Some(v);
        }
        if let Some(v) = lookup(env::TOKEN_ADDRESS) {
            self.token_address = Some(v);
        }
        if let Some(v) = lookup(env::CHAIN_ID) {
            let parsed = v.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                key: env::CHAIN_ID.to_string(),
                message: e.to_string(),
            })?;
            self.chain_id = Some(parsed);
        }
        if let Some(v) = lookup(env::EXPLORER_URL) {
            self.explorer_url = Some(v);
        }
        if let Some(v) = lookup(env::DATA_DIR) {
            self.data_dir = PathBuf::from(v);
        }
        Ok(())
    }

    /// Build and validate the session configuration
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let mut config = ClientConfig::new();
        if let Some(chain_id) = self.chain_id {
            config = config.with_expected_chain_id(chain_id);
        }
        if let Some(name) = &self.network_name {
            config = config.with_network_name(name);
        }
        if let Some(url) = &self.explorer_url {
            config = config.with_explorer_url(url);
        }
        if let Some(secs) = self.confirmation_timeout_secs {
            config = config.with_confirmation_timeout_secs(secs);
        }
        if let Some(address) = self.token_address()? {
            config = config.with_token_address(address);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn token_address(&self) -> Result<Option<Address>, ConfigError> {
        self.token_address
            .as_deref()
            .map(|s| {
                Address::parse(s).map_err(|e| ConfigError::InvalidValue {
                    key: "token_address".to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    /// The configured signing key, if any
    pub fn signer(&self) -> Result<Option<Keypair>, ConfigError> {
        self.private_key
            .as_deref()
            .map(|s| {
                Keypair::from_hex(s).map_err(|e| ConfigError::InvalidValue {
                    key: "private_key".to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }
}
