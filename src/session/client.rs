// Session - an established connection with an authenticated identity

use super::TokenHandle;
use crate::config::{ClientConfig, ConfigError};
use crate::host::{CallRequest, HostError, LedgerHost, TransactionRequest, TxHash, MAX_CHAIN_ID};
use crate::identity::{Address, Keypair};
use crate::ledger::AbiError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

// ============================================================================
// ERRORS AND WARNINGS
// ============================================================================

/// Errors from establishing or using a session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("No token address configured")]
    NoToken,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("Unexpected token response: {0}")]
    Decode(#[from] AbiError),
}

/// Non-fatal conditions noticed while establishing a session
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionWarning {
    /// The host reports a different chain than configured
    ChainMismatch {
        expected: u64,
        actual: u64,
        network: String,
    },
}

impl fmt::Display for SessionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionWarning::ChainMismatch {
                expected,
                actual,
                network,
            } => write!(
                f,
                "connected to chain {}, expected {} (chain {})",
                actual, network, expected
            ),
        }
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// Connection plus signing identity
pub struct Session {
    host: Arc<dyn LedgerHost>,
    signer: Keypair,
    address: Address,
    chain_id: u64,
    config: ClientConfig,
    warnings: Vec<SessionWarning>,
    /// Next nonce this session expects to use; held while submitting
    next_nonce: Mutex<u64>,
}

impl Session {
    /// Establish a session against `host` signing with `signer`
    ///
    /// Fails with `SessionError::Connection` when no signer is available or
    /// the host cannot be reached or reports a chain id that cannot be signed
    /// for. A chain id other than the configured one is recorded as a warning.
    pub async fn establish(
        host: Arc<dyn LedgerHost>,
        signer: Option<Keypair>,
        config: ClientConfig,
    ) -> Result<Self, SessionError> {
        config.validate()?;

        let signer = signer
            .ok_or_else(|| SessionError::Connection("no signing key available".to_string()))?;
        let address = signer.address();

        let chain_id = host
            .chain_id()
            .await
            .map_err(|e| SessionError::Connection(e.to_string()))?;
        if chain_id == 0 || chain_id > MAX_CHAIN_ID {
            return Err(SessionError::Connection(format!(
                "unsupported chain id {}",
                chain_id
            )));
        }

        let mut warnings = Vec::new();
        if chain_id != config.expected_chain_id {
            let warning = SessionWarning::ChainMismatch {
                expected: config.expected_chain_id,
                actual: chain_id,
                network: config.network_name.clone(),
            };
            warn!(%warning, "unexpected network");
            warnings.push(warning);
        }

        info!(account = %address, chain_id, "session established");

        Ok(Self {
            host,
            signer,
            address,
            chain_id,
            config,
            warnings,
            next_nonce: Mutex::new(0),
        })
    }

    /// Address of the signing account
    pub fn address(&self) -> Address {
        self.address
    }

    /// Chain id reported by the host
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn host(&self) -> &Arc<dyn LedgerHost> {
        &self.host
    }

    pub fn warnings(&self) -> &[SessionWarning] {
        &self.warnings
    }

    /// Whether the host is on the configured network
    pub fn on_expected_network(&self) -> bool {
        self.chain_id == self.config.expected_chain_id
    }

    /// Handle for the configured token
    pub fn token(&self) -> Result<TokenHandle, SessionError> {
        self.config
            .token_address
            .map(|address| self.token_at(address))
            .ok_or(SessionError::NoToken)
    }

    /// Handle for the token at `address`
    pub fn token_at(&self, address: Address) -> TokenHandle {
        TokenHandle::new(self.host.clone(), address, self.address)
    }

    /// Explorer link for a transaction
    pub fn explorer_url(&self, hash: &TxHash) -> String {
        format!("{}{}", self.config.explorer_url, hash)
    }

    // ========================================================================
    // SUBMISSION
    // ========================================================================

    /// Estimate gas for sending `data` to `to` (`None` deploys) from this account
    pub async fn estimate(&self, to: Option<Address>, data: &[u8]) -> Result<u64, HostError> {
        let request = CallRequest {
            from: Some(self.address),
            to,
            data: data.to_vec(),
        };
        self.host.estimate_gas(&request).await
    }

    /// Sign and send a transaction with the given gas limit
    ///
    /// Nonces come from the host's pending count, never below the last one
    /// this session used, so back-to-back submissions do not collide.
    pub async fn submit(
        &self,
        to: Option<Address>,
        data: Vec<u8>,
        gas_limit: u64,
    ) -> Result<TxHash, HostError> {
        let mut next_nonce = self.next_nonce.lock().await;

        let pending = self.host.transaction_count(&self.address).await?;
        let nonce = pending.max(*next_nonce);
        let gas_price = self.host.gas_price().await?;

        let tx = TransactionRequest {
            nonce,
            gas_price,
            gas_limit,
            to,
            value: 0,
            data,
            chain_id: self.chain_id,
        }
        .sign(&self.signer)
        .map_err(|e| HostError::Rejected(e.to_string()))?;

        let hash = self.host.send_transaction(&tx).await?;
        *next_nonce = nonce + 1;

        debug!(tx = %hash, nonce, gas_limit, "submitted transaction");
        Ok(hash)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}
