// Host Traits and Core Types
// Defines the LedgerHost trait every network backend implements

use crate::host::{SignedTransaction, TxHash};
use crate::identity::Address;
use crate::ledger::{Log, TokenEvent};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// HOST ERROR
// ============================================================================

/// Errors reported by a ledger host
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Host unreachable: {0}")]
    Unreachable(String),

    #[error("execution reverted: {reason}")]
    Reverted { reason: String },

    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No contract deployed at {0}")]
    NoContract(Address),
}

// ============================================================================
// CALL REQUEST
// ============================================================================

/// Read-only call or gas estimation request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    /// `None` estimates a contract creation
    pub to: Option<Address>,
    pub data: Vec<u8>,
}

impl CallRequest {
    /// Call `to` with `data` from no particular account
    pub fn new(to: Address, data: Vec<u8>) -> Self {
        Self {
            from: None,
            to: Some(to),
            data,
        }
    }

    /// Set the calling account
    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }
}

// ============================================================================
// RECEIPT
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// Outcome of a mined transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
    pub status: ReceiptStatus,
    pub revert_reason: Option<String>,
    pub contract_address: Option<Address>,
    pub logs: Vec<Log>,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.status == ReceiptStatus::Success
    }

    /// Token events decoded from the logs
    pub fn events(&self) -> Vec<TokenEvent> {
        self.logs.iter().filter_map(TokenEvent::from_log).collect()
    }
}

// ============================================================================
// LEDGER HOST TRAIT
// ============================================================================

/// A network that executes token calls and transactions
#[async_trait]
pub trait LedgerHost: Send + Sync {
    /// Identifier of the network
    async fn chain_id(&self) -> Result<u64, HostError>;

    /// Execute a read-only call and return the raw output
    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, HostError>;

    /// Gas a transaction would use; fails if it would revert
    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, HostError>;

    /// Current gas price
    async fn gas_price(&self) -> Result<u128, HostError>;

    /// Next nonce for `account`, counting pending transactions
    async fn transaction_count(&self, account: &Address) -> Result<u64, HostError>;

    /// Submit a signed transaction; accepted does not mean executed
    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<TxHash, HostError>;

    /// Receipt of a mined transaction, `None` while pending
    async fn receipt(&self, hash: &TxHash) -> Result<Option<Receipt>, HostError>;
}
