// RpcHost - JSON-RPC 2.0 over HTTP
//
// Talks to any node exposing the standard eth_* methods. Reverts reported
// by the node (error code 3 or an "execution reverted" message) become
// `HostError::Reverted` with the decoded `Error(string)` reason when the
// node includes revert data.

use crate::host::{CallRequest, HostError, LedgerHost, Receipt, ReceiptStatus, SignedTransaction, TxHash};
use crate::identity::Address;
use crate::ledger::{decode_revert, Log};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

// ============================================================================
// CONFIG
// ============================================================================

/// Configuration for the JSON-RPC host
#[derive(Clone, Debug)]
pub struct RpcHostConfig {
    /// Endpoint URL of the node
    pub url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl RpcHostConfig {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            timeout_secs: 30,
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), HostError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(HostError::Unreachable(format!(
                "unsupported endpoint url: {}",
                self.url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(HostError::Unreachable("timeout_secs must be > 0".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: String,
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    gas_used: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    contract_address: Option<String>,
    #[serde(default)]
    logs: Vec<RpcLog>,
}

#[derive(Deserialize)]
struct RpcLog {
    address: String,
    topics: Vec<String>,
    data: String,
}

// ============================================================================
// RPC HOST
// ============================================================================

/// Ledger host backed by a JSON-RPC node
pub struct RpcHost {
    config: RpcHostConfig,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl RpcHost {
    /// Create a host for the configured endpoint
    pub fn new(config: RpcHostConfig) -> Result<Self, HostError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HostError::Unreachable(e.to_string()))?;

        Ok(Self {
            config,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, HostError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "rpc request");

        let response: RpcResponse = self
            .client
            .post(&self.config.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| HostError::Unreachable(e.to_string()))?
            .json()
            .await
            .map_err(|e| HostError::InvalidResponse(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(map_rpc_error(error));
        }

        serde_json::from_value(response.result.unwrap_or(Value::Null))
            .map_err(|e| HostError::InvalidResponse(format!("{}: {}", method, e)))
    }
}

fn call_object(request: &CallRequest) -> Value {
    let mut object = serde_json::Map::new();
    if let Some(from) = &request.from {
        object.insert("from".into(), Value::String(from.to_hex()));
    }
    if let Some(to) = &request.to {
        object.insert("to".into(), Value::String(to.to_hex()));
    }
    object.insert("data".into(), Value::String(encode_data(&request.data)));
    Value::Object(object)
}

fn map_rpc_error(error: RpcErrorObject) -> HostError {
    let revert_reason = error
        .data
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|data| decode_data(data).ok())
        .and_then(|bytes| decode_revert(&bytes));

    let is_revert = error.code == 3 || error.message.contains("revert");
    if is_revert {
        let reason = revert_reason.unwrap_or_else(|| {
            error
                .message
                .trim_start_matches("execution reverted")
                .trim_start_matches(':')
                .trim()
                .to_string()
        });
        HostError::Reverted { reason }
    } else {
        HostError::Rpc {
            code: error.code,
            message: error.message,
        }
    }
}

/// `0x`-prefixed hex of arbitrary bytes
pub(crate) fn encode_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub(crate) fn decode_data(s: &str) -> Result<Vec<u8>, HostError> {
    let body = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(body).map_err(|e| HostError::InvalidResponse(format!("bad hex data: {}", e)))
}

pub(crate) fn decode_quantity(s: &str) -> Result<u128, HostError> {
    let body = s
        .strip_prefix("0x")
        .ok_or_else(|| HostError::InvalidResponse(format!("quantity without 0x: {}", s)))?;
    if body.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(body, 16)
        .map_err(|e| HostError::InvalidResponse(format!("bad quantity {}: {}", s, e)))
}

fn decode_u64(s: &str) -> Result<u64, HostError> {
    u64::try_from(decode_quantity(s)?)
        .map_err(|_| HostError::InvalidResponse(format!("quantity out of range: {}", s)))
}

fn decode_word(s: &str) -> Result<[u8; 32], HostError> {
    decode_data(s)?
        .try_into()
        .map_err(|_| HostError::InvalidResponse(format!("expected 32-byte word: {}", s)))
}

fn decode_address(s: &str) -> Result<Address, HostError> {
    Address::parse(s).map_err(|e| HostError::InvalidResponse(e.to_string()))
}

impl RpcReceipt {
    /// Convert to a receipt; one without a block number is still pending
    fn into_receipt(self) -> Result<Option<Receipt>, HostError> {
        let Some(block_number) = self.block_number.as_deref().map(decode_u64).transpose()? else {
            return Ok(None);
        };

        let tx_hash = TxHash::parse(&self.transaction_hash).ok_or_else(|| {
            HostError::InvalidResponse(format!("bad transaction hash: {}", self.transaction_hash))
        })?;

        let status = match self.status.as_deref() {
            Some(s) if decode_quantity(s)? == 0 => ReceiptStatus::Reverted,
            _ => ReceiptStatus::Success,
        };

        let logs = self
            .logs
            .into_iter()
            .map(|log| {
                Ok(Log {
                    address: decode_address(&log.address)?,
                    topics: log
                        .topics
                        .iter()
                        .map(|t| decode_word(t))
                        .collect::<Result<Vec<_>, HostError>>()?,
                    data: decode_data(&log.data)?,
                })
            })
            .collect::<Result<Vec<_>, HostError>>()?;

        Ok(Some(Receipt {
            tx_hash,
            block_number,
            gas_used: decode_u64(self.gas_used.as_deref().ok_or_else(|| {
                HostError::InvalidResponse("mined receipt without gasUsed".to_string())
            })?)?,
            revert_reason: (status == ReceiptStatus::Reverted)
                .then(|| "transaction reverted".to_string()),
            status,
            contract_address: self
                .contract_address
                .as_deref()
                .map(decode_address)
                .transpose()?,
            logs,
        }))
    }
}

// ============================================================================
// LEDGER HOST
// ============================================================================

#[async_trait]
impl LedgerHost for RpcHost {
    async fn chain_id(&self) -> Result<u64, HostError> {
        let id: String = self.request("eth_chainId", json!([])).await?;
        decode_u64(&id)
    }

    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, HostError> {
        let data: String = self
            .request("eth_call", json!([call_object(request), "latest"]))
            .await?;
        decode_data(&data)
    }

    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, HostError> {
        let gas: String = self
            .request("eth_estimateGas", json!([call_object(request)]))
            .await?;
        decode_u64(&gas)
    }

    async fn gas_price(&self) -> Result<u128, HostError> {
        let price: String = self.request("eth_gasPrice", json!([])).await?;
        decode_quantity(&price)
    }

    async fn transaction_count(&self, account: &Address) -> Result<u64, HostError> {
        let count: String = self
            .request("eth_getTransactionCount", json!([account.to_hex(), "pending"]))
            .await?;
        decode_u64(&count)
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<TxHash, HostError> {
        let hash: String = self
            .request("eth_sendRawTransaction", json!([encode_data(&tx.raw())]))
            .await
            .map_err(|e| match e {
                HostError::Rpc { message, .. } => HostError::Rejected(message),
                other => other,
            })?;
        TxHash::parse(&hash)
            .ok_or_else(|| HostError::InvalidResponse(format!("bad transaction hash: {}", hash)))
    }

    async fn receipt(&self, hash: &TxHash) -> Result<Option<Receipt>, HostError> {
        let receipt: Option<RpcReceipt> = self
            .request("eth_getTransactionReceipt", json!([hash.to_hex()]))
            .await?;
        match receipt {
            Some(receipt) => receipt.into_receipt(),
            None => Ok(None),
        }
    }
}
