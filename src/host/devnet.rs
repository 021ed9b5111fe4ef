// DevNetwork - in-process development chain
//
// Executes the built-in token contract for every deployed address.
// Transactions are validated (signature, chain id, nonce, gas) on
// submission and executed when mined: immediately in `Instant` mode, on
// `mine()` in `Manual` mode. State can be persisted to a ChainStore so
// separate script runs share one chain.

use crate::host::{
    CallRequest, HostError, LedgerHost, Receipt, ReceiptStatus, SignedTransaction, TxHash,
    MAX_CHAIN_ID,
};
use crate::identity::{Address, Keypair};
use crate::ledger::{Log, TokenCall, TokenError, TokenEvent, TokenInit, TokenLedger, IERC20};
use crate::storage::{ChainStore, StoreError};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Chain id of the development network
pub const DEV_CHAIN_ID: u64 = 31337;

/// Gas every transaction pays before execution
pub const TX_BASE_GAS: u64 = 21_000;

const READ_GAS: u64 = 3_000;
const TRANSFER_GAS: u64 = 30_000;
const APPROVE_GAS: u64 = 25_000;
const TRANSFER_FROM_GAS: u64 = 40_000;
const DEPLOY_GAS: u64 = 1_200_000;

// ============================================================================
// CONFIG
// ============================================================================

/// When submitted transactions are executed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MiningMode {
    /// Mine each transaction as soon as it is accepted
    Instant,
    /// Hold transactions until `mine()` is called
    Manual,
}

/// Configuration for the development network
#[derive(Clone, Debug)]
pub struct DevNetworkConfig {
    pub chain_id: u64,
    pub gas_price: u128,
    pub block_gas_limit: u64,
    pub mining: MiningMode,
}

impl DevNetworkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = gas_price;
        self
    }

    pub fn with_block_gas_limit(mut self, limit: u64) -> Self {
        self.block_gas_limit = limit;
        self
    }

    pub fn with_mining(mut self, mining: MiningMode) -> Self {
        self.mining = mining;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), HostError> {
        if self.chain_id == 0 {
            return Err(HostError::Rejected("chain_id must be > 0".to_string()));
        }
        if self.chain_id > MAX_CHAIN_ID {
            return Err(HostError::Rejected(format!(
                "chain_id must be at most {}",
                MAX_CHAIN_ID
            )));
        }
        if self.block_gas_limit < TX_BASE_GAS {
            return Err(HostError::Rejected(format!(
                "block_gas_limit must be at least {}",
                TX_BASE_GAS
            )));
        }
        Ok(())
    }
}

impl Default for DevNetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: DEV_CHAIN_ID,
            gas_price: 1_000_000_000,
            block_gas_limit: 30_000_000,
            mining: MiningMode::Instant,
        }
    }
}

// ============================================================================
// CHAIN STATE
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
struct PendingTx {
    sender: Address,
    hash: TxHash,
    tx: SignedTransaction,
}

/// Everything the development chain knows; persisted as one snapshot
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChainState {
    block_number: u64,
    block_timestamp: i64,
    nonces: HashMap<Address, u64>,
    contracts: HashMap<Address, TokenLedger>,
    receipts: HashMap<TxHash, Receipt>,
    pending: Vec<PendingTx>,
}

impl ChainState {
    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    /// Unix timestamp of the latest block
    pub fn block_timestamp(&self) -> i64 {
        self.block_timestamp
    }

    pub fn contract_count(&self) -> usize {
        self.contracts.len()
    }

    pub fn receipt_count(&self) -> usize {
        self.receipts.len()
    }

    fn nonce(&self, account: &Address) -> u64 {
        self.nonces.get(account).copied().unwrap_or(0)
    }
}

/// Successful execution
struct Execution {
    output: Vec<u8>,
    gas_used: u64,
    logs: Vec<Log>,
    contract_address: Option<Address>,
}

/// Failed execution
enum ExecutionFailure {
    NoContract(Address),
    OutOfGas,
    Reverted(String),
}

// ============================================================================
// DEV NETWORK
// ============================================================================

/// In-process chain hosting token contracts
pub struct DevNetwork {
    config: DevNetworkConfig,
    state: Mutex<ChainState>,
    store: Option<ChainStore>,
}

impl DevNetwork {
    /// Create an empty, memory-only network
    pub fn new(config: DevNetworkConfig) -> Self {
        Self {
            config,
            state: Mutex::new(ChainState::default()),
            store: None,
        }
    }

    /// Open a network persisted under `path`, resuming its saved state
    pub fn open<P: AsRef<Path>>(config: DevNetworkConfig, path: P) -> Result<Self, StoreError> {
        let store = ChainStore::open(path)?;
        let state = store.load_state()?.unwrap_or_default();
        info!(
            block = state.block_number,
            contracts = state.contracts.len(),
            "opened development network"
        );
        Ok(Self {
            config,
            state: Mutex::new(state),
            store: Some(store),
        })
    }

    pub fn config(&self) -> &DevNetworkConfig {
        &self.config
    }

    /// The deterministic, pre-funded development accounts
    pub fn dev_accounts(&self) -> Vec<Keypair> {
        (0..Keypair::dev_account_count())
            .filter_map(Keypair::dev_account)
            .collect()
    }

    pub async fn block_number(&self) -> u64 {
        self.state.lock().await.block_number
    }

    pub async fn pending_count(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    /// Snapshot of a deployed token contract
    pub async fn token(&self, address: &Address) -> Option<TokenLedger> {
        self.state.lock().await.contracts.get(address).cloned()
    }

    /// Copy of the whole chain state
    pub async fn snapshot(&self) -> ChainState {
        self.state.lock().await.clone()
    }

    /// Execute every pending transaction in one block
    pub async fn mine(&self) -> Result<Vec<Receipt>, StoreError> {
        let mut state = self.state.lock().await;
        let receipts = self.mine_pending(&mut state);
        self.persist(&state)?;
        Ok(receipts)
    }

    fn mine_pending(&self, state: &mut ChainState) -> Vec<Receipt> {
        if state.pending.is_empty() {
            return Vec::new();
        }

        state.block_number += 1;
        state.block_timestamp = chrono::Utc::now().timestamp();
        let block_number = state.block_number;

        let pending = std::mem::take(&mut state.pending);
        let mut receipts = Vec::with_capacity(pending.len());

        for PendingTx { sender, hash, tx } in pending {
            let request = tx.request();
            let outcome = execute(
                state,
                sender,
                request.to,
                &request.data,
                request.nonce,
                Some(request.gas_limit),
            );

            let receipt = match outcome {
                Ok(exec) => Receipt {
                    tx_hash: hash,
                    block_number,
                    gas_used: exec.gas_used,
                    status: ReceiptStatus::Success,
                    revert_reason: None,
                    contract_address: exec.contract_address,
                    logs: exec.logs,
                },
                Err(ExecutionFailure::OutOfGas) => {
                    failed_receipt(hash, block_number, request.gas_limit, "out of gas")
                }
                Err(ExecutionFailure::NoContract(address)) => failed_receipt(
                    hash,
                    block_number,
                    TX_BASE_GAS,
                    &format!("no contract at {}", address),
                ),
                Err(ExecutionFailure::Reverted(reason)) => {
                    failed_receipt(hash, block_number, TX_BASE_GAS, &reason)
                }
            };

            debug!(
                tx = %hash,
                block = block_number,
                success = receipt.is_success(),
                "mined transaction"
            );
            receipts.push(receipt.clone());
            state.receipts.insert(hash, receipt);
        }

        receipts
    }

    fn persist(&self, state: &ChainState) -> Result<(), StoreError> {
        if let Some(store) = &self.store {
            store.save_state(state)?;
            store.flush()?;
        }
        Ok(())
    }
}

impl Default for DevNetwork {
    fn default() -> Self {
        Self::new(DevNetworkConfig::default())
    }
}

fn failed_receipt(hash: TxHash, block_number: u64, gas_used: u64, reason: &str) -> Receipt {
    Receipt {
        tx_hash: hash,
        block_number,
        gas_used,
        status: ReceiptStatus::Reverted,
        revert_reason: Some(reason.to_string()),
        contract_address: None,
        logs: Vec::new(),
    }
}

/// Run a call or creation against the chain. A transaction passes its gas
/// limit and commits its effects; calls and estimates (`gas_limit == None`)
/// run against a scratch copy and leave the state untouched.
fn execute(
    state: &mut ChainState,
    caller: Address,
    to: Option<Address>,
    data: &[u8],
    nonce: u64,
    gas_limit: Option<u64>,
) -> Result<Execution, ExecutionFailure> {
    let commit = gas_limit.is_some();
    let within_limit = |gas: u64| gas_limit.map_or(true, |limit| gas <= limit);

    let Some(to) = to else {
        if !within_limit(TX_BASE_GAS + DEPLOY_GAS) {
            return Err(ExecutionFailure::OutOfGas);
        }
        let init = TokenInit::decode(data)
            .map_err(|e| ExecutionFailure::Reverted(format!("invalid constructor data: {}", e)))?;
        let (ledger, event) = TokenLedger::new(&init, caller)
            .map_err(|e| ExecutionFailure::Reverted(e.to_string()))?;
        let address = Address::create(&caller, nonce);
        let logs = vec![event.to_log(address)];
        if commit {
            state.contracts.insert(address, ledger);
        }
        return Ok(Execution {
            output: Vec::new(),
            gas_used: TX_BASE_GAS + DEPLOY_GAS,
            logs,
            contract_address: Some(address),
        });
    };

    let contract = state
        .contracts
        .get_mut(&to)
        .ok_or(ExecutionFailure::NoContract(to))?;
    let call = TokenCall::decode(data)
        .map_err(|e| ExecutionFailure::Reverted(e.to_string()))?;
    let gas_used = TX_BASE_GAS + call_gas(&call);
    if !within_limit(gas_used) {
        return Err(ExecutionFailure::OutOfGas);
    }

    let (output, event) = if commit {
        dispatch(contract, caller, call)
    } else {
        let mut scratch = contract.clone();
        dispatch(&mut scratch, caller, call)
    }
    .map_err(|e| ExecutionFailure::Reverted(e.to_string()))?;

    Ok(Execution {
        output,
        gas_used,
        logs: event.map(|e| vec![e.to_log(to)]).unwrap_or_default(),
        contract_address: None,
    })
}

fn call_gas(call: &TokenCall) -> u64 {
    match call {
        TokenCall::Transfer { .. } => TRANSFER_GAS,
        TokenCall::Approve { .. } => APPROVE_GAS,
        TokenCall::TransferFrom { .. } => TRANSFER_FROM_GAS,
        _ => READ_GAS,
    }
}

/// Apply a decoded call to a token ledger, returning ABI output and event
fn dispatch(
    ledger: &mut TokenLedger,
    caller: Address,
    call: TokenCall,
) -> Result<(Vec<u8>, Option<TokenEvent>), TokenError> {
    use IERC20::*;

    let result = match call {
        TokenCall::Name => (
            nameCall::abi_encode_returns(&(ledger.name().to_string(),)),
            None,
        ),
        TokenCall::Symbol => (
            symbolCall::abi_encode_returns(&(ledger.symbol().to_string(),)),
            None,
        ),
        TokenCall::Decimals => (decimalsCall::abi_encode_returns(&(ledger.decimals(),)), None),
        TokenCall::TotalSupply => (
            totalSupplyCall::abi_encode_returns(&(ledger.total_supply().raw(),)),
            None,
        ),
        TokenCall::BalanceOf { account } => (
            balanceOfCall::abi_encode_returns(&(ledger.balance_of(&account).raw(),)),
            None,
        ),
        TokenCall::Allowance { owner, spender } => (
            allowanceCall::abi_encode_returns(&(ledger.allowance(&owner, &spender).raw(),)),
            None,
        ),
        TokenCall::Transfer { to, amount } => {
            let event = ledger.transfer(caller, to, amount)?;
            (transferCall::abi_encode_returns(&(true,)), Some(event))
        }
        TokenCall::Approve { spender, amount } => {
            let event = ledger.approve(caller, spender, amount)?;
            (approveCall::abi_encode_returns(&(true,)), Some(event))
        }
        TokenCall::TransferFrom { from, to, amount } => {
            let event = ledger.transfer_from(caller, from, to, amount)?;
            (transferFromCall::abi_encode_returns(&(true,)), Some(event))
        }
    };

    Ok(result)
}

fn failure_to_host(failure: ExecutionFailure) -> HostError {
    match failure {
        ExecutionFailure::NoContract(address) => HostError::NoContract(address),
        ExecutionFailure::OutOfGas => HostError::Reverted {
            reason: "out of gas".to_string(),
        },
        ExecutionFailure::Reverted(reason) => HostError::Reverted { reason },
    }
}

// ============================================================================
// LEDGER HOST
// ============================================================================

#[async_trait]
impl LedgerHost for DevNetwork {
    async fn chain_id(&self) -> Result<u64, HostError> {
        Ok(self.config.chain_id)
    }

    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, HostError> {
        let mut state = self.state.lock().await;
        let caller = request.from.unwrap_or(Address::ZERO);
        let nonce = state.nonce(&caller);
        execute(&mut state, caller, request.to, &request.data, nonce, None)
            .map(|exec| exec.output)
            .map_err(failure_to_host)
    }

    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, HostError> {
        let mut state = self.state.lock().await;
        let caller = request.from.unwrap_or(Address::ZERO);
        let nonce = state.nonce(&caller);
        execute(&mut state, caller, request.to, &request.data, nonce, None)
            .map(|exec| exec.gas_used)
            .map_err(failure_to_host)
    }

    async fn gas_price(&self) -> Result<u128, HostError> {
        Ok(self.config.gas_price)
    }

    async fn transaction_count(&self, account: &Address) -> Result<u64, HostError> {
        Ok(self.state.lock().await.nonce(account))
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<TxHash, HostError> {
        let request = tx.request();

        let sender = tx
            .recover_sender()
            .map_err(|e| HostError::Rejected(format!("invalid signature: {}", e)))?;

        if request.chain_id != self.config.chain_id {
            return Err(HostError::Rejected(format!(
                "invalid chain id: expected {}, got {}",
                self.config.chain_id, request.chain_id
            )));
        }
        if request.value != 0 {
            return Err(HostError::Rejected(
                "native value transfers are not supported".to_string(),
            ));
        }
        if request.gas_limit < TX_BASE_GAS {
            return Err(HostError::Rejected("intrinsic gas too low".to_string()));
        }
        if request.gas_limit > self.config.block_gas_limit {
            return Err(HostError::Rejected("exceeds block gas limit".to_string()));
        }

        let hash = tx.hash();
        let mut state = self.state.lock().await;

        if state.receipts.contains_key(&hash) || state.pending.iter().any(|p| p.hash == hash) {
            return Err(HostError::Rejected("already known".to_string()));
        }

        let expected = state.nonce(&sender);
        if request.nonce != expected {
            let kind = if request.nonce < expected { "low" } else { "high" };
            return Err(HostError::Rejected(format!(
                "nonce too {}: expected {}, got {}",
                kind, expected, request.nonce
            )));
        }

        state.nonces.insert(sender, expected + 1);
        state.pending.push(PendingTx {
            sender,
            hash,
            tx: tx.clone(),
        });
        debug!(tx = %hash, from = %sender, nonce = expected, "accepted transaction");

        if self.config.mining == MiningMode::Instant {
            self.mine_pending(&mut state);
        }

        self.persist(&state)
            .map_err(|e| HostError::Unreachable(format!("chain store: {}", e)))?;

        Ok(hash)
    }

    async fn receipt(&self, hash: &TxHash) -> Result<Option<Receipt>, HostError> {
        Ok(self.state.lock().await.receipts.get(hash).cloned())
    }
}
