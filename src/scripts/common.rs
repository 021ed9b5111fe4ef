// Shared pieces of the scripts: errors, dev-account sessions, deployment

use crate::config::ClientConfig;
use crate::host::{HostError, LedgerHost, Receipt, TxHash, DEV_CHAIN_ID};
use crate::identity::{Address, AddressError, Keypair};
use crate::ledger::TokenInit;
use crate::session::{Session, SessionError};
use crate::workflow::{await_receipt, TxStatus, WorkflowError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Constructor arguments of the optimized token
pub fn optimized_token() -> TokenInit {
    TokenInit::new("Optimized Token", "OPT", 18, 200)
}

/// Constructor arguments of the simple token
pub fn simple_token() -> TokenInit {
    TokenInit::new("Simple Token", "SIM", 18, 200)
}

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("Deployment failed: {0}")]
    DeployFailed(String),

    #[error("No token deployed at {0}; run `tokendash deploy` first")]
    MissingToken(Address),

    #[error("Development account {0} is not available")]
    MissingAccount(usize),
}

/// Session configuration for the development network
pub fn dev_config() -> ClientConfig {
    ClientConfig::new()
        .with_expected_chain_id(DEV_CHAIN_ID)
        .with_network_name("development")
        .with_poll_interval_ms(25)
        .with_confirmation_timeout_secs(30)
}

/// Development account `index`
pub fn dev_account(index: usize) -> Result<Keypair, ScriptError> {
    Keypair::dev_account(index).ok_or(ScriptError::MissingAccount(index))
}

/// Session on `host` signing as `signer`
pub async fn open_session(
    host: &Arc<dyn LedgerHost>,
    signer: Keypair,
    token: Option<Address>,
) -> Result<Session, ScriptError> {
    let mut config = dev_config();
    if let Some(token) = token {
        config = config.with_token_address(token);
    }
    Ok(Session::establish(host.clone(), Some(signer), config).await?)
}

/// A contract created by `deploy_token`
#[derive(Clone, Debug)]
pub struct Deployment {
    pub address: Address,
    pub tx_hash: TxHash,
    pub receipt: Receipt,
}

/// Deploy a token from the session's account and wait for the receipt
pub async fn deploy_token(session: &Session, init: &TokenInit) -> Result<Deployment, ScriptError> {
    let data = init.encode();
    let gas_limit = session.estimate(None, &data).await?;
    let tx_hash = session.submit(None, data, gas_limit).await?;

    let config = session.config();
    let status = await_receipt(
        session.host().as_ref(),
        &tx_hash,
        config.poll_interval(),
        config.confirmation_timeout(),
    )
    .await;

    let receipt = match status {
        TxStatus::Confirmed(receipt) => receipt,
        TxStatus::Failed { reason, .. } => return Err(ScriptError::DeployFailed(reason)),
        TxStatus::Submitted => return Err(ScriptError::DeployFailed("still pending".into())),
    };
    let address = receipt
        .contract_address
        .ok_or_else(|| ScriptError::DeployFailed("receipt has no contract address".into()))?;

    info!(token = %address, symbol = %init.symbol, "token deployed");
    Ok(Deployment {
        address,
        tx_hash,
        receipt,
    })
}
