// Session Tests
// Establishing sessions, token reads and transaction submission

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokendash::config::ClientConfig;
use alloy_primitives::U256;
use tokendash::host::{
    CallRequest, DevNetwork, DevNetworkConfig, HostError, LedgerHost, Receipt, SignedTransaction,
    TxHash, DEV_CHAIN_ID, MAX_CHAIN_ID,
};
use tokendash::identity::{Address, Keypair};
use tokendash::ledger::{TokenCall, TokenInit};
use tokendash::scripts::{deploy_token, dev_config, optimized_token};
use tokendash::session::{Session, SessionError, SessionWarning};
use tokendash::units::Amount;

/// Wraps a host, counting calls and optionally refusing to answer
struct CountingHost {
    inner: DevNetwork,
    calls: AtomicUsize,
    down: bool,
}

impl CountingHost {
    fn new() -> Self {
        Self {
            inner: DevNetwork::default(),
            calls: AtomicUsize::new(0),
            down: false,
        }
    }

    fn down() -> Self {
        Self {
            down: true,
            ..Self::new()
        }
    }

    fn check(&self) -> Result<(), HostError> {
        if self.down {
            return Err(HostError::Unreachable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerHost for CountingHost {
    async fn chain_id(&self) -> Result<u64, HostError> {
        self.check()?;
        self.inner.chain_id().await
    }

    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, HostError> {
        self.check()?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.call(request).await
    }

    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, HostError> {
        self.inner.estimate_gas(request).await
    }

    async fn gas_price(&self) -> Result<u128, HostError> {
        self.inner.gas_price().await
    }

    async fn transaction_count(&self, account: &Address) -> Result<u64, HostError> {
        self.inner.transaction_count(account).await
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<TxHash, HostError> {
        self.inner.send_transaction(tx).await
    }

    async fn receipt(&self, hash: &TxHash) -> Result<Option<Receipt>, HostError> {
        self.inner.receipt(hash).await
    }
}

fn owner() -> Keypair {
    Keypair::dev_account(0).unwrap()
}

async fn dev_session(host: Arc<dyn LedgerHost>) -> Session {
    Session::establish(host, Some(owner()), dev_config()).await.unwrap()
}

// ============================================================================
// ESTABLISHING
// ============================================================================

#[tokio::test]
async fn test_establish_on_expected_network() {
    let session = dev_session(Arc::new(DevNetwork::default())).await;

    assert_eq!(session.address(), owner().address());
    assert_eq!(session.chain_id(), DEV_CHAIN_ID);
    assert!(session.on_expected_network());
    assert!(session.warnings().is_empty());
}

#[tokio::test]
async fn test_missing_signer_is_connection_error() {
    let result = Session::establish(Arc::new(DevNetwork::default()), None, dev_config()).await;

    assert!(matches!(result, Err(SessionError::Connection(_))));
}

#[tokio::test]
async fn test_unreachable_host_is_connection_error() {
    let result = Session::establish(Arc::new(CountingHost::down()), Some(owner()), dev_config()).await;

    match result {
        Err(SessionError::Connection(message)) => assert!(message.contains("connection refused")),
        other => panic!("expected connection error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chain_mismatch_is_warning() {
    // Default config expects Sepolia; the dev network is 31337
    let session = Session::establish(
        Arc::new(DevNetwork::default()),
        Some(owner()),
        ClientConfig::default(),
    )
    .await
    .unwrap();

    assert!(!session.on_expected_network());
    assert_eq!(
        session.warnings(),
        &[SessionWarning::ChainMismatch {
            expected: 11_155_111,
            actual: DEV_CHAIN_ID,
            network: "Sepolia".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_unsignable_chain_id_is_connection_error() {
    for chain_id in [0, MAX_CHAIN_ID + 1, u64::MAX] {
        let host = DevNetwork::new(DevNetworkConfig::new().with_chain_id(chain_id));
        let result = Session::establish(Arc::new(host), Some(owner()), dev_config()).await;

        match result {
            Err(SessionError::Connection(message)) => {
                assert!(message.contains("unsupported chain id"), "{}", message)
            }
            other => panic!("expected connection error, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let config = dev_config().with_poll_interval_ms(0);
    let result = Session::establish(Arc::new(DevNetwork::default()), Some(owner()), config).await;

    assert!(matches!(result, Err(SessionError::Config(_))));
}

#[tokio::test]
async fn test_explorer_url() {
    let session = Session::establish(
        Arc::new(DevNetwork::default()),
        Some(owner()),
        ClientConfig::default(),
    )
    .await
    .unwrap();
    let hash = TxHash::from_bytes([0x12; 32]);

    assert_eq!(
        session.explorer_url(&hash),
        format!("https://sepolia.etherscan.io/tx/0x{}", "12".repeat(32))
    );
}

// ============================================================================
// TOKEN READS
// ============================================================================

#[tokio::test]
async fn test_no_token_configured() {
    let session = dev_session(Arc::new(DevNetwork::default())).await;

    assert!(matches!(session.token(), Err(SessionError::NoToken)));
}

#[tokio::test]
async fn test_token_info() {
    let session = dev_session(Arc::new(DevNetwork::default())).await;
    let deployment = deploy_token(&session, &optimized_token()).await.unwrap();

    let token = session.token_at(deployment.address);
    let info = token.info().await.unwrap();

    assert_eq!(info.address, deployment.address);
    assert_eq!(info.name, "Optimized Token");
    assert_eq!(info.symbol, "OPT");
    assert_eq!(info.decimals, 18);
    assert_eq!(info.total_supply, Amount::from(200_000_000_000_000_000_000u128));
    assert_eq!(
        token.balance_of(session.address()).await.unwrap(),
        info.total_supply
    );
    assert_eq!(
        token
            .allowance(session.address(), Keypair::generate().address())
            .await
            .unwrap(),
        Amount::ZERO
    );
}

#[tokio::test]
async fn test_token_reads_amounts_above_128_bits() {
    let session = dev_session(Arc::new(DevNetwork::default())).await;
    let init = TokenInit::new("Wide Token", "WIDE", 30, 1_000_000_000_000);
    let deployment = deploy_token(&session, &init).await.unwrap();

    let token = session.token_at(deployment.address);
    let info = token.info().await.unwrap();
    let expected = Amount::from_raw(U256::from(10u8).pow(U256::from(42u8)));

    assert_eq!(info.decimals, 30);
    assert_eq!(info.total_supply, expected);
    assert!(info.total_supply > Amount::from(u128::MAX));
    assert_eq!(token.balance_of(session.address()).await.unwrap(), expected);
}

#[tokio::test]
async fn test_configured_token_handle() {
    let host: Arc<dyn LedgerHost> = Arc::new(DevNetwork::default());
    let deployer = dev_session(host.clone()).await;
    let deployment = deploy_token(&deployer, &optimized_token()).await.unwrap();

    let session = Session::establish(
        host,
        Some(owner()),
        dev_config().with_token_address(deployment.address),
    )
    .await
    .unwrap();

    assert_eq!(session.token().unwrap().address(), deployment.address);
}

#[tokio::test]
async fn test_decimals_read_once() {
    let counting = Arc::new(CountingHost::new());
    let session = dev_session(counting.clone()).await;
    let deployment = deploy_token(&session, &optimized_token()).await.unwrap();
    let token = session.token_at(deployment.address);

    let before = counting.calls.load(Ordering::SeqCst);
    assert_eq!(token.decimals().await.unwrap(), 18);
    assert_eq!(token.decimals().await.unwrap(), 18);
    // Clones share the cache
    assert_eq!(token.clone().decimals().await.unwrap(), 18);

    assert_eq!(counting.calls.load(Ordering::SeqCst) - before, 1);
}

#[tokio::test]
async fn test_read_from_missing_contract() {
    let session = dev_session(Arc::new(DevNetwork::default())).await;
    let missing = Keypair::generate().address();

    let result = session.token_at(missing).name().await;
    assert!(matches!(
        result,
        Err(SessionError::Host(HostError::NoContract(address))) if address == missing
    ));
}

// ============================================================================
// SUBMISSION
// ============================================================================

#[tokio::test]
async fn test_submit_uses_consecutive_nonces() {
    let network = Arc::new(DevNetwork::default());
    let session = dev_session(network.clone()).await;
    let deployment = deploy_token(&session, &optimized_token()).await.unwrap();
    let to = Keypair::generate().address();

    let data = TokenCall::Transfer {
        to,
        amount: Amount::from(1u128),
    }
    .encode();
    let gas = session.estimate(Some(deployment.address), &data).await.unwrap();

    let first = session
        .submit(Some(deployment.address), data.clone(), gas)
        .await
        .unwrap();
    let second = session
        .submit(Some(deployment.address), data, gas)
        .await
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(
        network.transaction_count(&session.address()).await.unwrap(),
        3
    );
    assert_eq!(
        session.token_at(deployment.address).balance_of(to).await.unwrap(),
        Amount::from(2u128)
    );
}

#[tokio::test]
async fn test_estimate_reports_revert() {
    let session = dev_session(Arc::new(DevNetwork::default())).await;
    let deployment = deploy_token(&session, &optimized_token()).await.unwrap();

    let data = TokenCall::Transfer {
        to: Address::ZERO,
        amount: Amount::from(1u128),
    }
    .encode();
    let result = session.estimate(Some(deployment.address), &data).await;

    assert_eq!(
        result,
        Err(HostError::Reverted {
            reason: "ERC20: transfer to the zero address".to_string()
        })
    );
}
