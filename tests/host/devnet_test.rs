// DevNetwork Tests
// Deployment, calls, transaction validation, mining and persistence

use alloy_primitives::U256;
use alloy_sol_types::SolCall;
use tokendash::host::{
    CallRequest, DevNetwork, DevNetworkConfig, HostError, LedgerHost, MiningMode, ReceiptStatus,
    TransactionRequest, TxHash, DEV_CHAIN_ID, MAX_CHAIN_ID,
};
use tokendash::identity::{Address, Keypair};
use tokendash::ledger::{TokenCall, TokenEvent, TokenInit, IERC20};
use tokendash::units::Amount;
use tempfile::TempDir;

const TOKEN: u128 = 1_000_000_000_000_000_000;

fn tokens(whole: u128) -> Amount {
    Amount::from(whole * TOKEN)
}

fn owner() -> Keypair {
    Keypair::dev_account(0).unwrap()
}

fn request(nonce: u64, to: Option<Address>, data: Vec<u8>) -> TransactionRequest {
    TransactionRequest {
        nonce,
        gas_price: 1_000_000_000,
        gas_limit: 2_000_000,
        to,
        value: 0,
        data,
        chain_id: DEV_CHAIN_ID,
    }
}

async fn deploy(network: &DevNetwork, keypair: &Keypair) -> Address {
    let nonce = network.transaction_count(&keypair.address()).await.unwrap();
    let init = TokenInit::new("Optimized Token", "OPT", 18, 200);
    let tx = request(nonce, None, init.encode()).sign(keypair).unwrap();
    let hash = network.send_transaction(&tx).await.unwrap();
    network
        .receipt(&hash)
        .await
        .unwrap()
        .and_then(|r| r.contract_address)
        .unwrap()
}

async fn balance(network: &DevNetwork, token: Address, account: Address) -> Amount {
    let output = network
        .call(&CallRequest::new(token, TokenCall::BalanceOf { account }.encode()))
        .await
        .unwrap();
    let decoded = IERC20::balanceOfCall::abi_decode_returns(&output, true).unwrap();
    Amount::from_raw(decoded._0)
}

async fn send_transfer(
    network: &DevNetwork,
    keypair: &Keypair,
    nonce: u64,
    token: Address,
    to: Address,
    whole: u128,
) -> Result<TxHash, HostError> {
    let data = TokenCall::Transfer {
        to,
        amount: tokens(whole),
    }
    .encode();
    network
        .send_transaction(&request(nonce, Some(token), data).sign(keypair).unwrap())
        .await
}

// ============================================================================
// CONFIG
// ============================================================================

#[test]
fn test_default_config() {
    let config = DevNetworkConfig::default();
    assert_eq!(config.chain_id, 31337);
    assert_eq!(config.mining, MiningMode::Instant);
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_config() {
    assert!(DevNetworkConfig::new().with_chain_id(0).validate().is_err());
    assert!(DevNetworkConfig::new()
        .with_block_gas_limit(1_000)
        .validate()
        .is_err());
}

#[test]
fn test_oversized_chain_id_config_rejected() {
    assert!(DevNetworkConfig::new()
        .with_chain_id(u64::MAX)
        .validate()
        .is_err());
    assert!(DevNetworkConfig::new()
        .with_chain_id(MAX_CHAIN_ID + 1)
        .validate()
        .is_err());
    assert!(DevNetworkConfig::new()
        .with_chain_id(MAX_CHAIN_ID)
        .validate()
        .is_ok());
}

#[test]
fn test_dev_accounts_are_known() {
    let network = DevNetwork::default();
    let accounts = network.dev_accounts();
    assert!(accounts.len() >= 3);
    assert_eq!(
        accounts[0].address().to_checksum(),
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
    );
}

// ============================================================================
// DEPLOYMENT AND CALLS
// ============================================================================

#[tokio::test]
async fn test_deploy_lands_at_create_address() {
    let network = DevNetwork::default();
    let owner = owner();

    let token = deploy(&network, &owner).await;

    assert_eq!(
        token.to_checksum(),
        "0x5FbDB2315678afecb367f032d93F642f64180aa3"
    );
    assert_eq!(network.block_number().await, 1);
    assert_eq!(network.transaction_count(&owner.address()).await.unwrap(), 1);

    let ledger = network.token(&token).await.unwrap();
    assert_eq!(ledger.symbol(), "OPT");
    assert_eq!(ledger.total_supply(), tokens(200));
    assert_eq!(ledger.balance_of(&owner.address()), tokens(200));
}

#[tokio::test]
async fn test_second_deploy_uses_next_nonce() {
    let network = DevNetwork::default();
    deploy(&network, &owner()).await;
    let second = deploy(&network, &owner()).await;

    assert_eq!(
        second.to_checksum(),
        "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"
    );
}

#[tokio::test]
async fn test_deploy_receipt_has_mint_event() {
    let network = DevNetwork::default();
    let owner = owner();
    let init = TokenInit::new("Simple Token", "SIM", 18, 200);
    let hash = network
        .send_transaction(&request(0, None, init.encode()).sign(&owner).unwrap())
        .await
        .unwrap();

    let receipt = network.receipt(&hash).await.unwrap().unwrap();
    assert!(receipt.is_success());
    assert_eq!(
        receipt.events(),
        vec![TokenEvent::Transfer {
            from: Address::ZERO,
            to: owner.address(),
            value: tokens(200),
        }]
    );
}

#[tokio::test]
async fn test_metadata_calls() {
    let network = DevNetwork::default();
    let token = deploy(&network, &owner()).await;

    let name = network
        .call(&CallRequest::new(token, TokenCall::Name.encode()))
        .await
        .unwrap();
    assert_eq!(
        IERC20::nameCall::abi_decode_returns(&name, true).unwrap()._0,
        "Optimized Token"
    );

    let decimals = network
        .call(&CallRequest::new(token, TokenCall::Decimals.encode()))
        .await
        .unwrap();
    assert_eq!(
        IERC20::decimalsCall::abi_decode_returns(&decimals, true).unwrap()._0,
        18
    );
}

#[tokio::test]
async fn test_balance_above_128_bits() {
    let network = DevNetwork::default();
    let owner = owner();
    let init = TokenInit::new("Wide Token", "WIDE", 30, 1_000_000_000_000);
    network
        .send_transaction(&request(0, None, init.encode()).sign(&owner).unwrap())
        .await
        .unwrap();
    let token = Address::create(&owner.address(), 0);
    let recipient = Keypair::generate().address();

    let supply = U256::from(10u8).pow(U256::from(42u8));
    assert_eq!(balance(&network, token, owner.address()).await, Amount::from_raw(supply));

    let half = Amount::from_raw(supply / U256::from(2u8));
    let data = TokenCall::Transfer {
        to: recipient,
        amount: half,
    }
    .encode();
    let hash = network
        .send_transaction(&request(1, Some(token), data).sign(&owner).unwrap())
        .await
        .unwrap();

    assert!(network.receipt(&hash).await.unwrap().unwrap().is_success());
    assert_eq!(balance(&network, token, recipient).await, half);
    assert!(half > Amount::from(u128::MAX));
}

#[tokio::test]
async fn test_call_does_not_change_state() {
    let network = DevNetwork::default();
    let owner = owner();
    let token = deploy(&network, &owner).await;
    let other = Keypair::generate().address();

    let data = TokenCall::Transfer {
        to: other,
        amount: tokens(1),
    }
    .encode();
    network
        .call(&CallRequest::new(token, data).from(owner.address()))
        .await
        .unwrap();

    assert_eq!(balance(&network, token, other).await, Amount::ZERO);
}

#[tokio::test]
async fn test_call_without_contract() {
    let network = DevNetwork::default();
    let missing = Keypair::generate().address();

    let result = network
        .call(&CallRequest::new(missing, TokenCall::Name.encode()))
        .await;
    assert_eq!(result, Err(HostError::NoContract(missing)));
}

#[tokio::test]
async fn test_estimate_reports_revert_reason() {
    let network = DevNetwork::default();
    let token = deploy(&network, &owner()).await;
    let poor = Keypair::generate().address();

    let data = TokenCall::Transfer {
        to: owner().address(),
        amount: Amount::from(1u128),
    }
    .encode();
    let result = network
        .estimate_gas(&CallRequest::new(token, data).from(poor))
        .await;

    assert_eq!(
        result,
        Err(HostError::Reverted {
            reason: "ERC20: transfer amount exceeds balance".to_string()
        })
    );
}

#[tokio::test]
async fn test_transfer_moves_balance() {
    let network = DevNetwork::default();
    let owner = owner();
    let token = deploy(&network, &owner).await;
    let recipient = Keypair::generate().address();

    let hash = send_transfer(&network, &owner, 1, token, recipient, 50)
        .await
        .unwrap();

    let receipt = network.receipt(&hash).await.unwrap().unwrap();
    assert!(receipt.is_success());
    assert_eq!(balance(&network, token, recipient).await, tokens(50));
    assert_eq!(balance(&network, token, owner.address()).await, tokens(150));
}

// ============================================================================
// TRANSACTION VALIDATION
// ============================================================================

#[tokio::test]
async fn test_nonce_too_low() {
    let network = DevNetwork::default();
    let owner = owner();
    let token = deploy(&network, &owner).await;

    let result = send_transfer(&network, &owner, 0, token, Address::ZERO, 1).await;
    assert!(matches!(result, Err(HostError::Rejected(m)) if m.contains("nonce too low")));
}

#[tokio::test]
async fn test_nonce_too_high() {
    let network = DevNetwork::default();
    let owner = owner();
    let token = deploy(&network, &owner).await;
    let to = Keypair::generate().address();

    let result = send_transfer(&network, &owner, 5, token, to, 1).await;
    assert!(matches!(result, Err(HostError::Rejected(m)) if m.contains("nonce too high")));
}

#[tokio::test]
async fn test_wrong_chain_id_rejected() {
    let network = DevNetwork::default();
    let mut tx = request(0, None, TokenInit::new("T", "T", 18, 1).encode());
    tx.chain_id = 1;

    let result = network.send_transaction(&tx.sign(&owner()).unwrap()).await;
    assert!(matches!(result, Err(HostError::Rejected(m)) if m.contains("invalid chain id")));
}

#[tokio::test]
async fn test_duplicate_transaction_rejected() {
    let network = DevNetwork::default();
    let tx = request(0, None, TokenInit::new("T", "T", 18, 1).encode()).sign(&owner()).unwrap();

    network.send_transaction(&tx).await.unwrap();
    let result = network.send_transaction(&tx).await;
    assert_eq!(result, Err(HostError::Rejected("already known".to_string())));
}

#[tokio::test]
async fn test_gas_limit_below_base_rejected() {
    let network = DevNetwork::default();
    let mut tx = request(0, None, TokenInit::new("T", "T", 18, 1).encode());
    tx.gas_limit = 20_000;

    let result = network.send_transaction(&tx.sign(&owner()).unwrap()).await;
    assert!(matches!(result, Err(HostError::Rejected(_))));
}

#[tokio::test]
async fn test_out_of_gas_reverts_on_chain() {
    let network = DevNetwork::default();
    let owner = owner();
    let token = deploy(&network, &owner).await;
    let to = Keypair::generate().address();

    let mut tx = request(
        1,
        Some(token),
        TokenCall::Transfer {
            to,
            amount: tokens(1),
        }
        .encode(),
    );
    tx.gas_limit = 21_000;
    let hash = network.send_transaction(&tx.sign(&owner).unwrap()).await.unwrap();

    let receipt = network.receipt(&hash).await.unwrap().unwrap();
    assert_eq!(receipt.status, ReceiptStatus::Reverted);
    assert_eq!(receipt.revert_reason.as_deref(), Some("out of gas"));
    assert_eq!(balance(&network, token, to).await, Amount::ZERO);
}

// ============================================================================
// MANUAL MINING
// ============================================================================

#[tokio::test]
async fn test_manual_mining_holds_transactions() {
    let network = DevNetwork::new(DevNetworkConfig::new().with_mining(MiningMode::Manual));
    let owner = owner();
    let tx = request(0, None, TokenInit::new("T", "T", 18, 1).encode()).sign(&owner).unwrap();

    let hash = network.send_transaction(&tx).await.unwrap();
    assert_eq!(network.pending_count().await, 1);
    assert_eq!(network.receipt(&hash).await.unwrap(), None);
    // Pending transactions still count towards the nonce
    assert_eq!(network.transaction_count(&owner.address()).await.unwrap(), 1);

    let receipts = network.mine().await.unwrap();
    assert_eq!(receipts.len(), 1);
    assert_eq!(network.pending_count().await, 0);
    assert!(network.receipt(&hash).await.unwrap().is_some());
}

#[tokio::test]
async fn test_estimated_transaction_can_still_revert() {
    let network = DevNetwork::new(DevNetworkConfig::new().with_mining(MiningMode::Manual));
    let owner = owner();
    network
        .send_transaction(&request(0, None, TokenInit::new("T", "T", 18, 200).encode()).sign(&owner).unwrap())
        .await
        .unwrap();
    network.mine().await.unwrap();
    let token = Address::create(&owner.address(), 0);
    let to = Keypair::generate().address();

    let first = send_transfer(&network, &owner, 1, token, to, 150).await.unwrap();

    // Estimated against the mined state where 200 are still available
    let data = TokenCall::Transfer {
        to,
        amount: tokens(100),
    }
    .encode();
    network
        .estimate_gas(&CallRequest::new(token, data).from(owner.address()))
        .await
        .unwrap();
    let second = send_transfer(&network, &owner, 2, token, to, 100).await.unwrap();

    network.mine().await.unwrap();

    assert!(network.receipt(&first).await.unwrap().unwrap().is_success());
    let reverted = network.receipt(&second).await.unwrap().unwrap();
    assert!(!reverted.is_success());
    assert_eq!(
        reverted.revert_reason.as_deref(),
        Some("ERC20: transfer amount exceeds balance")
    );
    assert_eq!(balance(&network, token, to).await, tokens(150));
}

#[tokio::test]
async fn test_mine_without_pending_is_noop() {
    let network = DevNetwork::new(DevNetworkConfig::new().with_mining(MiningMode::Manual));
    assert!(network.mine().await.unwrap().is_empty());
    assert_eq!(network.block_number().await, 0);
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[tokio::test]
async fn test_state_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let owner = owner();

    let token = {
        let network = DevNetwork::open(DevNetworkConfig::default(), temp_dir.path()).unwrap();
        deploy(&network, &owner).await
    };

    let network = DevNetwork::open(DevNetworkConfig::default(), temp_dir.path()).unwrap();
    assert_eq!(network.block_number().await, 1);
    assert_eq!(network.transaction_count(&owner.address()).await.unwrap(), 1);
    assert_eq!(balance(&network, token, owner.address()).await, tokens(200));
}
