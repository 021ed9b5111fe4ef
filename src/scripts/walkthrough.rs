// walkthrough - attach to the deployed optimized token and run the full
// allowance journey between two fresh accounts

use super::{dev_account, open_session, ScriptError};
use crate::host::{HostError, LedgerHost};
use crate::identity::{Address, Keypair};
use crate::session::{SessionError, TokenInfo};
use crate::units::{format_units, Amount};
use crate::workflow::Workflow;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Where `deploy` puts the optimized token on a fresh development chain
/// (first contract created by the first dev account)
pub const DEPLOYED_TOKEN_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

#[derive(Clone, Debug)]
pub struct WalkthroughReport {
    pub owner: Address,
    pub user1: Address,
    pub user2: Address,
    pub info: TokenInfo,
    pub owner_balance: Amount,
    pub user1_balance_after_transfer: Amount,
    pub allowance: Amount,
    pub user1_balance: Amount,
    pub user2_balance: Amount,
}

impl fmt::Display for WalkthroughReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = |amount: Amount| format_units(amount, self.info.decimals);

        writeln!(f, "Owner: {}", self.owner)?;
        writeln!(f, "User1: {}", self.user1)?;
        writeln!(f, "User2: {}", self.user2)?;
        writeln!(f)?;
        writeln!(f, "Token Info:")?;
        writeln!(f, "Name: {}", self.info.name)?;
        writeln!(f, "Symbol: {}", self.info.symbol)?;
        writeln!(f, "Decimals: {}", self.info.decimals)?;
        writeln!(f, "Total Supply: {}", units(self.info.total_supply))?;
        writeln!(f)?;
        writeln!(f, "Owner Balance: {}", units(self.owner_balance))?;
        writeln!(f)?;
        writeln!(f, "Transferred 50 tokens to User1")?;
        writeln!(f, "User1 Balance: {}", units(self.user1_balance_after_transfer))?;
        writeln!(f)?;
        writeln!(f, "User1 approved User2 for 20 tokens")?;
        writeln!(f, "Allowance User2 has: {}", units(self.allowance))?;
        writeln!(f)?;
        writeln!(f, "User2 transferred 10 tokens from User1 to itself")?;
        writeln!(f, "User1 Balance: {}", units(self.user1_balance))?;
        write!(f, "User2 Balance: {}", units(self.user2_balance))
    }
}

pub async fn walkthrough(host: Arc<dyn LedgerHost>) -> Result<WalkthroughReport, ScriptError> {
    walkthrough_at(host, Address::parse(DEPLOYED_TOKEN_ADDRESS)?).await
}

/// Run the walkthrough against the token at `token_address`
pub async fn walkthrough_at(
    host: Arc<dyn LedgerHost>,
    token_address: Address,
) -> Result<WalkthroughReport, ScriptError> {
    let user1_key = Keypair::generate();
    let user2_key = Keypair::generate();

    let owner = open_session(&host, dev_account(0)?, Some(token_address)).await?;
    let user1 = open_session(&host, user1_key, Some(token_address)).await?;
    let user2 = open_session(&host, user2_key, Some(token_address)).await?;

    let workflow = Workflow::new(owner.token()?);
    let token = workflow.token();

    let info = token.info().await.map_err(|e| match e {
        SessionError::Host(HostError::NoContract(address)) => ScriptError::MissingToken(address),
        other => ScriptError::Session(other),
    })?;
    let owner_balance = token.balance_of(owner.address()).await?;

    info!(to = %user1.address(), "owner transfers 50 tokens");
    let pending = workflow.transfer(&owner, &user1.address().to_hex(), "50").await?;
    workflow.finish(&owner, pending).await?;
    let user1_balance_after_transfer = token.balance_of(user1.address()).await?;

    info!(spender = %user2.address(), "user1 approves 20 tokens");
    let user1_flow = Workflow::new(user1.token()?);
    let pending = user1_flow
        .approve(&user1, &user2.address().to_hex(), "20")
        .await?;
    let approved = user1_flow.finish(&user1, pending).await?;
    let allowance = approved.allowance.unwrap_or_default();

    info!(owner = %user1.address(), "user2 pulls 10 tokens");
    let user2_flow = Workflow::new(user2.token()?);
    let pending = user2_flow
        .transfer_from(
            &user2,
            &user1.address().to_hex(),
            &user2.address().to_hex(),
            "10",
        )
        .await?;
    user2_flow.finish(&user2, pending).await?;

    Ok(WalkthroughReport {
        owner: owner.address(),
        user1: user1.address(),
        user2: user2.address(),
        info,
        owner_balance,
        user1_balance_after_transfer,
        allowance,
        user1_balance: token.balance_of(user1.address()).await?,
        user2_balance: token.balance_of(user2.address()).await?,
    })
}
