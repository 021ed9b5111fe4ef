// simulate - deploy the simple token and exercise transfer and approve
// from the funded owner account

use super::{deploy_token, dev_account, open_session, simple_token, ScriptError};
use crate::host::LedgerHost;
use crate::identity::{Address, Keypair};
use crate::units::{format_units, Amount};
use crate::workflow::Workflow;
use std::fmt;
use std::sync::Arc;
use tracing::info;

#[derive(Clone, Debug)]
pub struct SimulationReport {
    pub owner: Address,
    pub token: Address,
    pub addr1: Address,
    pub addr2: Address,
    pub symbol: String,
    pub decimals: u8,
    pub initial_owner_balance: Amount,
    pub initial_addr1_balance: Amount,
    pub owner_balance: Amount,
    pub addr1_balance: Amount,
    pub allowance: Amount,
}

impl SimulationReport {
    fn units(&self, amount: Amount) -> String {
        format!("{} {}", format_units(amount, self.decimals), self.symbol)
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Owner address: {}", self.owner)?;
        writeln!(f, "Simple token deployed to: {}", self.token)?;
        writeln!(f, "Addr1 address: {}", self.addr1)?;
        writeln!(f, "Addr2 address: {}", self.addr2)?;
        writeln!(f, "Initial owner balance: {}", self.units(self.initial_owner_balance))?;
        writeln!(f, "Initial addr1 balance: {}", self.units(self.initial_addr1_balance))?;
        writeln!(f)?;
        writeln!(f, "Transferred 50 tokens from owner to addr1")?;
        writeln!(f, "Owner balance after transfer: {}", self.units(self.owner_balance))?;
        writeln!(f, "Addr1 balance after transfer: {}", self.units(self.addr1_balance))?;
        writeln!(f)?;
        writeln!(f, "Approved addr2 to spend 30 tokens")?;
        writeln!(f, "Allowance given to addr2: {}", self.units(self.allowance))?;
        writeln!(f)?;
        write!(f, "All actions simulated using the funded owner account.")
    }
}

pub async fn simulate(host: Arc<dyn LedgerHost>) -> Result<SimulationReport, ScriptError> {
    let owner = dev_account(0)?;
    let session = open_session(&host, owner, None).await?;
    let deployment = deploy_token(&session, &simple_token()).await?;

    let addr1 = Keypair::generate().address();
    let addr2 = Keypair::generate().address();

    let workflow = Workflow::new(session.token_at(deployment.address));
    let token = workflow.token();
    let info = token.info().await?;

    let initial_owner_balance = token.balance_of(session.address()).await?;
    let initial_addr1_balance = token.balance_of(addr1).await?;

    info!(to = %addr1, "transferring 50 tokens");
    let pending = workflow.transfer(&session, &addr1.to_hex(), "50").await?;
    let transferred = workflow.finish(&session, pending).await?;
    let owner_balance = transferred.balance.unwrap_or_default();
    let addr1_balance = token.balance_of(addr1).await?;

    info!(spender = %addr2, "approving 30 tokens");
    let pending = workflow.approve(&session, &addr2.to_hex(), "30").await?;
    let approved = workflow.finish(&session, pending).await?;
    let allowance = approved.allowance.unwrap_or_default();

    Ok(SimulationReport {
        owner: session.address(),
        token: deployment.address,
        addr1,
        addr2,
        symbol: info.symbol,
        decimals: info.decimals,
        initial_owner_balance,
        initial_addr1_balance,
        owner_balance,
        addr1_balance,
        allowance,
    })
}
