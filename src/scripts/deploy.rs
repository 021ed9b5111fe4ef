// deploy - publish the optimized token from the first dev account

use super::{deploy_token, dev_account, open_session, optimized_token, ScriptError};
use crate::host::{LedgerHost, TxHash};
use crate::identity::Address;
use crate::units::{format_units, Amount};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct DeployReport {
    pub owner: Address,
    pub token: Address,
    pub tx_hash: TxHash,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Amount,
}

impl fmt::Display for DeployReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Deployer: {}", self.owner)?;
        writeln!(f, "Optimized token deployed to: {}", self.token)?;
        write!(
            f,
            "Total supply: {} {}",
            format_units(self.total_supply, self.decimals),
            self.symbol
        )
    }
}

pub async fn deploy(host: Arc<dyn LedgerHost>) -> Result<DeployReport, ScriptError> {
    let owner = dev_account(0)?;
    let session = open_session(&host, owner, None).await?;

    let deployment = deploy_token(&session, &optimized_token()).await?;
    let info = session.token_at(deployment.address).info().await?;

    Ok(DeployReport {
        owner: session.address(),
        token: deployment.address,
        tx_hash: deployment.tx_hash,
        symbol: info.symbol,
        decimals: info.decimals,
        total_supply: info.total_supply,
    })
}
