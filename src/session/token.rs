// TokenHandle - read-only view of one token contract

use super::SessionError;
use crate::host::{CallRequest, LedgerHost};
use crate::identity::Address;
use crate::ledger::{AbiError, IERC20};
use crate::units::Amount;
use alloy_sol_types::SolCall;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Token metadata and supply, loaded together
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenInfo {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Amount,
}

/// Handle for calling a token contract's read operations
#[derive(Clone)]
pub struct TokenHandle {
    host: Arc<dyn LedgerHost>,
    address: Address,
    caller: Address,
    decimals: Arc<OnceCell<u8>>,
}

impl TokenHandle {
    pub(crate) fn new(host: Arc<dyn LedgerHost>, address: Address, caller: Address) -> Self {
        Self {
            host,
            address,
            caller,
            decimals: Arc::new(OnceCell::new()),
        }
    }

    /// Contract address
    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn name(&self) -> Result<String, SessionError> {
        Ok(self.read(IERC20::nameCall {}).await?._0)
    }

    pub async fn symbol(&self) -> Result<String, SessionError> {
        Ok(self.read(IERC20::symbolCall {}).await?._0)
    }

    /// Decimals, read once and then served from cache
    pub async fn decimals(&self) -> Result<u8, SessionError> {
        let decimals = self
            .decimals
            .get_or_try_init(|| async {
                let decimals = self.read(IERC20::decimalsCall {}).await?._0;
                Ok::<_, SessionError>(decimals)
            })
            .await?;
        Ok(*decimals)
    }

    pub async fn total_supply(&self) -> Result<Amount, SessionError> {
        let supply = self.read(IERC20::totalSupplyCall {}).await?._0;
        Ok(Amount::from_raw(supply))
    }

    pub async fn balance_of(&self, account: Address) -> Result<Amount, SessionError> {
        let call = IERC20::balanceOfCall {
            account: account.into(),
        };
        Ok(Amount::from_raw(self.read(call).await?._0))
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<Amount, SessionError> {
        let call = IERC20::allowanceCall {
            owner: owner.into(),
            spender: spender.into(),
        };
        Ok(Amount::from_raw(self.read(call).await?._0))
    }

    /// Name, symbol, decimals and supply, fetched concurrently
    pub async fn info(&self) -> Result<TokenInfo, SessionError> {
        let (name, symbol, decimals, total_supply) = tokio::try_join!(
            self.name(),
            self.symbol(),
            self.decimals(),
            self.total_supply()
        )?;
        Ok(TokenInfo {
            address: self.address,
            name,
            symbol,
            decimals,
            total_supply,
        })
    }

    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return, SessionError> {
        let request = CallRequest::new(self.address, call.abi_encode()).from(self.caller);
        let output = self.host.call(&request).await?;
        C::abi_decode_returns(&output, true).map_err(|e| SessionError::Decode(AbiError::from(e)))
    }
}

impl std::fmt::Debug for TokenHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenHandle")
            .field("address", &self.address)
            .field("decimals", &self.decimals.get())
            .finish_non_exhaustive()
    }
}
