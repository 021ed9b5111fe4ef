// Token ledger - the fungible-token contract state and its rules
//
// Balances and allowances live here and nowhere else. Every mutation
// either applies completely and returns the event it emitted, or fails
// without touching state.

use crate::identity::Address;
use crate::ledger::TokenEvent;
use crate::units::{unit_scale, Amount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Reasons a token call reverts. The display strings are the revert reasons.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("ERC20: transfer amount exceeds balance")]
    InsufficientBalance { available: Amount, required: Amount },

    #[error("ERC20: insufficient allowance")]
    InsufficientAllowance { available: Amount, required: Amount },

    #[error("ERC20: transfer to the zero address")]
    TransferToZero,

    #[error("ERC20: approve to the zero address")]
    ApproveToZero,

    #[error("ERC20: mint to the zero address")]
    MintToZero,

    #[error("ERC20: supply overflow")]
    SupplyOverflow,
}

/// Constructor parameters of a token contract
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInit {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Initial supply in whole tokens; scaled by `10^decimals` at construction
    pub initial_supply: u128,
}

impl TokenInit {
    pub fn new(name: &str, symbol: &str, decimals: u8, initial_supply: u128) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            initial_supply,
        }
    }
}

/// In-memory token contract
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenLedger {
    name: String,
    symbol: String,
    decimals: u8,
    total_supply: Amount,
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
}

impl TokenLedger {
    /// Construct the contract, minting the initial supply to `owner`
    pub fn new(init: &TokenInit, owner: Address) -> Result<(Self, TokenEvent), TokenError> {
        let scale = unit_scale(init.decimals).ok_or(TokenError::SupplyOverflow)?;
        let supply = Amount::from(init.initial_supply)
            .checked_mul(scale)
            .ok_or(TokenError::SupplyOverflow)?;

        let mut ledger = Self {
            name: init.name.clone(),
            symbol: init.symbol.clone(),
            decimals: init.decimals,
            total_supply: Amount::ZERO,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        };
        let event = ledger.mint(owner, supply)?;
        Ok((ledger, event))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    /// Number of accounts holding a non-zero balance
    pub fn holder_count(&self) -> usize {
        self.balances.values().filter(|b| !b.is_zero()).count()
    }

    /// Sum of all balances (equals total supply while the ledger is consistent)
    pub fn balance_sum(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(Amount::ZERO, |acc, b| acc.checked_add(*b))
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Move `amount` from `from` to `to`
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<TokenEvent, TokenError> {
        if to.is_zero() {
            return Err(TokenError::TransferToZero);
        }

        let from_balance = self.balance_of(&from);
        let remaining = from_balance
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                available: from_balance,
                required: amount,
            })?;

        if from != to {
            let credited = self.balance_of(&to).checked_add(amount).ok_or(TokenError::SupplyOverflow)?;
            self.balances.insert(from, remaining);
            self.balances.insert(to, credited);
        }

        Ok(TokenEvent::Transfer {
            from,
            to,
            value: amount,
        })
    }

    /// Set (not add to) the allowance `owner` grants `spender`
    pub fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<TokenEvent, TokenError> {
        if spender.is_zero() {
            return Err(TokenError::ApproveToZero);
        }

        self.allowances.insert((owner, spender), amount);

        Ok(TokenEvent::Approval {
            owner,
            spender,
            value: amount,
        })
    }

    /// `spender` moves `amount` from `from` to `to`, consuming allowance
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<TokenEvent, TokenError> {
        let allowed = self.allowance(&from, &spender);
        let remaining = allowed
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientAllowance {
                available: allowed,
                required: amount,
            })?;

        let event = self.transfer(from, to, amount)?;

        if allowed != Amount::MAX {
            self.allowances.insert((from, spender), remaining);
        }

        Ok(event)
    }

    fn mint(&mut self, to: Address, amount: Amount) -> Result<TokenEvent, TokenError> {
        if to.is_zero() {
            return Err(TokenError::MintToZero);
        }

        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::SupplyOverflow)?;
        let balance = self.balance_of(&to).checked_add(amount).ok_or(TokenError::SupplyOverflow)?;
        self.balances.insert(to, balance);

        Ok(TokenEvent::Transfer {
            from: Address::ZERO,
            to,
            value: amount,
        })
    }
}
