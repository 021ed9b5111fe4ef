// Token contract interface - call encoding shared by every host

use crate::identity::Address;
use crate::ledger::TokenInit;
use crate::units::Amount;
use alloy_primitives::{keccak256, U256};
use alloy_sol_types::{sol, sol_data, Revert, SolError, SolInterface, SolType};
use thiserror::Error;

const CONSTRUCTOR: &str = "constructor(string,string,uint8,uint256)";

type ConstructorArgs = (sol_data::String, sol_data::String, sol_data::Uint<8>, sol_data::Uint<256>);

sol! {
    /// Standard ERC20 token interface
    interface IERC20 {
        event Transfer(address indexed from, address indexed to, uint256 value);
        event Approval(address indexed owner, address indexed spender, uint256 value);

        function name() external view returns (string memory);
        function symbol() external view returns (string memory);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("Data too short: needed {needed} bytes, got {got}")]
    TooShort { needed: usize, got: usize },

    #[error("Unknown function selector 0x{}", hex::encode(.0))]
    UnknownSelector([u8; 4]),

    #[error("Invalid ABI data: {0}")]
    InvalidData(String),
}

impl From<alloy_sol_types::Error> for AbiError {
    fn from(err: alloy_sol_types::Error) -> Self {
        AbiError::InvalidData(err.to_string())
    }
}

/// Build `Error(string)` revert data
pub fn encode_revert(reason: &str) -> Vec<u8> {
    Revert {
        reason: reason.to_string(),
    }
    .abi_encode()
}

/// Extract the reason from `Error(string)` revert data
pub fn decode_revert(data: &[u8]) -> Option<String> {
    Revert::abi_decode(data, true).ok().map(|revert| revert.reason)
}

fn split_selector(data: &[u8]) -> Result<([u8; 4], &[u8]), AbiError> {
    match data {
        [a, b, c, d, rest @ ..] => Ok(([*a, *b, *c, *d], rest)),
        _ => Err(AbiError::TooShort {
            needed: 4,
            got: data.len(),
        }),
    }
}

fn constructor_selector() -> [u8; 4] {
    let digest = keccak256(CONSTRUCTOR);
    [digest[0], digest[1], digest[2], digest[3]]
}

/// A call against the token interface
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenCall {
    Name,
    Symbol,
    Decimals,
    TotalSupply,
    BalanceOf { account: Address },
    Allowance { owner: Address, spender: Address },
    Transfer { to: Address, amount: Amount },
    Approve { spender: Address, amount: Amount },
    TransferFrom { from: Address, to: Address, amount: Amount },
}

impl TokenCall {
    /// Whether the call changes ledger state (must be sent as a transaction)
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            TokenCall::Transfer { .. } | TokenCall::Approve { .. } | TokenCall::TransferFrom { .. }
        )
    }

    fn to_sol(&self) -> IERC20::IERC20Calls {
        use IERC20::*;

        match self {
            TokenCall::Name => IERC20Calls::name(nameCall {}),
            TokenCall::Symbol => IERC20Calls::symbol(symbolCall {}),
            TokenCall::Decimals => IERC20Calls::decimals(decimalsCall {}),
            TokenCall::TotalSupply => IERC20Calls::totalSupply(totalSupplyCall {}),
            TokenCall::BalanceOf { account } => IERC20Calls::balanceOf(balanceOfCall {
                account: (*account).into(),
            }),
            TokenCall::Allowance { owner, spender } => IERC20Calls::allowance(allowanceCall {
                owner: (*owner).into(),
                spender: (*spender).into(),
            }),
            TokenCall::Transfer { to, amount } => IERC20Calls::transfer(transferCall {
                to: (*to).into(),
                amount: amount.raw(),
            }),
            TokenCall::Approve { spender, amount } => IERC20Calls::approve(approveCall {
                spender: (*spender).into(),
                amount: amount.raw(),
            }),
            TokenCall::TransferFrom { from, to, amount } => {
                IERC20Calls::transferFrom(transferFromCall {
                    from: (*from).into(),
                    to: (*to).into(),
                    amount: amount.raw(),
                })
            }
        }
    }

    /// ABI-encoded calldata
    pub fn encode(&self) -> Vec<u8> {
        self.to_sol().abi_encode()
    }

    /// Decode calldata back into a call
    pub fn decode(data: &[u8]) -> Result<Self, AbiError> {
        use IERC20::IERC20Calls;

        let (selector, _) = split_selector(data)?;
        if !IERC20Calls::valid_selector(selector) {
            return Err(AbiError::UnknownSelector(selector));
        }

        let call = match IERC20Calls::abi_decode(data, true)? {
            IERC20Calls::name(_) => TokenCall::Name,
            IERC20Calls::symbol(_) => TokenCall::Symbol,
            IERC20Calls::decimals(_) => TokenCall::Decimals,
            IERC20Calls::totalSupply(_) => TokenCall::TotalSupply,
            IERC20Calls::balanceOf(c) => TokenCall::BalanceOf {
                account: c.account.into(),
            },
            IERC20Calls::allowance(c) => TokenCall::Allowance {
                owner: c.owner.into(),
                spender: c.spender.into(),
            },
            IERC20Calls::transfer(c) => TokenCall::Transfer {
                to: c.to.into(),
                amount: Amount::from_raw(c.amount),
            },
            IERC20Calls::approve(c) => TokenCall::Approve {
                spender: c.spender.into(),
                amount: Amount::from_raw(c.amount),
            },
            IERC20Calls::transferFrom(c) => TokenCall::TransferFrom {
                from: c.from.into(),
                to: c.to.into(),
                amount: Amount::from_raw(c.amount),
            },
        };

        Ok(call)
    }
}

impl TokenInit {
    /// Creation payload understood by the development network
    pub fn encode(&self) -> Vec<u8> {
        let args = (
            self.name.clone(),
            self.symbol.clone(),
            self.decimals,
            U256::from(self.initial_supply),
        );
        let mut out = constructor_selector().to_vec();
        out.extend(ConstructorArgs::abi_encode_params(&args));
        out
    }

    /// Decode a creation payload
    pub fn decode(data: &[u8]) -> Result<Self, AbiError> {
        let (selector, args) = split_selector(data)?;
        if selector != constructor_selector() {
            return Err(AbiError::UnknownSelector(selector));
        }

        let (name, symbol, decimals, supply) =
            ConstructorArgs::abi_decode_params(args, true)?;
        let initial_supply = u128::try_from(supply)
            .map_err(|_| AbiError::InvalidData("initial supply above 128 bits".into()))?;

        Ok(TokenInit {
            name,
            symbol,
            decimals,
            initial_supply,
        })
    }
}
