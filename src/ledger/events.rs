// Token events and their log representation

use super::IERC20;
use crate::identity::Address;
use crate::units::Amount;
use alloy_primitives::{LogData, B256};
use alloy_sol_types::SolEvent;
use serde::{Deserialize, Serialize};

/// Record of a change emitted by the token contract
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenEvent {
    Transfer {
        from: Address,
        to: Address,
        value: Amount,
    },
    Approval {
        owner: Address,
        spender: Address,
        value: Amount,
    },
}

/// Raw log entry as it appears in a receipt
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<[u8; 32]>,
    pub data: Vec<u8>,
}

impl TokenEvent {
    /// Encode as a log emitted by `contract`
    pub fn to_log(&self, contract: Address) -> Log {
        let encoded: LogData = match self {
            TokenEvent::Transfer { from, to, value } => IERC20::Transfer {
                from: (*from).into(),
                to: (*to).into(),
                value: value.raw(),
            }
            .encode_log_data(),
            TokenEvent::Approval {
                owner,
                spender,
                value,
            } => IERC20::Approval {
                owner: (*owner).into(),
                spender: (*spender).into(),
                value: value.raw(),
            }
            .encode_log_data(),
        };

        Log {
            address: contract,
            topics: encoded.topics().iter().map(|topic| topic.0).collect(),
            data: encoded.data.to_vec(),
        }
    }

    /// Decode a token event from a log, if it is one
    pub fn from_log(log: &Log) -> Option<Self> {
        let topics = || log.topics.iter().map(|topic| B256::from(*topic));
        let signature = topics().next()?;

        if signature == IERC20::Transfer::SIGNATURE_HASH {
            let event = IERC20::Transfer::decode_raw_log(topics(), &log.data, true).ok()?;
            Some(TokenEvent::Transfer {
                from: event.from.into(),
                to: event.to.into(),
                value: Amount::from_raw(event.value),
            })
        } else if signature == IERC20::Approval::SIGNATURE_HASH {
            let event = IERC20::Approval::decode_raw_log(topics(), &log.data, true).ok()?;
            Some(TokenEvent::Approval {
                owner: event.owner.into(),
                spender: event.spender.into(),
                value: Amount::from_raw(event.value),
            })
        } else {
            None
        }
    }
}
