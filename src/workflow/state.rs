// Mutation lifecycle
//
//   Idle -> Estimating -> Submitted -> Confirmed
//                      |            -> Reverted
//                      -> Failed

use crate::identity::Address;
use crate::units::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Lifecycle state of one mutation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationState {
    /// Inputs collected, nothing sent
    Idle,
    /// Asking the host whether the call would succeed
    Estimating,
    /// Accepted by the host, awaiting a receipt
    Submitted,
    /// Mined and executed successfully
    Confirmed,
    /// Rejected before submission
    Failed,
    /// Submitted but did not take effect (reverted or never confirmed)
    Reverted,
}

impl MutationState {
    /// Whether `self -> next` is a legal step
    pub fn can_transition_to(self, next: MutationState) -> bool {
        use MutationState::*;
        matches!(
            (self, next),
            (Idle, Estimating)
                | (Estimating, Submitted)
                | (Estimating, Failed)
                | (Submitted, Confirmed)
                | (Submitted, Reverted)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MutationState::Confirmed | MutationState::Failed | MutationState::Reverted
        )
    }
}

impl fmt::Display for MutationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationState::Idle => "idle",
            MutationState::Estimating => "estimating",
            MutationState::Submitted => "submitted",
            MutationState::Confirmed => "confirmed",
            MutationState::Failed => "failed",
            MutationState::Reverted => "reverted",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid mutation transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: MutationState,
    pub to: MutationState,
}

/// What a mutation does
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    Transfer {
        to: Address,
        amount: Amount,
    },
    Approve {
        spender: Address,
        amount: Amount,
    },
    TransferFrom {
        owner: Address,
        recipient: Address,
        amount: Amount,
    },
}

impl MutationKind {
    pub fn label(&self) -> &'static str {
        match self {
            MutationKind::Transfer { .. } => "transfer",
            MutationKind::Approve { .. } => "approve",
            MutationKind::TransferFrom { .. } => "transferFrom",
        }
    }
}

/// A mutation and the states it has passed through
#[derive(Clone, Debug)]
pub struct Mutation {
    kind: MutationKind,
    history: Vec<MutationState>,
}

impl Mutation {
    pub fn new(kind: MutationKind) -> Self {
        Self {
            kind,
            history: vec![MutationState::Idle],
        }
    }

    pub fn kind(&self) -> &MutationKind {
        &self.kind
    }

    pub fn state(&self) -> MutationState {
        self.history
            .last()
            .copied()
            .unwrap_or(MutationState::Idle)
    }

    /// Every state so far, oldest first
    pub fn history(&self) -> &[MutationState] {
        &self.history
    }

    /// Move to `next`, rejecting illegal steps
    pub fn advance(&mut self, next: MutationState) -> Result<(), InvalidTransition> {
        let from = self.state();
        if !from.can_transition_to(next) {
            return Err(InvalidTransition { from, to: next });
        }
        self.history.push(next);
        Ok(())
    }
}
