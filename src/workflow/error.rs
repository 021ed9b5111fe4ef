// Workflow errors - what can go wrong between intent and confirmation

use super::InvalidTransition;
use crate::host::HostError;
use crate::session::SessionError;
use crate::units::{Amount, UnitsError};
use thiserror::Error;

/// Input or precondition problems caught before anything is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] UnitsError),

    #[error("Invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("Insufficient balance: has {available}, needs {required}")]
    InsufficientBalance { available: Amount, required: Amount },

    #[error("Insufficient allowance: has {available}, needs {required}")]
    InsufficientAllowance { available: Amount, required: Amount },
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Host unreachable or a state read failed
    #[error("Connection error: {0}")]
    Connection(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The host refused the mutation while estimating it
    #[error("Estimation failed: {0}")]
    Estimation(String),

    /// The host refused the signed transaction
    #[error("Submission rejected: {0}")]
    Submission(String),

    /// The mutation was submitted but did not take effect
    #[error("Execution failed: {0}")]
    Execution(String),

    #[error(transparent)]
    State(#[from] InvalidTransition),
}

impl WorkflowError {
    /// Short text suitable for a notification
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::Validation(ValidationError::InsufficientBalance { .. }) => {
                "Owner balance too low".to_string()
            }
            WorkflowError::Validation(ValidationError::InsufficientAllowance { .. }) => {
                "Allowance too low".to_string()
            }
            WorkflowError::Validation(other) => other.to_string(),
            WorkflowError::Connection(reason) => format!("Connection problem: {}", reason),
            WorkflowError::Estimation(reason) | WorkflowError::Execution(reason) => reason.clone(),
            WorkflowError::Submission(reason) => format!("Transaction rejected: {}", reason),
            WorkflowError::State(e) => e.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, WorkflowError::Validation(_))
    }

    /// Classify a host failure during gas estimation
    pub(crate) fn from_estimation(err: HostError) -> Self {
        match err {
            HostError::Unreachable(reason) => WorkflowError::Connection(reason),
            HostError::Reverted { reason } => WorkflowError::Estimation(reason),
            other => WorkflowError::Estimation(other.to_string()),
        }
    }

    /// Classify a host failure while sending the signed transaction
    pub(crate) fn from_submission(err: HostError) -> Self {
        match err {
            HostError::Unreachable(reason) => WorkflowError::Connection(reason),
            HostError::Rejected(reason) | HostError::Reverted { reason } => {
                WorkflowError::Submission(reason)
            }
            other => WorkflowError::Submission(other.to_string()),
        }
    }
}

impl From<SessionError> for WorkflowError {
    fn from(err: SessionError) -> Self {
        WorkflowError::Connection(err.to_string())
    }
}
