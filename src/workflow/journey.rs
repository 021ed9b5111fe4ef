// Workflow - validate, estimate, submit, then confirm and re-read

use super::{
    Mutation, MutationKind, MutationState, PendingTransaction, TxStatus, ValidationError,
    WorkflowError,
};
use crate::host::{Receipt, TxHash};
use crate::identity::Address;
use crate::ledger::{TokenCall, TokenEvent};
use crate::session::{Session, TokenHandle};
use crate::units::{parse_units, Amount};
use tracing::{debug, info};

/// Result of a confirmed mutation with the state re-read afterwards
#[derive(Clone, Debug)]
pub struct Outcome {
    pub kind: MutationKind,
    pub hash: TxHash,
    pub explorer_url: String,
    pub receipt: Receipt,
    /// Caller's balance after a transfer or transferFrom
    pub balance: Option<Amount>,
    /// Allowance after an approve (owner = caller) or transferFrom (spender = caller)
    pub allowance: Option<Amount>,
}

impl Outcome {
    pub fn events(&self) -> Vec<TokenEvent> {
        self.receipt.events()
    }
}

/// Token journeys for one contract
#[derive(Clone, Debug)]
pub struct Workflow {
    token: TokenHandle,
}

impl Workflow {
    pub fn new(token: TokenHandle) -> Self {
        Self { token }
    }

    pub fn token(&self) -> &TokenHandle {
        &self.token
    }

    /// Send `amount` of the caller's tokens to `to`
    pub async fn transfer(
        &self,
        session: &Session,
        to: &str,
        amount: &str,
    ) -> Result<PendingTransaction, WorkflowError> {
        let to = parse_address(to)?;
        let amount = self.parse_amount(amount).await?;

        let call = TokenCall::Transfer { to, amount };
        self.execute(session, MutationKind::Transfer { to, amount }, call)
            .await
    }

    /// Allow `spender` to move up to `amount` of the caller's tokens
    pub async fn approve(
        &self,
        session: &Session,
        spender: &str,
        amount: &str,
    ) -> Result<PendingTransaction, WorkflowError> {
        let spender = parse_address(spender)?;
        let amount = self.parse_amount(amount).await?;

        let call = TokenCall::Approve { spender, amount };
        self.execute(session, MutationKind::Approve { spender, amount }, call)
            .await
    }

    /// Move `amount` from `owner` to `recipient` using the caller's allowance
    ///
    /// The owner's balance and the allowance are checked first; an
    /// insufficient one fails here without estimating or submitting.
    pub async fn transfer_from(
        &self,
        session: &Session,
        owner: &str,
        recipient: &str,
        amount: &str,
    ) -> Result<PendingTransaction, WorkflowError> {
        let owner = parse_address(owner)?;
        let recipient = parse_address(recipient)?;
        let amount = self.parse_amount(amount).await?;

        let balance = self.token.balance_of(owner).await?;
        if balance < amount {
            return Err(ValidationError::InsufficientBalance {
                available: balance,
                required: amount,
            }
            .into());
        }

        let allowance = self.token.allowance(owner, session.address()).await?;
        if allowance < amount {
            return Err(ValidationError::InsufficientAllowance {
                available: allowance,
                required: amount,
            }
            .into());
        }

        let call = TokenCall::TransferFrom {
            from: owner,
            to: recipient,
            amount,
        };
        let kind = MutationKind::TransferFrom {
            owner,
            recipient,
            amount,
        };
        self.execute(session, kind, call).await
    }

    /// Await confirmation of `pending` and re-read the state it changed
    pub async fn finish(
        &self,
        session: &Session,
        pending: PendingTransaction,
    ) -> Result<Outcome, WorkflowError> {
        let receipt = match pending.confirmation().await {
            TxStatus::Confirmed(receipt) => receipt,
            TxStatus::Failed { reason, .. } => return Err(WorkflowError::Execution(reason)),
            TxStatus::Submitted => {
                return Err(WorkflowError::Execution("still pending".to_string()))
            }
        };

        let caller = session.address();
        let (balance, allowance) = match pending.kind() {
            MutationKind::Transfer { .. } => (Some(self.token.balance_of(caller).await?), None),
            MutationKind::Approve { spender, .. } => {
                (None, Some(self.token.allowance(caller, *spender).await?))
            }
            MutationKind::TransferFrom { owner, .. } => {
                let (balance, allowance) = tokio::try_join!(
                    self.token.balance_of(caller),
                    self.token.allowance(*owner, caller)
                )?;
                (Some(balance), Some(allowance))
            }
        };

        info!(
            tx = %pending.hash(),
            kind = pending.kind().label(),
            "mutation complete"
        );

        Ok(Outcome {
            kind: pending.kind().clone(),
            hash: pending.hash(),
            explorer_url: pending.explorer_url().to_string(),
            receipt,
            balance,
            allowance,
        })
    }

    async fn parse_amount(&self, input: &str) -> Result<Amount, WorkflowError> {
        let decimals = self.token.decimals().await?;
        Ok(parse_units(input, decimals).map_err(ValidationError::from)?)
    }

    async fn execute(
        &self,
        session: &Session,
        kind: MutationKind,
        call: TokenCall,
    ) -> Result<PendingTransaction, WorkflowError> {
        let mut mutation = Mutation::new(kind);
        let data = call.encode();
        let to = Some(self.token.address());

        mutation.advance(MutationState::Estimating)?;
        let gas_limit = match session.estimate(to, &data).await {
            Ok(gas) => gas,
            Err(e) => {
                mutation.advance(MutationState::Failed)?;
                debug!(kind = mutation.kind().label(), error = %e, "estimation failed");
                return Err(WorkflowError::from_estimation(e));
            }
        };

        let hash = match session.submit(to, data, gas_limit).await {
            Ok(hash) => hash,
            Err(e) => {
                mutation.advance(MutationState::Failed)?;
                debug!(kind = mutation.kind().label(), error = %e, "submission rejected");
                return Err(WorkflowError::from_submission(e));
            }
        };
        mutation.advance(MutationState::Submitted)?;

        let config = session.config();
        Ok(PendingTransaction::track(
            session.host().clone(),
            hash,
            session.explorer_url(&hash),
            mutation.kind().clone(),
            mutation.history().to_vec(),
            config.poll_interval(),
            config.confirmation_timeout(),
        ))
    }
}

fn parse_address(input: &str) -> Result<Address, ValidationError> {
    Address::parse(input.trim()).map_err(|e| ValidationError::InvalidAddress {
        input: input.to_string(),
        reason: e.to_string(),
    })
}
