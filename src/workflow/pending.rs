// PendingTransaction - a submitted mutation awaiting its receipt
//
// A spawned task polls the host for the receipt and publishes the result
// on a watch channel; any number of observers can read or await it.

use super::{MutationKind, MutationState};
use crate::host::{LedgerHost, Receipt, TxHash};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Observable status of a submitted transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxStatus {
    /// Accepted by the host, no receipt yet
    Submitted,
    /// Mined and executed successfully
    Confirmed(Receipt),
    /// Reverted when mined, or no receipt before the timeout
    Failed {
        reason: String,
        receipt: Option<Receipt>,
    },
}

impl TxStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, TxStatus::Submitted)
    }

    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            TxStatus::Submitted => None,
            TxStatus::Confirmed(receipt) => Some(receipt),
            TxStatus::Failed { receipt, .. } => receipt.as_ref(),
        }
    }
}

/// A submitted mutation
pub struct PendingTransaction {
    hash: TxHash,
    explorer_url: String,
    kind: MutationKind,
    history: Vec<MutationState>,
    status: watch::Receiver<TxStatus>,
}

impl PendingTransaction {
    /// Start tracking `hash` on `host`
    pub(crate) fn track(
        host: Arc<dyn LedgerHost>,
        hash: TxHash,
        explorer_url: String,
        kind: MutationKind,
        history: Vec<MutationState>,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Self {
        let (sender, status) = watch::channel(TxStatus::Submitted);

        tokio::spawn(async move {
            let resolved = await_receipt(host.as_ref(), &hash, poll_interval, timeout).await;
            // No receivers left is fine; nobody is waiting.
            let _ = sender.send(resolved);
        });

        Self {
            hash,
            explorer_url,
            kind,
            history,
            status,
        }
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// Block explorer link for this transaction
    pub fn explorer_url(&self) -> &str {
        &self.explorer_url
    }

    pub fn kind(&self) -> &MutationKind {
        &self.kind
    }

    /// Current status without waiting
    pub fn status(&self) -> TxStatus {
        self.status.borrow().clone()
    }

    /// A receiver that observes every status change
    pub fn subscribe(&self) -> watch::Receiver<TxStatus> {
        self.status.clone()
    }

    /// Lifecycle state derived from the current status
    pub fn state(&self) -> MutationState {
        match &*self.status.borrow() {
            TxStatus::Submitted => MutationState::Submitted,
            TxStatus::Confirmed(_) => MutationState::Confirmed,
            TxStatus::Failed { .. } => MutationState::Reverted,
        }
    }

    /// States passed through so far, including the current one
    pub fn history(&self) -> Vec<MutationState> {
        let mut history = self.history.clone();
        let current = self.state();
        if history.last() != Some(&current) {
            history.push(current);
        }
        history
    }

    /// Wait until the transaction is confirmed or has failed
    pub async fn confirmation(&self) -> TxStatus {
        let mut status = self.status.clone();
        let resolved = match status.wait_for(|s| !s.is_pending()).await {
            Ok(resolved) => resolved.clone(),
            Err(_) => TxStatus::Failed {
                reason: "confirmation tracking stopped".to_string(),
                receipt: None,
            },
        };
        resolved
    }
}

impl std::fmt::Debug for PendingTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTransaction")
            .field("hash", &self.hash)
            .field("kind", &self.kind)
            .field("state", &self.state())
            .finish()
    }
}

pub(crate) async fn await_receipt(
    host: &dyn LedgerHost,
    hash: &TxHash,
    poll_interval: Duration,
    timeout: Duration,
) -> TxStatus {
    let deadline = Instant::now() + timeout;

    loop {
        match host.receipt(hash).await {
            Ok(Some(receipt)) if receipt.is_success() => {
                info!(tx = %hash, block = receipt.block_number, "transaction confirmed");
                return TxStatus::Confirmed(receipt);
            }
            Ok(Some(receipt)) => {
                let reason = receipt
                    .revert_reason
                    .clone()
                    .unwrap_or_else(|| "transaction reverted".to_string());
                warn!(tx = %hash, %reason, "transaction reverted");
                return TxStatus::Failed {
                    reason,
                    receipt: Some(receipt),
                };
            }
            Ok(None) => {}
            Err(e) => debug!(tx = %hash, error = %e, "receipt poll failed"),
        }

        if Instant::now() >= deadline {
            warn!(tx = %hash, "transaction not confirmed in time");
            return TxStatus::Failed {
                reason: format!("not confirmed within {}s", timeout.as_secs()),
                receipt: None,
            };
        }
        tokio::time::sleep(poll_interval).await;
    }
}
