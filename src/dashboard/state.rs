// Dashboard - what the user sees and the actions behind each form
//
// Actions never return errors. Every failure is turned into an error
// notification and the dashboard stays usable.

use super::{Command, Notification};
use crate::config::ClientConfig;
use crate::host::LedgerHost;
use crate::identity::{Address, Keypair};
use crate::session::{Session, SessionError};
use crate::units::{format_units, Amount};
use crate::workflow::{Workflow, WorkflowError};
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// DISPLAY STATE
// ============================================================================

/// Token fields shown at the top of the dashboard
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenView {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Caller's balance, already formatted
    pub balance: String,
}

impl Default for TokenView {
    fn default() -> Self {
        Self {
            name: String::new(),
            symbol: String::new(),
            decimals: 18,
            balance: "0".to_string(),
        }
    }
}

/// Owner side: grant an allowance
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApproveForm {
    pub spender: String,
    pub amount: String,
}

/// Spender side: consume an allowance
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpendForm {
    pub owner: String,
    pub recipient: String,
    pub amount: String,
}

/// Direct transfer of the caller's own tokens
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferForm {
    pub to: String,
    pub amount: String,
}

// ============================================================================
// DASHBOARD
// ============================================================================

pub struct Dashboard {
    config: ClientConfig,
    session: Option<Arc<Session>>,
    workflow: Option<Workflow>,
    token: TokenView,
    allowance: String,
    notifications: Vec<Notification>,
    pub approve_form: ApproveForm,
    pub spend_form: SpendForm,
    pub transfer_form: TransferForm,
}

impl Dashboard {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            session: None,
            workflow: None,
            token: TokenView::default(),
            allowance: "0".to_string(),
            notifications: Vec::new(),
            approve_form: ApproveForm::default(),
            spend_form: SpendForm::default(),
            transfer_form: TransferForm::default(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Connected account, if any
    pub fn account(&self) -> Option<Address> {
        self.session.as_ref().map(|s| s.address())
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_deref()
    }

    pub fn token_view(&self) -> &TokenView {
        &self.token
    }

    /// Last loaded allowance, formatted
    pub fn allowance(&self) -> &str {
        &self.allowance
    }

    /// Take all queued notifications
    pub fn poll_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify(&mut self, notification: Notification) {
        debug!(%notification, "notify");
        self.notifications.push(notification);
    }

    // ========================================================================
    // CONNECTION
    // ========================================================================

    /// Establish a session and load the token
    pub async fn connect(&mut self, host: Arc<dyn LedgerHost>, signer: Option<Keypair>) {
        let session = match Session::establish(host, signer, self.config.clone()).await {
            Ok(session) => session,
            Err(e) => {
                self.notify(Notification::error(&format!("Wallet connection failed: {}", e)));
                return;
            }
        };

        self.notify(Notification::success("Wallet connected"));
        if !session.on_expected_network() {
            self.notify(Notification::error(&format!(
                "Please switch to {} network",
                self.config.network_name
            )));
        }

        match session.token() {
            Ok(token) => self.workflow = Some(Workflow::new(token)),
            Err(SessionError::NoToken) => {
                self.workflow = None;
                self.notify(Notification::error("No token address configured"));
            }
            Err(e) => {
                self.workflow = None;
                self.notify(Notification::error(&e.to_string()));
            }
        }

        self.session = Some(Arc::new(session));
        self.token = TokenView::default();
        self.allowance = "0".to_string();
        self.load_token().await;
    }

    /// Re-read name, symbol, decimals and the caller's balance
    pub async fn load_token(&mut self) {
        let (Some(session), Some(workflow)) = (&self.session, &self.workflow) else {
            return;
        };
        let token = workflow.token();
        let account = session.address();

        let loaded = tokio::try_join!(
            token.name(),
            token.symbol(),
            token.decimals(),
            token.balance_of(account)
        );

        match loaded {
            Ok((name, symbol, decimals, balance)) => {
                self.token = TokenView {
                    name,
                    symbol,
                    decimals,
                    balance: format_units(balance, decimals),
                };
            }
            Err(e) => self.notify(Notification::error(&format!("Failed to load token: {}", e))),
        }
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    /// Approve the spender in the approve form
    pub async fn approve(&mut self) {
        let Some((session, workflow)) = self.connected() else {
            return;
        };
        let form = self.approve_form.clone();

        let pending = match workflow.approve(&session, &form.spender, &form.amount).await {
            Ok(pending) => pending,
            Err(e) => {
                let message = failure_message(&e, "Approve failed");
                self.notify(Notification::error(&message));
                return;
            }
        };
        self.notify(Notification::loading("Approving..."));

        let result = workflow.finish(&session, pending).await;
        match result {
            Ok(outcome) => {
                self.notify(Notification::success("Approved"));
                if let Some(allowance) = outcome.allowance {
                    self.allowance = self.format(allowance);
                }
            }
            Err(e) => {
                let message = failure_message(&e, "Approve failed");
                self.notify(Notification::error(&message));
            }
        }
    }

    /// Read the allowance the caller granted to the approve form's spender
    pub async fn load_allowance(&mut self) {
        let Some((session, workflow)) = self.connected() else {
            return;
        };
        let spender = match Address::parse(self.approve_form.spender.trim()) {
            Ok(spender) => spender,
            Err(e) => {
                self.notify(Notification::error(&format!("Invalid spender address: {}", e)));
                return;
            }
        };

        match workflow.token().allowance(session.address(), spender).await {
            Ok(allowance) => self.allowance = self.format(allowance),
            Err(e) => self.notify(Notification::error(&format!("Failed to load allowance: {}", e))),
        }
    }

    /// Spend the allowance described by the spend form
    pub async fn transfer_from_owner(&mut self) {
        let Some((session, workflow)) = self.connected() else {
            return;
        };
        let form = self.spend_form.clone();

        let pending = match workflow
            .transfer_from(&session, &form.owner, &form.recipient, &form.amount)
            .await
        {
            Ok(pending) => pending,
            Err(e) => {
                let message = failure_message(&e, "transferFrom failed");
                self.notify(Notification::error(&message));
                return;
            }
        };

        self.notify(Notification::loading("Spending allowance..."));
        self.notify(Notification::success("View on Etherscan").with_link(pending.explorer_url()));

        match workflow.finish(&session, pending).await {
            Ok(_) => self.notify(Notification::success("Allowance spent")),
            Err(_) => self.notify(Notification::error("transferFrom failed")),
        }

        self.load_token().await;
        if !self.approve_form.spender.trim().is_empty() {
            self.load_allowance().await;
        }
    }

    /// Send the caller's tokens as described by the transfer form
    pub async fn transfer(&mut self) {
        let Some((session, workflow)) = self.connected() else {
            return;
        };
        let form = self.transfer_form.clone();

        let pending = match workflow.transfer(&session, &form.to, &form.amount).await {
            Ok(pending) => pending,
            Err(e) => {
                let message = failure_message(&e, "Transfer failed");
                self.notify(Notification::error(&message));
                return;
            }
        };

        self.notify(Notification::loading("Transferring tokens..."));
        self.notify(Notification::success("View on Etherscan").with_link(pending.explorer_url()));

        match workflow.finish(&session, pending).await {
            Ok(_) => self.notify(Notification::success("Transfer successful")),
            Err(_) => self.notify(Notification::error("Transfer failed")),
        }

        self.load_token().await;
    }

    /// Fill the matching form and run the action for a parsed command
    ///
    /// `connect`, `help` and `quit` need the caller's context and are
    /// ignored here; returns whether the command was handled.
    pub async fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Refresh => self.load_token().await,
            Command::Approve { spender, amount } => {
                self.approve_form = ApproveForm { spender, amount };
                self.approve().await;
            }
            Command::Allowance { spender } => {
                if let Some(spender) = spender {
                    self.approve_form.spender = spender;
                }
                self.load_allowance().await;
            }
            Command::Spend {
                owner,
                recipient,
                amount,
            } => {
                self.spend_form = SpendForm {
                    owner,
                    recipient,
                    amount,
                };
                self.transfer_from_owner().await;
            }
            Command::Transfer { to, amount } => {
                self.transfer_form = TransferForm { to, amount };
                self.transfer().await;
            }
            Command::Connect | Command::Help | Command::Quit => return false,
        }
        true
    }

    /// Session and workflow, or an error notification when not connected
    fn connected(&mut self) -> Option<(Arc<Session>, Workflow)> {
        if self.session.is_none() {
            self.notify(Notification::error("Connect a wallet first"));
            return None;
        }
        if self.workflow.is_none() {
            self.notify(Notification::error("No token address configured"));
            return None;
        }
        self.session.clone().zip(self.workflow.clone())
    }

    fn format(&self, amount: Amount) -> String {
        format_units(amount, self.token.decimals)
    }
}

/// Revert reasons surface as-is; everything else falls back to `fallback`
fn failure_message(err: &WorkflowError, fallback: &str) -> String {
    match err {
        WorkflowError::Estimation(reason) if !reason.is_empty() => reason.clone(),
        WorkflowError::Validation(_)
        | WorkflowError::Connection(_)
        | WorkflowError::Submission(_) => err.user_message(),
        _ => fallback.to_string(),
    }
}
