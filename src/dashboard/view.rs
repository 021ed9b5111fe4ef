// Text view of the dashboard

use super::Dashboard;
use std::fmt::Write;

const DEFAULT_TITLE: &str = "ERC-20 Dashboard";

impl Dashboard {
    /// Render the current state as plain text
    pub fn render(&self) -> String {
        let mut out = String::new();
        let token = self.token_view();
        let title = if token.name.is_empty() {
            DEFAULT_TITLE
        } else {
            token.name.as_str()
        };

        // Writing to a String cannot fail.
        let _ = writeln!(out, "== {} ==", title);

        let Some(account) = self.account() else {
            let _ = writeln!(out, "not connected (type 'connect')");
            return out;
        };

        let _ = writeln!(out, "account   {}", account);
        let _ = writeln!(
            out,
            "symbol    {:<12} balance {:<24} decimals {}",
            token.symbol, token.balance, token.decimals
        );

        let _ = writeln!(out, "-- Approve (Owner) --");
        let _ = writeln!(out, "spender   {}", placeholder(&self.approve_form.spender));
        let _ = writeln!(out, "amount    {}", placeholder(&self.approve_form.amount));
        let _ = writeln!(out, "allowance {}", self.allowance());

        let _ = writeln!(out, "-- Spend Allowance (Spender) --");
        let _ = writeln!(out, "owner     {}", placeholder(&self.spend_form.owner));
        let _ = writeln!(out, "recipient {}", placeholder(&self.spend_form.recipient));
        let _ = writeln!(out, "amount    {}", placeholder(&self.spend_form.amount));

        let _ = writeln!(out, "-- Transfer Tokens --");
        let _ = writeln!(out, "recipient {}", placeholder(&self.transfer_form.to));
        let _ = writeln!(out, "amount    {}", placeholder(&self.transfer_form.amount));

        out
    }
}

fn placeholder(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}
