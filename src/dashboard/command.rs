// Command - one line of dashboard input

use std::str::FromStr;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  connect                              connect the configured account
  refresh                              reload token name, symbol and balance
  approve <spender> <amount>           allow spender to use your tokens
  allowance [spender]                  show allowance granted to spender
  spend <owner> <recipient> <amount>   transferFrom owner to recipient
  transfer <to> <amount>               send your tokens
  help                                 show this text
  quit                                 leave the dashboard";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Connect,
    Refresh,
    Approve { spender: String, amount: String },
    Allowance { spender: Option<String> },
    Spend {
        owner: String,
        recipient: String,
        amount: String,
    },
    Transfer { to: String, amount: String },
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = words.split_first() else {
            return Err(CommandError::Usage("help"));
        };

        let owned = |i: usize| args[i].to_string();

        match (name.to_ascii_lowercase().as_str(), args.len()) {
            ("connect", 0) => Ok(Command::Connect),
            ("refresh", 0) => Ok(Command::Refresh),
            ("approve", 2) => Ok(Command::Approve {
                spender: owned(0),
                amount: owned(1),
            }),
            ("approve", _) => Err(CommandError::Usage("approve <spender> <amount>")),
            ("allowance", 0) => Ok(Command::Allowance { spender: None }),
            ("allowance", 1) => Ok(Command::Allowance {
                spender: Some(owned(0)),
            }),
            ("allowance", _) => Err(CommandError::Usage("allowance [spender]")),
            ("spend", 3) => Ok(Command::Spend {
                owner: owned(0),
                recipient: owned(1),
                amount: owned(2),
            }),
            ("spend", _) => Err(CommandError::Usage("spend <owner> <recipient> <amount>")),
            ("transfer", 2) => Ok(Command::Transfer {
                to: owned(0),
                amount: owned(1),
            }),
            ("transfer", _) => Err(CommandError::Usage("transfer <to> <amount>")),
            ("help", _) | ("?", _) => Ok(Command::Help),
            ("quit", _) | ("exit", _) => Ok(Command::Quit),
            ("connect", _) => Err(CommandError::Usage("connect")),
            ("refresh", _) => Err(CommandError::Usage("refresh")),
            (other, _) => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
