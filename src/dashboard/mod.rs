// Dashboard module - presentation state for the token dashboard
// Forms, token display, notifications and a text view, driven by commands

mod command;
mod notification;
mod state;
mod view;

pub use command::*;
pub use notification::*;
pub use state::*;
