// Notifications - transient messages for the user

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
    Loading,
}

/// A message queued for display, optionally linking to the explorer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub link: Option<String>,
}

impl Notification {
    pub fn success(message: &str) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn error(message: &str) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    pub fn loading(message: &str) -> Self {
        Self::new(NotificationLevel::Loading, message)
    }

    pub fn with_link(mut self, url: &str) -> Self {
        self.link = Some(url.to_string());
        self
    }

    fn new(level: NotificationLevel, message: &str) -> Self {
        Self {
            level,
            message: message.to_string(),
            link: None,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Error => "error",
            NotificationLevel::Loading => "..",
        };
        write!(f, "[{}] {}", tag, self.message)?;
        if let Some(link) = &self.link {
            write!(f, " <{}>", link)?;
        }
        Ok(())
    }
}
