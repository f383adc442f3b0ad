//! User-facing notifications (toasts)

use serde::{Deserialize, Serialize};

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationLevel {
    /// Confirmation of a successful action
    Info,
    /// Something the user may want to look at
    Warning,
    /// A failed action; buffer and history are untouched
    Error,
}

/// A transient message surfaced at the UI boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    /// Short headline, e.g. "Copied to clipboard"
    pub title: String,
    /// Longer description
    pub message: String,
    /// Origin of the notification (e.g. "clipboard", "import", "goal")
    pub source: String,
}

impl Notification {
    pub fn new(
        level: NotificationLevel,
        title: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn info(
        title: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self::new(NotificationLevel::Info, title, message, source)
    }

    pub fn warning(
        title: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self::new(NotificationLevel::Warning, title, message, source)
    }

    pub fn error(
        title: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self::new(NotificationLevel::Error, title, message, source)
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}
