//! User-facing notifications
//!
//! The orchestrator reports outcomes a listener should show, such as a
//! favorite with nothing to play, through a [`NotificationSink`]. Rendering
//! them (toasts, status lines) is up to the application.

use std::fmt;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// A short message for the listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, title, message)
    }

    fn new(level: NotificationLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// Receiver of notifications
pub trait NotificationSink: Send + Sync + fmt::Debug {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the `tracing` pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        let Notification { level, title, message } = notification;
        match level {
            NotificationLevel::Info => tracing::info!(target: "sonos_favorites::notify", %title, %message),
            NotificationLevel::Warning => tracing::warn!(target: "sonos_favorites::notify", %title, %message),
            NotificationLevel::Error => tracing::error!(target: "sonos_favorites::notify", %title, %message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let n = Notification::warning("Morning Show", "nothing to play");
        assert_eq!(n.to_string(), "Morning Show: nothing to play");
        assert_eq!(n.level, NotificationLevel::Warning);
    }

    #[test]
    fn test_tracing_sink_accepts_every_level() {
        let sink = TracingSink;
        sink.notify(Notification::info("a", "b"));
        sink.notify(Notification::error("a", "b"));
    }
}
