// ── Notifications ──
//
// A notification is the transient "last async outcome" shown to the user.
// It is overwritten, never queued: each new event replaces the previous
// one. The sink is an injected interface so the action layer never
// reaches for an ambient singleton.

use chrono::{DateTime, Utc};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient message signaling the outcome of an async operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            message: message.into(),
            level,
            at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Error)
    }
}

/// Where session operations report user-facing outcomes.
///
/// Injected into [`Session`](crate::Session); the default sink is the
/// store's notification slot, but tests and embedders can substitute
/// their own.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// A sink that drops everything. Useful for headless or scripted use.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl NotificationSink for DiscardSink {
    fn notify(&self, _notification: Notification) {}
}
