//! Error taxonomy and user-facing notifications.
//!
//! Nothing in this subsystem is fatal to the host: every failure either
//! degrades to a visible notification or to a silent logged fallback.

use std::sync::Mutex;
use thiserror::Error;

/// Recoverable failures of the editor subsystem.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A persisted record failed to parse and was discarded.
    #[error("stored record under `{key}` is malformed: {reason}")]
    MalformedStoredState { key: String, reason: String },

    /// The clipboard could not be written; buffer state is unaffected.
    #[error("clipboard unavailable: {0}")]
    ClipboardUnavailable(String),
}

/// Reasons an export did not produce an opened document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    /// The source is empty or whitespace-only; nothing was opened.
    #[error("nothing to export: the document is empty")]
    EmptyContent,

    /// The document has never been successfully saved; nothing was opened.
    #[error("cannot export a document that has never been saved")]
    NeverSaved,

    /// The host refused to open a new rendering context (popup blocked).
    /// The materialized resource is still released on the usual delay.
    #[error("the export window could not be opened")]
    OpenBlocked,
}

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warning,
    Error,
}

/// A message the host should surface to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotifyLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Error,
            message: message.into(),
        }
    }
}

/// Sink for user-visible notifications, provided by the host.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier for headless hosts: everything goes to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotifyLevel::Info => tracing::info!("{}", notification.message),
            NotifyLevel::Warning => tracing::warn!("{}", notification.message),
            NotifyLevel::Error => tracing::error!("{}", notification.message),
        }
    }
}

/// Notifier that records everything it is handed. Test double.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications.lock().unwrap())
    }

    pub fn messages(&self) -> Vec<String> {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}
