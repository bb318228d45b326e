// SPDX-License-Identifier: MPL-2.0
//! User-facing status notifications.
//!
//! The viewer never presents messages itself. It hands a [`Notification`]
//! to the host's [`Notifier`], which decides how to show it. Each
//! notification carries a stable message key plus arguments, and an English
//! fallback message for hosts without translations.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Severity level determines how long a host should keep a message visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    /// Operation completed successfully.
    Success,
    /// Informational message, no action needed.
    #[default]
    Info,
    /// Something degraded but the viewer keeps working.
    Warning,
    /// The requested operation failed.
    Error,
}

impl Severity {
    /// Returns the auto-dismiss duration for this severity.
    /// Returns `None` for errors (manual dismiss required).
    #[must_use]
    pub fn auto_dismiss_duration(&self) -> Option<Duration> {
        match self {
            Severity::Success | Severity::Info => Some(Duration::from_secs(3)),
            Severity::Warning => Some(Duration::from_secs(5)),
            Severity::Error => None,
        }
    }
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    severity: Severity,
    message_key: String,
    message_args: Vec<(String, String)>,
    message: String,
}

impl Notification {
    /// Creates a notification with a message key and its English text.
    pub fn new(
        severity: Severity,
        message_key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            message_key: message_key.into(),
            message_args: Vec::new(),
            message: message.into(),
        }
    }

    pub fn info(message_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message_key, message)
    }

    pub fn success(message_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message_key, message)
    }

    pub fn warning(message_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message_key, message)
    }

    pub fn error(message_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message_key, message)
    }

    /// Adds an argument for message interpolation.
    #[must_use]
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.message_args.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    #[must_use]
    pub fn message_key(&self) -> &str {
        &self.message_key
    }

    #[must_use]
    pub fn message_args(&self) -> &[(String, String)] {
        &self.message_args
    }

    /// English text of the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Receives user-facing notifications from a viewer.
pub trait Notifier: Send {
    fn notify(&self, notification: Notification);
}

/// Forwards notifications to `tracing` at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        let key = notification.message_key();
        match notification.severity() {
            Severity::Success | Severity::Info => {
                tracing::info!(key, "{}", notification.message());
            }
            Severity::Warning => tracing::warn!(key, "{}", notification.message()),
            Severity::Error => tracing::error!(key, "{}", notification.message()),
        }
    }
}

/// Keeps notifications in memory for hosts that drain them on their own schedule.
///
/// Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct QueuedNotifier {
    queue: Arc<Mutex<Vec<Notification>>>,
}

impl QueuedNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every pending notification, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Notification> {
        match self.queue.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notifier for QueuedNotifier {
    fn notify(&self, notification: Notification) {
        match self.queue.lock() {
            Ok(mut queue) => queue.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
