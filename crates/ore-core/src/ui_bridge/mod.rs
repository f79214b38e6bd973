//! # Ore Client UI Bridge
//!
//! The one-way channel through which the plugin manager reports progress and
//! warnings to whoever drives it (a console, a chat command, a test).
//! Delivery is fire-and-forget: a messenger cannot fail an operation.
use std::fmt;
use std::sync::Mutex;

/// UI message severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    /// Progress information
    Info,
    /// Something the user should look at; the operation continues
    Warning,
}

impl fmt::Display for MessageSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageSeverity::Info => write!(f, "info"),
            MessageSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// Sink for user-facing progress and warning messages
pub trait Messenger: Send + Sync {
    fn deliver_message(&self, severity: MessageSeverity, message: &str);
}

/// Messenger forwarding everything to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMessenger;

impl Messenger for LogMessenger {
    fn deliver_message(&self, severity: MessageSeverity, message: &str) {
        match severity {
            MessageSeverity::Info => log::info!("{}", message),
            MessageSeverity::Warning => log::warn!("{}", message),
        }
    }
}

/// Messenger that records every message it receives
#[derive(Debug, Default)]
pub struct BufferedMessenger {
    messages: Mutex<Vec<(MessageSeverity, String)>>,
}

impl BufferedMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages received so far, oldest first
    pub fn messages(&self) -> Vec<(MessageSeverity, String)> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    /// Messages of the given severity
    pub fn with_severity(&self, severity: MessageSeverity) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, message)| message)
            .collect()
    }

    /// Shorthand for the warnings received so far
    pub fn warnings(&self) -> Vec<String> {
        self.with_severity(MessageSeverity::Warning)
    }

    /// Drop everything recorded so far, returning it
    pub fn drain(&self) -> Vec<(MessageSeverity, String)> {
        self.messages
            .lock()
            .map(|mut messages| std::mem::take(&mut *messages))
            .unwrap_or_default()
    }
}

impl Messenger for BufferedMessenger {
    fn deliver_message(&self, severity: MessageSeverity, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((severity, message.to_string()));
        }
    }
}
