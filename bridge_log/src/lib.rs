//! # Bridge Logging
//!
//! Structured log entries for the guest side of the bridge.
//!
//! ## Philosophy
//!
//! Logging is explicit and structured, not printf-style. The host cannot
//! read the guest's error stream, so an entry is rendered into a protocol
//! envelope and travels over the same pipe as every other message.

use bridge_wire::{Envelope, MessageType};
use serde_json::Value;
use std::fmt;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Diagnostic output, only sent while debug mode is on
    Debug,
    /// Script console output
    Info,
    /// Recoverable problems
    Warn,
    /// Errors
    Error,
}

impl LogLevel {
    /// Envelope type this level is written as
    pub fn message_type(&self) -> MessageType {
        match self {
            LogLevel::Debug => MessageType::Debug,
            LogLevel::Info => MessageType::Message,
            LogLevel::Warn | LogLevel::Error => MessageType::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// A structured log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Structured fields
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    /// Creates a new log entry
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Creates a debug entry
    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Debug, message)
    }

    /// Creates an info entry
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    /// Creates a warning entry
    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, message)
    }

    /// Creates an error entry
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    /// Adds a field to the log entry
    pub fn with_field(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.fields.push((key.into(), value.to_string()));
        self
    }

    /// Checks whether this entry is sent with the given debug setting
    pub fn is_enabled(&self, debug_on: bool) -> bool {
        self.level != LogLevel::Debug || debug_on
    }

    /// Renders the message followed by `key=value` fields
    pub fn render(&self) -> String {
        let mut line = self.message.clone();
        for (key, value) in &self.fields {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            if value.is_empty() || value.contains(char::is_whitespace) {
                line.push_str(&format!("{:?}", value));
            } else {
                line.push_str(value);
            }
        }
        line
    }

    /// Converts the entry into the envelope that carries it
    pub fn into_envelope(self) -> Envelope {
        Envelope::new(self.level.message_type(), Value::String(self.render()))
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.render())
    }
}
