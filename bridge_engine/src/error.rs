//! Engine error types

use crate::callbacks::CallbackError;
use crate::transport::TransportError;
use bridge_wire::CodecError;
use fork_gate::GateError;
use std::error::Error as _;
use std::fmt;
use thiserror::Error;

/// Engine error types
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Callback(#[from] CallbackError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Failed to build payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("received unhandled or out-of-order message type: {name} {message}")]
    UnhandledMessage { name: String, message: String },

    #[error("malformed '{name}' message: {reason}")]
    MalformedMessage { name: String, reason: String },

    #[error("call to '{name}' would exceed the maximum call depth of {limit}")]
    NestingTooDeep { name: String, limit: usize },

    #[error("pipe closed while waiting for '{name}' to return")]
    PipeClosed { name: String },

    #[error("stopped by the host")]
    Stopped,

    #[error("{0}")]
    Handler(String),

    #[error("handler panicked: {message}")]
    Panicked { message: String, trace: String },

    #[error("invalid menu: {0}")]
    InvalidMenu(String),

    #[error("tried to register an unofficial event: {0}")]
    UnknownEvent(String),

    #[error("tried to register an unknown output modifier: {0}")]
    UnknownModifier(String),
}

impl EngineError {
    /// Creates a handler failure from any displayable error
    pub fn handler(message: impl fmt::Display) -> Self {
        EngineError::Handler(message.to_string())
    }

    /// Gate violations: state-corrupting protocol bugs
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Gate(_))
    }

    /// End of input, either by `stop` or by the pipe closing
    pub fn ends_loop(&self) -> bool {
        matches!(self, EngineError::Stopped | EngineError::PipeClosed { .. })
    }

    /// Errors the read loop reports and then survives
    pub fn is_recoverable(&self) -> bool {
        !(self.is_fatal() || self.ends_loop() || matches!(self, EngineError::Transport(_)))
    }

    /// Renders the error with its cause chain
    pub fn chain(&self) -> String {
        if let EngineError::Panicked { message, trace } = self {
            return format!("panicked: {}\n{}", message, trace);
        }

        let mut rendered = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            rendered.push_str(&format!("\n  caused by: {}", cause));
            source = cause.source();
        }
        rendered
    }
}
