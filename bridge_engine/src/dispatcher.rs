//! Outbound calls and the drain loop
//!
//! A synchronous call does not return until the host answers. While it
//! waits, the engine keeps serving whatever the host sends, including
//! callbacks that make calls of their own. Each waiting call is a
//! [`PendingCall`] frame on an explicit stack, bounded by
//! [`EngineConfig::max_call_depth`](crate::EngineConfig).

use crate::config::ReturnCorrelation;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::serializer;
use crate::value::Value;
use bridge_log::LogEntry;
use bridge_wire::{decode, CallId, CallRequest, MessageType, TaggedReturn};
use serde_json::Value as Json;
use std::fmt;

/// Call options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    /// Ask the host not to echo the call
    pub silent: bool,
    /// Ask the host to run the call off its main script thread
    pub fork: bool,
    /// Block until the host returns
    pub sync: bool,
}

impl CallOptions {
    /// Synchronous, non-silent, non-forking
    pub fn new() -> Self {
        Self {
            silent: false,
            fork: false,
            sync: true,
        }
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn with_fork(mut self, fork: bool) -> Self {
        self.fork = fork;
        self
    }

    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }
}

impl Default for CallOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A synchronous call waiting for its `return`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCall {
    pub name: String,
    pub id: CallId,
}

impl fmt::Display for PendingCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

impl Engine {
    /// Calls a host function and waits for its value
    pub fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Value, EngineError> {
        Ok(self
            .call_with(name, args, CallOptions::new())?
            .unwrap_or_default())
    }

    /// Calls a host function without waiting for it
    pub fn call_async(&mut self, name: &str, args: Vec<Value>) -> Result<(), EngineError> {
        self.call_with(name, args, CallOptions::new().with_sync(false))?;
        Ok(())
    }

    /// Calls a host function
    ///
    /// Returns `Some(value)` for synchronous calls and `None` otherwise.
    /// Arguments containing a function force `fork`, since the host cannot
    /// call back into the guest from its main script thread.
    pub fn call_with(
        &mut self,
        name: &str,
        args: Vec<Value>,
        options: CallOptions,
    ) -> Result<Option<Value>, EngineError> {
        let mut fork = options.fork;
        if !fork && args.iter().any(serializer::contains_callable) {
            self.log(LogEntry::debug("forcing fork for call with a callback").with_field("name", name))?;
            fork = true;
        }

        if options.sync && self.frames.len() >= self.config().max_call_depth {
            return Err(EngineError::NestingTooDeep {
                name: name.to_string(),
                limit: self.config().max_call_depth,
            });
        }

        let wire_args = serializer::serialize_args(&args, self.callbacks_mut());
        let request = CallRequest::new(name, wire_args)
            .with_silent(options.silent)
            .with_fork(fork)
            .with_sync(options.sync);

        if !options.sync {
            self.send(&request.into_envelope()?)?;
            return Ok(None);
        }

        let id = CallId::new();
        self.send(&request.with_id(id).into_envelope()?)?;

        self.frames.push(PendingCall {
            name: name.to_string(),
            id,
        });
        let result = self.drain();
        self.frames.pop();

        result.map(Some)
    }

    /// Synchronous calls currently waiting, outermost first
    pub fn pending_calls(&self) -> &[PendingCall] {
        &self.frames
    }

    /// Serves the host until the innermost pending call is answered
    fn drain(&mut self) -> Result<Value, EngineError> {
        loop {
            let Some(line) = self.transport_receive()? else {
                return Err(EngineError::PipeClosed {
                    name: self.innermost_name(),
                });
            };

            let envelope = match decode(&line) {
                Ok(envelope) => envelope,
                Err(err) => {
                    self.log(LogEntry::error("received invalid message").with_field("reason", &err))?;
                    continue;
                }
            };

            if envelope.is(MessageType::Return) {
                if let Some(raw) = self.accept_return(envelope.message)? {
                    return Ok(serializer::deserialize(&raw, self.callbacks()));
                }
                continue;
            }

            self.dispatch_guarded(envelope)?;
        }
    }

    /// Matches a `return` against the innermost pending call
    ///
    /// Returns `None` for a stray return, which is logged and dropped.
    fn accept_return(&mut self, message: Json) -> Result<Option<Json>, EngineError> {
        let Some(frame) = self.frames.last().cloned() else {
            return Err(EngineError::UnhandledMessage {
                name: MessageType::Return.to_string(),
                message: message.to_string(),
            });
        };

        if self.config().return_correlation == ReturnCorrelation::Positional {
            return Ok(Some(message));
        }

        match TaggedReturn::from_message(&message) {
            Some(tagged) if tagged.answers(frame.id) => Ok(Some(tagged.value)),
            Some(tagged) => {
                self.log(
                    LogEntry::warn("discarding stray return")
                        .with_field("id", &tagged.id)
                        .with_field("waiting_on", &frame),
                )?;
                Ok(None)
            }
            None => {
                self.log(
                    LogEntry::warn("discarding untagged return")
                        .with_field("waiting_on", &frame),
                )?;
                Ok(None)
            }
        }
    }

    fn innermost_name(&self) -> String {
        self.frames
            .last()
            .map(|frame| frame.name.clone())
            .unwrap_or_default()
    }
}
