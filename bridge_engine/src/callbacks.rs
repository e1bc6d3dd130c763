//! Callback registry
//!
//! Maps handle names to guest functions so the host can invoke them later.
//! A handle is a prefix (a hint, normally the function's name) plus the
//! function's identity token, which keeps handles unique and stable.

use crate::engine::Engine;
use crate::error::EngineError;
use crate::function::{Function, FunctionId};
use crate::serializer;
use crate::value::Value;
use bridge_log::LogEntry;
use bridge_wire::{CallbackInvocation, TaggedReturn};
use std::collections::HashMap;
use thiserror::Error;

/// Callback lookup and arity errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackError {
    #[error("unknown callback: {name}")]
    UnknownCallback { name: String },

    #[error("{given} is an invalid number of arguments for callback '{name}'. Syntax: {syntax}")]
    Arity {
        name: String,
        given: usize,
        syntax: String,
    },
}

/// Handle-name to function registry
#[derive(Debug, Default)]
pub struct CallbackRegistry {
    callbacks: HashMap<String, Function>,
    handles: HashMap<FunctionId, String>,
}

impl CallbackRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
            handles: HashMap::new(),
        }
    }

    /// Registers a function and returns its handle name
    ///
    /// Registering the same function again returns the existing handle.
    pub fn register(&mut self, function: &Function, prefix: Option<&str>) -> String {
        if let Some(existing) = self.handles.get(&function.id()) {
            return existing.clone();
        }

        let prefix = normalize_prefix(prefix.unwrap_or_else(|| function.name()));
        let handle = format!("{}_{}", prefix, function.id());
        self.callbacks.insert(handle.clone(), function.clone());
        self.handles.insert(function.id(), handle.clone());
        handle
    }

    /// Returns the handle of a registered function
    pub fn handle_of(&self, function: &Function) -> Option<&str> {
        self.handles.get(&function.id()).map(String::as_str)
    }

    /// Looks up a function by handle name
    pub fn resolve(&self, handle: &str) -> Option<&Function> {
        self.callbacks.get(handle)
    }

    /// Looks up a function and checks that it accepts `given` arguments
    pub fn prepare(&self, handle: &str, given: usize) -> Result<Function, CallbackError> {
        let function = self
            .resolve(handle)
            .ok_or_else(|| CallbackError::UnknownCallback {
                name: handle.to_string(),
            })?;

        if !function.signature().accepts(given) {
            return Err(CallbackError::Arity {
                name: handle.to_string(),
                given,
                syntax: function.signature().render(),
            });
        }

        Ok(function.clone())
    }

    /// Removes a function, returning the handle it was registered under
    pub fn unregister(&mut self, function: &Function) -> Option<String> {
        let handle = self.handles.remove(&function.id())?;
        self.callbacks.remove(&handle);
        Some(handle)
    }

    /// Removes a handle, returning the function registered under it
    pub fn unregister_handle(&mut self, handle: &str) -> Option<Function> {
        let function = self.callbacks.remove(handle)?;
        self.handles.remove(&function.id());
        Some(function)
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.callbacks.contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn handles(&self) -> Vec<&str> {
        let mut handles: Vec<&str> = self.callbacks.keys().map(String::as_str).collect();
        handles.sort_unstable();
        handles
    }
}

/// Keeps ASCII alphanumerics, `_` and `-`; `<` and `>` are dropped
fn normalize_prefix(prefix: &str) -> String {
    let normalized: String = prefix
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if normalized.is_empty() {
        "callback".to_string()
    } else {
        normalized
    }
}

impl Engine {
    /// Invokes a registered callback by handle name
    ///
    /// Lookup and arity failures are returned as [`CallbackError`]s and the
    /// function is not run.
    pub fn call_callback(&mut self, handle: &str, args: Vec<Value>) -> Result<Value, EngineError> {
        let function = self.callbacks().prepare(handle, args.len())?;
        self.guarded(|engine| function.invoke(engine, args))
    }

    /// Handles an inbound `callback` message
    ///
    /// Unknown handles are logged at debug level and arity failures are
    /// reported as an `error`; neither is raised. When the host attached an
    /// `id` it always gets a `return` back, `null` when the function did
    /// not produce a value.
    pub(crate) fn handle_callback(
        &mut self,
        invocation: CallbackInvocation,
    ) -> Result<(), EngineError> {
        let CallbackInvocation { name, args, id } = invocation;
        self.log(LogEntry::debug("calling callback").with_field("name", &name))?;

        let args: Vec<Value> = args
            .iter()
            .map(|raw| serializer::deserialize(raw, self.callbacks()))
            .collect();

        let outcome = match self.call_callback(&name, args) {
            Err(EngineError::Callback(err @ CallbackError::UnknownCallback { .. })) => {
                self.log(LogEntry::debug(err.to_string()))?;
                Ok(Value::Null)
            }
            Err(EngineError::Callback(err @ CallbackError::Arity { .. })) => {
                self.error(err.to_string())?;
                Ok(Value::Null)
            }
            other => other,
        };

        match (outcome, id) {
            (Ok(value), Some(id)) => self.answer(id, &value),
            (Ok(_), None) => Ok(()),
            (Err(err), Some(id)) if err.is_recoverable() => {
                self.answer(id, &Value::Null)?;
                Err(err)
            }
            (Err(err), _) => Err(err),
        }
    }

    pub(crate) fn answer(&mut self, id: serde_json::Value, value: &Value) -> Result<(), EngineError> {
        let value = serializer::serialize(value, self.callbacks_mut());
        let envelope = TaggedReturn::new(id, value).into_envelope()?;
        self.send(&envelope)
    }
}
