//! Typed payloads for calls, returns, callbacks and registrations

use crate::{Envelope, MessageType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Correlation token attached to a synchronous call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(Uuid);

impl CallId {
    /// Creates a new random call ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the ID as it appears on the wire
    pub fn to_value(&self) -> Value {
        Value::String(self.0.to_string())
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Call({})", self.0)
    }
}

/// Request for the host to run one of its functions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRequest {
    /// Host function name
    pub name: String,
    /// Already-serialized arguments
    pub args: Vec<Value>,
    /// Ask the host not to echo the call
    pub silent: bool,
    /// Ask the host to run the call off its main script thread
    pub fork: bool,
    /// The caller blocks for a `return`
    pub sync: bool,
    /// Correlation token (synchronous calls only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CallId>,
}

impl CallRequest {
    /// Creates a synchronous, non-silent, non-forking request
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
            silent: false,
            fork: false,
            sync: true,
            id: None,
        }
    }

    /// Sets the silent flag
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Sets the fork flag
    pub fn with_fork(mut self, fork: bool) -> Self {
        self.fork = fork;
        self
    }

    /// Sets the sync flag
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Attaches a correlation token
    pub fn with_id(mut self, id: CallId) -> Self {
        self.id = Some(id);
        self
    }

    /// Wraps this request in a `call` envelope
    pub fn into_envelope(self) -> Result<Envelope, serde_json::Error> {
        Envelope::with_payload(MessageType::Call, &self)
    }
}

/// A `return` body that names the request it answers
///
/// The guest sends these in reply to host-initiated callbacks that carried
/// an `id`. The host sends them in reply to calls when returns are tagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedReturn {
    /// Returned value
    #[serde(default)]
    pub value: Value,
    /// Correlation token, echoed verbatim
    pub id: Value,
}

impl TaggedReturn {
    /// Creates a tagged return
    pub fn new(id: Value, value: Value) -> Self {
        Self { value, id }
    }

    /// Reads a tagged return out of a `return` body
    pub fn from_message(message: &Value) -> Option<Self> {
        match message {
            Value::Object(fields) if fields.contains_key("id") => {
                Self::deserialize(message).ok()
            }
            _ => None,
        }
    }

    /// Checks whether this answers the given call
    pub fn answers(&self, id: CallId) -> bool {
        self.id == id.to_value()
    }

    /// Wraps this return in a `return` envelope
    pub fn into_envelope(self) -> Result<Envelope, serde_json::Error> {
        Envelope::with_payload(MessageType::Return, &self)
    }
}

/// Host request to fire a registered guest callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackInvocation {
    /// Callback handle name
    pub name: String,
    /// Raw arguments
    #[serde(default)]
    pub args: Vec<Value>,
    /// Return token; when present the guest answers with a [`TaggedReturn`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl CallbackInvocation {
    /// Creates an invocation without a return token
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
            id: None,
        }
    }

    /// Attaches a return token
    pub fn with_id(mut self, id: Value) -> Self {
        self.id = Some(id);
        self
    }
}

/// Body of `command`, `alias`, `event` and `set` registrations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Command, alias, event or modifier name
    pub name: String,
    /// Sentinel-prefixed callback handle
    pub callback: String,
}

impl Registration {
    /// Creates a registration body
    pub fn new(name: impl Into<String>, callback: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            callback: callback.into(),
        }
    }

    /// Wraps this registration in an envelope of the given kind
    pub fn into_envelope(self, kind: MessageType) -> Result<Envelope, serde_json::Error> {
        Envelope::with_payload(kind, &self)
    }
}
