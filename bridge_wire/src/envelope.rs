//! Envelope structure and message type tags

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Message type tag carried in an envelope's `name`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Guest asks the host to run a function
    Call,
    /// Result of the innermost synchronous call
    Return,
    /// Code to evaluate on the receiving side
    Eval,
    /// Host fires a registered guest callback
    Callback,
    /// Debug output, or a debug toggle when sent by the host
    Debug,
    /// Error output for the script console
    Error,
    /// Plain script console output
    Message,
    /// Command registration
    Command,
    /// Alias registration
    Alias,
    /// Event handler registration
    Event,
    /// Menu tree registration
    Menu,
    /// Guest asks the host to fork
    Fork,
    /// Output modifier registration
    Set,
    /// Ends the guest's read loop
    Stop,
    /// Asks the host to forget a registration
    Delete,
}

impl MessageType {
    /// Every tag known to the protocol
    pub const ALL: [MessageType; 15] = [
        MessageType::Call,
        MessageType::Return,
        MessageType::Eval,
        MessageType::Callback,
        MessageType::Debug,
        MessageType::Error,
        MessageType::Message,
        MessageType::Command,
        MessageType::Alias,
        MessageType::Event,
        MessageType::Menu,
        MessageType::Fork,
        MessageType::Set,
        MessageType::Stop,
        MessageType::Delete,
    ];

    /// Returns the wire tag
    pub const fn as_str(&self) -> &'static str {
        match self {
            MessageType::Call => "call",
            MessageType::Return => "return",
            MessageType::Eval => "eval",
            MessageType::Callback => "callback",
            MessageType::Debug => "debug",
            MessageType::Error => "error",
            MessageType::Message => "message",
            MessageType::Command => "command",
            MessageType::Alias => "alias",
            MessageType::Event => "event",
            MessageType::Menu => "menu",
            MessageType::Fork => "fork",
            MessageType::Set => "set",
            MessageType::Stop => "stop",
            MessageType::Delete => "delete",
        }
    }

    /// Parses a wire tag
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single wire-level record
///
/// `name` is kept as a plain string so that unknown tags survive decoding
/// and can be reported by the router instead of failing the codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message type tag
    pub name: String,
    /// Message body
    #[serde(default)]
    pub message: Value,
}

impl Envelope {
    /// Creates an envelope for a known message type
    pub fn new(kind: MessageType, message: Value) -> Self {
        Self {
            name: kind.as_str().to_string(),
            message,
        }
    }

    /// Creates an envelope with an arbitrary tag
    pub fn raw(name: impl Into<String>, message: Value) -> Self {
        Self {
            name: name.into(),
            message,
        }
    }

    /// Creates a body-less envelope such as `fork`
    pub fn signal(kind: MessageType) -> Self {
        Self::new(kind, Value::String(String::new()))
    }

    /// Creates an envelope from a serializable payload
    pub fn with_payload<T: Serialize>(
        kind: MessageType,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(kind, serde_json::to_value(payload)?))
    }

    /// Returns the message type, if the tag is known
    pub fn kind(&self) -> Option<MessageType> {
        MessageType::parse(&self.name)
    }

    /// Checks the message type
    pub fn is(&self, kind: MessageType) -> bool {
        self.name == kind.as_str()
    }

    /// Deserializes the body into a typed payload
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_type_round_trips_every_tag() {
        for kind in MessageType::ALL {
            assert_eq!(MessageType::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_tag_is_none() {
        assert_eq!(MessageType::parse("bogus"), None);
        assert_eq!(MessageType::parse("Call"), None);
    }

    #[test]
    fn test_envelope_kind() {
        let envelope = Envelope::new(MessageType::Callback, json!({"name": "cb"}));
        assert_eq!(envelope.kind(), Some(MessageType::Callback));
        assert!(envelope.is(MessageType::Callback));
        assert!(!envelope.is(MessageType::Return));

        let unknown = Envelope::raw("frobnicate", Value::Null);
        assert_eq!(unknown.kind(), None);
    }

    #[test]
    fn test_signal_has_empty_string_body() {
        let envelope = Envelope::signal(MessageType::Fork);
        assert_eq!(envelope.name, "fork");
        assert_eq!(envelope.message, json!(""));
    }

    #[test]
    fn test_typed_payload() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Body {
            value: i32,
        }

        let envelope = Envelope::with_payload(MessageType::Message, &Body { value: 7 }).unwrap();
        let body: Body = envelope.payload().unwrap();
        assert_eq!(body, Body { value: 7 });
    }
}
