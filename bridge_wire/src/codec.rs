//! Line codec for envelopes
//!
//! `encode` produces exactly one JSON object followed by `\n`. `decode`
//! accepts one line and never panics: malformed input comes back as a
//! [`DecodeError`] carrying a description the caller can forward to the
//! host as an `error` message.

use crate::Envelope;
use serde_json::{Map, Value};
use thiserror::Error;

/// Failure to encode an outbound envelope
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode '{name}' envelope: {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure to decode an inbound line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{description}")]
pub struct DecodeError {
    description: String,
}

impl DecodeError {
    /// Creates a decode error
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    /// Returns the human-readable description
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Encodes an envelope as a single newline-terminated line
pub fn encode(envelope: &Envelope) -> Result<String, CodecError> {
    let mut line = serde_json::to_string(envelope).map_err(|source| CodecError::Encode {
        name: envelope.name.clone(),
        source,
    })?;
    line.push('\n');
    Ok(line)
}

/// Decodes one line into an envelope
pub fn decode(line: &str) -> Result<Envelope, DecodeError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(DecodeError::new("empty line"));
    }

    let raw: Value = serde_json::from_str(line).map_err(|e| DecodeError::new(e.to_string()))?;
    let mut fields = match unquote_keys(raw) {
        Value::Object(fields) => fields,
        other => {
            return Err(DecodeError::new(format!(
                "expected an object, got {}",
                type_name(&other)
            )))
        }
    };

    let name = match fields.remove("name") {
        Some(Value::String(name)) => name,
        Some(other) => {
            return Err(DecodeError::new(format!(
                "'name' must be a string, got {}",
                type_name(&other)
            )))
        }
        None => return Err(DecodeError::new("missing 'name'")),
    };
    let message = fields.remove("message").unwrap_or(Value::Null);

    Ok(Envelope { name, message })
}

/// Strips one level of single quotes from mapping keys at every depth
///
/// The host's marshaller renders keys as `'key'`. A key is rewritten when it
/// starts with a quote and a non-empty run of non-quote characters is
/// closed by a second quote; anything after the closing quote is dropped.
pub fn unquote_keys(value: Value) -> Value {
    match value {
        Value::Object(fields) => {
            let mut fixed = Map::with_capacity(fields.len());
            for (key, item) in fields {
                fixed.insert(unquote_key(&key), unquote_keys(item));
            }
            Value::Object(fixed)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(unquote_keys).collect()),
        other => other,
    }
}

fn unquote_key(key: &str) -> String {
    key.strip_prefix('\'')
        .and_then(|rest| rest.split_once('\''))
        .filter(|(inner, _)| !inner.is_empty())
        .map(|(inner, _)| inner.to_string())
        .unwrap_or_else(|| key.to_string())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
