//! Conversion between guest values and wire JSON
//!
//! Bytes and functions have no JSON form and travel as sentinel-prefixed
//! strings. Serializing a function registers it, so the host can use the
//! handle it receives.

use crate::callbacks::CallbackRegistry;
use crate::value::Value;
use bridge_wire::{decode_bytes, decode_handle, encode_bytes, encode_handle};
use serde_json::{Map, Number, Value as Json};

/// Converts a value into its wire form
///
/// Non-finite floats have no JSON form and become `null`.
pub fn serialize(value: &Value, registry: &mut CallbackRegistry) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::Number(Number::from(*i)),
        Value::Float(f) => Number::from_f64(*f).map_or(Json::Null, Json::Number),
        Value::Str(s) => Json::String(s.clone()),
        Value::Bytes(bytes) => Json::String(encode_bytes(bytes)),
        Value::List(items) => Json::Array(
            items
                .iter()
                .map(|item| serialize(item, registry))
                .collect(),
        ),
        Value::Map(entries) => Json::Object(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), serialize(item, registry)))
                .collect::<Map<String, Json>>(),
        ),
        Value::Function(function) => {
            let handle = registry.register(function, None);
            Json::String(encode_handle(&handle))
        }
    }
}

/// Serializes an argument list
pub fn serialize_args(args: &[Value], registry: &mut CallbackRegistry) -> Vec<Json> {
    args.iter().map(|arg| serialize(arg, registry)).collect()
}

/// Checks whether a value contains a function at any depth
pub fn contains_callable(value: &Value) -> bool {
    match value {
        Value::Function(_) => true,
        Value::List(items) => items.iter().any(contains_callable),
        Value::Map(entries) => entries.values().any(contains_callable),
        _ => false,
    }
}

/// Converts a wire value back into a guest value
///
/// Byte sentinels are decoded. Callback sentinels naming a registered
/// handle resolve to that function; any other sentinel is left as a string.
pub fn deserialize(raw: &Json, registry: &CallbackRegistry) -> Value {
    match raw {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map_or(Value::Null, Value::Float),
        },
        Json::String(s) => deserialize_string(s, registry),
        Json::Array(items) => Value::List(
            items
                .iter()
                .map(|item| deserialize(item, registry))
                .collect(),
        ),
        Json::Object(entries) => Value::Map(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), deserialize(item, registry)))
                .collect(),
        ),
    }
}

fn deserialize_string(s: &str, registry: &CallbackRegistry) -> Value {
    if let Some(Ok(bytes)) = decode_bytes(s) {
        return Value::Bytes(bytes);
    }

    if let Some(function) = decode_handle(s).and_then(|handle| registry.resolve(handle)) {
        return Value::Function(function.clone());
    }

    Value::Str(s.to_string())
}
