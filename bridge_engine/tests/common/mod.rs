//! Shared helpers for engine integration tests

#![allow(dead_code)]

use bridge_engine::{Engine, EngineConfig, MemoryTransport, MemoryTransportHandle};
use bridge_wire::{Envelope, MessageType};
use serde_json::{json, Value as Json};

/// Creates an engine over a memory transport
pub fn engine_with(config: EngineConfig) -> (Engine, MemoryTransportHandle) {
    let transport = MemoryTransport::new();
    let host = transport.handle();
    (Engine::new(transport, config), host)
}

/// Creates an engine that does not fork when run
pub fn unforked_engine() -> (Engine, MemoryTransportHandle) {
    engine_with(EngineConfig::new().with_fork_first(false))
}

pub fn callback(handle: &str, args: Json) -> Envelope {
    Envelope::new(MessageType::Callback, json!({"name": handle, "args": args}))
}

pub fn callback_with_id(handle: &str, args: Json, id: Json) -> Envelope {
    Envelope::new(
        MessageType::Callback,
        json!({"name": handle, "args": args, "id": id}),
    )
}

pub fn ret(value: Json) -> Envelope {
    Envelope::new(MessageType::Return, value)
}

/// Bodies of `error` envelopes sent so far
pub fn errors(host: &MemoryTransportHandle) -> Vec<String> {
    host.sent()
        .iter()
        .filter(|e| e.is(MessageType::Error))
        .filter_map(|e| e.message.as_str().map(str::to_string))
        .collect()
}

/// `call` envelopes sent so far
pub fn calls(host: &MemoryTransportHandle) -> Vec<Json> {
    host.sent()
        .into_iter()
        .filter(|e| e.is(MessageType::Call))
        .map(|e| e.message)
        .collect()
}
