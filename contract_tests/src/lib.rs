//! # Wire Contract Tests
//!
//! This crate provides "golden" tests for the bridge wire format to ensure
//! it doesn't drift accidentally over time.
//!
//! ## Philosophy
//!
//! - **Explicit over implicit**: The host's expectations are written as code
//! - **Testability first**: Contract tests fail when the wire format changes
//! - **Mechanism not policy**: Define what must be stable, not how to use it
//!
//! ## Structure
//!
//! Each module pins one part of the contract:
//! - Envelope type tags and line framing
//! - Sentinel prefixes
//! - Call, return and callback bodies
//! - Registration bodies

pub mod calls;
pub mod envelopes;
pub mod registrations;
pub mod sentinels;

/// Common test helpers for contract validation
pub mod test_helpers {
    use bridge_engine::{Engine, EngineConfig, MemoryTransport, MemoryTransportHandle};
    use bridge_wire::{decode, Envelope};
    use serde::de::DeserializeOwned;

    /// Creates an engine that records everything it writes
    pub fn recording_engine() -> (Engine, MemoryTransportHandle) {
        let transport = MemoryTransport::new();
        let host = transport.handle();
        let config = EngineConfig::new().with_fork_first(false);
        (Engine::new(transport, config), host)
    }

    /// Parses one wire line, failing the test if it does not decode
    pub fn parse_line(line: &str) -> Envelope {
        decode(line).unwrap_or_else(|err| panic!("Line failed to decode: {} ({})", line, err))
    }

    /// Verifies an envelope has the expected type tag
    pub fn verify_envelope_contract(envelope: &Envelope, expected_tag: &str) {
        assert_eq!(
            envelope.name, expected_tag,
            "Type tag changed: expected '{}', got '{}'",
            expected_tag, envelope.name
        );
    }

    /// Verifies a body matches its canonical payload exactly
    ///
    /// The canonical payload types deny unknown fields, so both missing and
    /// added fields break the contract.
    pub fn verify_payload_contract<T: DeserializeOwned>(envelope: &Envelope) -> T {
        serde_json::from_value(envelope.message.clone()).unwrap_or_else(|err| {
            panic!(
                "Payload contract changed for '{}': {} (body: {})",
                envelope.name, err, envelope.message
            )
        })
    }
}
