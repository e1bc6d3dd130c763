//! Call contract tests
//!
//! These tests define the stable bodies of `call`, `return` and `callback`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ===== Canonical Payload Structures =====

/// Body of a `call` the guest sends
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CallBody {
    pub name: String,
    pub args: Vec<Value>,
    pub silent: bool,
    pub fork: bool,
    pub sync: bool,
    #[serde(default)]
    pub id: Option<String>,
}

/// Body of a `return` the guest sends for a host callback with an `id`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CallbackReturnBody {
    pub value: Value,
    pub id: Value,
}

// ===== Contract Tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use bridge_engine::{CallOptions, Function, Signature, Value as GuestValue};
    use bridge_wire::{Envelope, MessageType};
    use serde_json::json;

    #[test]
    fn test_async_call_contract() {
        let (mut engine, host) = recording_engine();
        engine
            .call_with(
                "bshell",
                vec![GuestValue::from(1), GuestValue::from("whoami")],
                CallOptions::new().with_sync(false).with_silent(true),
            )
            .unwrap();

        let envelope = parse_line(&host.sent_lines()[0]);
        verify_envelope_contract(&envelope, "call");
        let body: CallBody = verify_payload_contract(&envelope);
        assert_eq!(
            body,
            CallBody {
                name: "bshell".to_string(),
                args: vec![json!(1), json!("whoami")],
                silent: true,
                fork: false,
                sync: false,
                id: None,
            }
        );
    }

    #[test]
    fn test_sync_call_contract() {
        let (mut engine, host) = recording_engine();
        host.push_envelope(&Envelope::new(MessageType::Return, json!(null)));
        engine.call("bps", vec![GuestValue::from(2)]).unwrap();

        let envelope = parse_line(&host.sent_lines()[0]);
        let body: CallBody = verify_payload_contract(&envelope);
        assert!(body.sync);
        let id = body.id.expect("Synchronous calls carry an id");
        assert_eq!(id.len(), 36, "Call ids are hyphenated UUIDs");
    }

    #[test]
    fn test_callback_return_contract() {
        let (mut engine, host) = recording_engine();
        let answer = Function::new("answer", Signature::any(), |_, _| Ok(GuestValue::from(42)));
        let handle = engine.register_callback(&answer, None);

        host.push_envelope(&Envelope::new(
            MessageType::Callback,
            json!({"name": handle, "args": [], "id": "host-7"}),
        ));
        engine.run().unwrap();

        let envelope = parse_line(&host.sent_lines()[0]);
        verify_envelope_contract(&envelope, "return");
        let body: CallbackReturnBody = verify_payload_contract(&envelope);
        assert_eq!(
            body,
            CallbackReturnBody {
                value: json!(42),
                id: json!("host-7"),
            }
        );
    }
}
