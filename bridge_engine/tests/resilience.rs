//! Resilience Tests
//!
//! Validates that a misbehaving guest handler is reported without taking
//! the read loop down, and that only fatal errors escape `run()`.

mod common;

use bridge_engine::{EngineError, Function, Signature, Value};
use bridge_wire::{Envelope, MessageType};
use common::{callback, callback_with_id, errors, ret, unforked_engine};
use fork_gate::GateError;
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;

/// Test: A panicking callback is reported and the loop continues
///
/// This validates that:
/// 1. The panic message reaches the host as an `exception` line
/// 2. The captured location is sent as a `traceback` line
/// 3. A host waiting on the callback's `id` still gets a `null` return
/// 4. The next message is handled normally
#[test]
fn test_panicking_callback_is_reported() {
    let (mut engine, host) = unforked_engine();
    let explode = Function::new("explode", Signature::any(), |_, _| -> Result<Value, EngineError> {
        panic!("handler exploded")
    });
    let handle = engine.register_callback(&explode, None);

    host.push_envelope(&callback_with_id(&handle, json!([]), json!(41)));
    host.push_envelope(&Envelope::new(MessageType::Debug, json!(true)));
    engine.run().expect("Run failed");

    let errors = errors(&host);
    assert_eq!(errors[0], "exception: handler panicked: handler exploded\n");
    assert!(errors[1].starts_with("traceback: panicked: handler exploded"));
    assert!(errors[1].contains("resilience.rs"));

    let returns: Vec<_> = host
        .sent()
        .into_iter()
        .filter(|e| e.is(MessageType::Return))
        .collect();
    assert_eq!(
        returns,
        vec![Envelope::new(MessageType::Return, json!({"value": null, "id": 41}))]
    );
    assert!(engine.is_debug());
}

/// Test: A callback panicking while a call waits leaves the frame stack intact
///
/// The next callback must still see exactly the outer call pending, and the
/// outer call must still complete.
#[test]
fn test_panic_restores_frame_depth() {
    let (mut engine, host) = unforked_engine();

    let explode = Function::new("explode", Signature::any(), |_, _| -> Result<Value, EngineError> {
        panic!("deep failure")
    });
    let explode_handle = engine.register_callback(&explode, None);

    let depth_seen = Rc::new(Cell::new(0));
    let probe_depth = Rc::clone(&depth_seen);
    let probe = Function::new("probe", Signature::any(), move |engine, _| {
        probe_depth.set(engine.pending_calls().len());
        Ok(Value::Null)
    });
    let probe_handle = engine.register_callback(&probe, None);

    // outer -> explode panics inside its own guard
    host.push_envelope(&callback(&explode_handle, json!([])));
    host.push_envelope(&callback(&probe_handle, json!([])));
    host.push_envelope(&ret(json!("ok")));

    let value = engine.call("outer", vec![]).expect("Outer call failed");
    assert_eq!(value, Value::from("ok"));
    assert_eq!(depth_seen.get(), 1);
    assert!(engine.pending_calls().is_empty());
}

/// Test: A panic below an open call leaves that call waiting
#[test]
fn test_panic_below_open_call() {
    let (mut engine, host) = unforked_engine();

    let explode = Function::new("explode", Signature::any(), |_, _| -> Result<Value, EngineError> {
        panic!("inner panic")
    });
    let explode_handle = engine.register_callback(&explode, None);

    let opener = Function::new("opener", Signature::any(), move |engine, _| {
        engine.call("inner", vec![])?;
        Ok(Value::Null)
    });
    let opener_handle = engine.register_callback(&opener, None);

    // The panic is caught by the callback guard, reported, and the `inner`
    // call keeps waiting for its own return.
    host.push_envelope(&callback(&opener_handle, json!([])));
    host.push_envelope(&callback(&explode_handle, json!([])));
    host.push_envelope(&ret(json!("inner done")));
    engine.run().expect("Run failed");

    let errors = errors(&host);
    assert_eq!(errors[0], "exception: handler panicked: inner panic\n");
    assert!(engine.pending_calls().is_empty());
}

/// Test: Handler errors are reported with their cause chain
#[test]
fn test_handler_error_is_reported() {
    let (mut engine, host) = unforked_engine();
    let failing = Function::new("failing", Signature::any(), |_, _| {
        Err(EngineError::handler("could not parse listing"))
    });
    let handle = engine.register_callback(&failing, None);

    host.push_envelope(&callback(&handle, json!([])));
    host.push_envelope(&callback(&handle, json!([])));
    engine.run().expect("Run failed");

    assert_eq!(
        errors(&host),
        vec![
            "exception: could not parse listing\n".to_string(),
            "traceback: could not parse listing".to_string(),
            "exception: could not parse listing\n".to_string(),
            "traceback: could not parse listing".to_string(),
        ]
    );
}

/// Test: A gate violation inside a handler ends `run()` with an error
#[test]
fn test_gate_violation_is_fatal() {
    let (mut engine, host) = unforked_engine();
    let late = Function::new("late", Signature::any(), |engine, _| {
        let noop = Function::new("noop", Signature::any(), |_, _| Ok(Value::Null));
        engine.register_command("too_late", noop)?;
        Ok(Value::Null)
    });
    let handle = engine.register_callback(&late, None);
    engine.fork().expect("Fork failed");

    host.push_envelope(&callback(&handle, json!([])));
    host.push_envelope(&Envelope::new(MessageType::Debug, json!(true)));

    let err = engine.run().unwrap_err();
    assert!(matches!(
        err,
        EngineError::Gate(GateError::PostForkRegistration { .. })
    ));
    assert_eq!(host.pending_inbound(), 1);
    assert!(errors(&host).is_empty());
}

/// Test: `stop` while a call waits unwinds the call and ends the loop
#[test]
fn test_stop_unwinds_pending_calls() {
    let (mut engine, host) = unforked_engine();
    let reached = Rc::new(Cell::new(false));
    let flag = Rc::clone(&reached);
    let waits = Function::new("waits", Signature::any(), move |engine, _| {
        engine.call("never_answered", vec![])?;
        flag.set(true);
        Ok(Value::Null)
    });
    let handle = engine.register_callback(&waits, None);

    host.push_envelope(&callback(&handle, json!([])));
    host.push_envelope(&Envelope::signal(MessageType::Stop));
    host.push_envelope(&Envelope::new(MessageType::Debug, json!(true)));
    engine.run().expect("Run failed");

    assert!(!reached.get());
    assert!(engine.pending_calls().is_empty());
    assert_eq!(host.pending_inbound(), 1);
    assert!(errors(&host).is_empty());
}

/// Test: A local `stop()` ends the loop after the current message
#[test]
fn test_local_stop() {
    let (mut engine, host) = unforked_engine();
    let stopper = Function::new("stopper", Signature::any(), |engine, _| {
        engine.stop();
        Ok(Value::Null)
    });
    let handle = engine.register_callback(&stopper, None);

    host.push_envelope(&callback(&handle, json!([])));
    host.push_envelope(&Envelope::new(MessageType::Debug, json!(true)));
    engine.run().expect("Run failed");

    assert!(!engine.is_debug());
    assert_eq!(host.pending_inbound(), 1);
}

/// Test: A return with nothing waiting is reported, not fatal
#[test]
fn test_out_of_order_return() {
    let (mut engine, host) = unforked_engine();
    host.push_envelope(&ret(json!("late")));
    host.push_envelope(&Envelope::new(MessageType::Debug, json!(true)));
    engine.run().expect("Run failed");

    let errors = errors(&host);
    assert_eq!(
        errors[0],
        "exception: received unhandled or out-of-order message type: return \"late\"\n"
    );
    assert!(engine.is_debug());
}
