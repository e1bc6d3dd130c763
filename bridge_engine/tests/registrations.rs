//! Registration Tests
//!
//! Validates what commands, aliases, events, menus and output modifiers
//! send to the host, how their wrappers behave when fired, and how the
//! fork gate closes them.

mod common;

use bridge_engine::{
    EngineConfig, EngineError, Function, MenuItem, Signature, Value, DEFAULT_ALIAS_HELP,
};
use bridge_wire::{decode_handle, MessageType};
use common::{callback, callback_with_id, calls, engine_with, errors, unforked_engine};
use fork_gate::{GateError, RegistrationKind};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn recorder(name: &str, signature: Signature) -> (Function, Rc<RefCell<Vec<Vec<Value>>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let function = Function::new(name, signature, move |_, args| {
        sink.borrow_mut().push(args);
        Ok(Value::Null)
    });
    (function, seen)
}

/// Test: A command registration names the wrapper's handle
#[test]
fn test_command_registration_envelope() {
    let (mut engine, host) = unforked_engine();
    let (hello, _) = recorder("hello", Signature::positional(["who"]));

    let handle = engine
        .register_command("hello", hello)
        .expect("Failed to register command");

    assert!(handle.starts_with("command_hello_"));
    let sent = host.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].is(MessageType::Command));
    assert_eq!(sent[0].message["name"], json!("hello"));

    let marshaled = sent[0].message["callback"].as_str().unwrap();
    assert_eq!(decode_handle(marshaled), Some(handle.as_str()));
}

/// Test: Firing a command checks arity and replaces quotes
///
/// This validates that:
/// 1. Too few arguments print a usage line and skip the function
/// 2. The configured quote replacement is applied to string arguments
#[test]
fn test_command_wrapper() {
    let (mut engine, host) = engine_with(
        EngineConfig::new()
            .with_fork_first(false)
            .with_quote_replacement("''"),
    );
    let (say, seen) = recorder("say", Signature::new().required("text").optional("color"));
    let handle = engine
        .register_command("say", say)
        .expect("Failed to register command");

    host.push_envelope(&callback(&handle, json!([])));
    host.push_envelope(&callback(&handle, json!(["''quoted''"])));
    engine.run().expect("Run failed");

    assert_eq!(errors(&host), vec!["Syntax: say text [color]".to_string()]);
    assert_eq!(*seen.borrow(), vec![vec![Value::from("\"quoted\"")]]);
}

/// Test: An alias sends its help text and handles the session id
///
/// This validates that:
/// 1. `alias` is followed by a fire-and-forget `beacon_command_register`
/// 2. The long help ends with the usage line, without the session id
/// 3. A numeric string session id is passed on as a number
#[test]
fn test_alias_registration() {
    let (mut engine, host) = unforked_engine();
    let (grab, seen) = recorder("grab", Signature::positional(["bid", "path"]));

    let handle = engine
        .register_alias("grab", grab, None, None)
        .expect("Failed to register alias");
    assert!(handle.starts_with("alias_grab_"));

    let sent = host.sent();
    assert!(sent[0].is(MessageType::Alias));
    assert_eq!(
        sent[1].message,
        json!({
            "name": "beacon_command_register",
            "args": [
                "grab",
                DEFAULT_ALIAS_HELP,
                format!("{}\n\nSyntax: grab path", DEFAULT_ALIAS_HELP),
            ],
            "silent": false,
            "fork": false,
            "sync": false,
        })
    );

    host.push_envelope(&callback(&handle, json!(["12", "C:\\temp"])));
    engine.run().expect("Run failed");
    assert_eq!(
        *seen.borrow(),
        vec![vec![Value::Int(12), Value::from("C:\\temp")]]
    );
}

/// Test: Alias usage errors reach both the session log and the console
#[test]
fn test_alias_usage_error() {
    let (mut engine, host) = unforked_engine();
    let (grab, seen) = recorder("grab", Signature::positional(["bid", "path"]));
    let handle = engine
        .register_alias("grab", grab, Some("Grab a file"), Some("Grabs one file."))
        .expect("Failed to register alias");

    host.take_sent();
    host.push_envelope(&callback(&handle, json!([3])));
    engine.run().expect("Run failed");

    assert!(seen.borrow().is_empty());
    let calls = calls(&host);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["name"], json!("berror"));
    assert_eq!(calls[0]["args"], json!([3, "Syntax: grab path"]));
    assert_eq!(
        errors(&host),
        vec!["Invalid number of arguments passed to alias 'grab'. Syntax: grab path".to_string()]
    );
}

/// Test: Alias handler failures are summarized in the session log
#[test]
fn test_alias_failure_is_summarized() {
    let (mut engine, host) = unforked_engine();
    let failing = Function::new("failing", Signature::positional(["bid"]), |_, _| {
        Err(EngineError::handler("no such file"))
    });
    let handle = engine
        .register_alias("failing", failing, None, None)
        .expect("Failed to register alias");

    host.take_sent();
    host.push_envelope(&callback(&handle, json!([5])));
    engine.run().expect("Run failed");

    let calls = calls(&host);
    assert_eq!(calls[0]["name"], json!("berror"));
    assert_eq!(calls[0]["args"][0], json!(5));
    assert!(calls[0]["args"][1]
        .as_str()
        .unwrap()
        .starts_with("Caught error while executing alias 'failing': no such file"));

    let errors = errors(&host);
    assert_eq!(errors[0], "exception: no such file\n");
}

/// Test: Events are checked against the official list
#[test]
fn test_event_registration() {
    let (mut engine, host) = unforked_engine();
    let (on_initial, seen) = recorder("on_initial", Signature::positional(["bid"]));

    let err = engine
        .register_event("made_up", on_initial.clone(), true)
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownEvent(ref name) if name == "made_up"));

    let handle = engine
        .register_event("beacon_initial", on_initial.clone(), true)
        .expect("Failed to register event");
    engine
        .register_event("made_up", on_initial, false)
        .expect("Unofficial event should be allowed");

    let events: Vec<_> = host
        .sent()
        .into_iter()
        .filter(|e| e.is(MessageType::Event))
        .map(|e| e.message["name"].clone())
        .collect();
    assert_eq!(events, vec![json!("beacon_initial"), json!("made_up")]);

    host.push_envelope(&callback_with_id(&handle, json!([1, 2]), json!("e1")));
    host.push_envelope(&callback(&handle, json!([7])));
    engine.run().expect("Run failed");

    // The event handler keeps the user's arity
    assert_eq!(*seen.borrow(), vec![vec![Value::Int(7)]]);
    assert!(errors(&host)[0].starts_with("2 is an invalid number of arguments"));
}

/// Test: Output modifiers are upper-cased and fail soft
#[test]
fn test_modifier_registration() {
    let (mut engine, host) = unforked_engine();
    let shout = Function::new("shout", Signature::any(), |_, args| {
        let text = args
            .get(1)
            .and_then(Value::as_str)
            .ok_or_else(|| EngineError::handler("missing output"))?;
        Ok(Value::from(text.to_uppercase()))
    });

    let err = engine
        .register_modifier("not_a_modifier", shout.clone(), true)
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownModifier(ref name) if name == "NOT_A_MODIFIER"));

    let handle = engine
        .register_modifier("beacon_output", shout, true)
        .expect("Failed to register modifier");
    let sent = host.sent();
    assert!(sent[0].is(MessageType::Set));
    assert_eq!(sent[0].message["name"], json!("BEACON_OUTPUT"));

    host.take_sent();
    host.push_envelope(&callback_with_id(&handle, json!([1, "done"]), json!(1)));
    host.push_envelope(&callback_with_id(&handle, json!([1]), json!(2)));
    engine.run().expect("Run failed");

    let returns: Vec<_> = host
        .sent()
        .into_iter()
        .filter(|e| e.is(MessageType::Return))
        .map(|e| e.message)
        .collect();
    assert_eq!(returns[0], json!({"value": "DONE", "id": 1}));
    assert_eq!(returns[1]["id"], json!(2));
    assert_eq!(
        returns[1]["value"],
        json!("[!] An error occurred in the BEACON_OUTPUT output modifier. See Script Console for more details.")
    );
    assert_eq!(errors(&host)[0], "exception: missing output\n");
}

/// Test: Menu trees are validated and sent with marshaled callbacks
#[test]
fn test_menu_registration() {
    let (mut engine, host) = unforked_engine();
    let (open, _) = recorder("open", Signature::any());

    let invalid = MenuItem::popup("beacon_top").with_child(MenuItem::item(""));
    assert!(matches!(
        engine.register_menu(&invalid),
        Err(EngineError::InvalidMenu(_))
    ));
    assert!(host.sent().is_empty());

    let tree = MenuItem::popup("beacon_top").with_children([
        MenuItem::item("Open").with_callback(open.clone()),
        MenuItem::separator(),
    ]);
    engine.register_menu(&tree).expect("Failed to register menu");

    let handle = engine.callbacks().handle_of(&open).unwrap().to_string();
    let sent = host.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].is(MessageType::Menu));
    assert_eq!(
        sent[0].message,
        json!({
            "type": "popup",
            "name": "beacon_top",
            "children": [
                {"type": "item", "name": "Open", "callback": format!("<<--bridge callback-->> {}", handle)},
                {"type": "separator"},
            ],
        })
    );
}

/// Test: Registering the same function twice yields one handle
///
/// This validates that:
/// 1. Both registrations return identical handle strings
/// 2. After `unregister`, firing the handle is tolerated
/// 3. A direct call reports `UnknownCallback`
#[test]
fn test_idempotent_registration_and_unregister() {
    let (mut engine, host) = unforked_engine();
    let (on_event, seen) = recorder("on_event", Signature::any());

    let first = engine.register_callback(&on_event, None);
    let second = engine.register_callback(&on_event, Some("ignored"));
    assert_eq!(first, second);

    assert_eq!(
        engine.unregister(&on_event).expect("Unregister failed"),
        Some(first.clone())
    );

    host.push_envelope(&callback(&first, json!([])));
    engine.run().expect("Run failed");
    assert!(seen.borrow().is_empty());
    assert!(errors(&host).is_empty());

    let err = engine.call_callback(&first, vec![]).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Callback(bridge_engine::CallbackError::UnknownCallback { .. })
    ));
}

/// Test: Registrations close at the fork, calls do not
///
/// This validates that:
/// 1. A command registers before the fork
/// 2. The identical registration after the fork fails with a gate error
/// 3. Every registration kind is closed
/// 4. A second fork fails
/// 5. Plain calls keep working
#[test]
fn test_fork_gate() {
    let (mut engine, host) = unforked_engine();
    let (hello, _) = recorder("hello", Signature::any());

    engine
        .register_command("hello", hello.clone())
        .expect("Registration before fork failed");
    engine.fork().expect("Fork failed");

    let gate_error = |kind| EngineError::Gate(GateError::PostForkRegistration { kind });
    let expect_closed = |result: Result<String, EngineError>, kind| {
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), gate_error(kind).to_string());
        assert!(err.is_fatal());
    };

    expect_closed(
        engine.register_command("hello", hello.clone()),
        RegistrationKind::Command,
    );
    expect_closed(
        engine.register_alias("hello", hello.clone(), None, None),
        RegistrationKind::Alias,
    );
    expect_closed(
        engine.register_event("ready", hello.clone(), true),
        RegistrationKind::Event,
    );
    expect_closed(
        engine.register_modifier("BEACON_OUTPUT", hello.clone(), true),
        RegistrationKind::Modifier,
    );
    assert!(matches!(
        engine.register_menu(&MenuItem::popup("top")),
        Err(EngineError::Gate(GateError::PostForkRegistration {
            kind: RegistrationKind::Menu
        }))
    ));
    assert!(matches!(
        engine.fork(),
        Err(EngineError::Gate(GateError::DoubleFork))
    ));

    engine
        .call_async("bps", vec![Value::from(1)])
        .expect("Call after fork failed");
    assert_eq!(calls(&host).len(), 1);
}
