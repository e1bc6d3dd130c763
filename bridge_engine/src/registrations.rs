//! Commands, aliases, events, menus and output modifiers
//!
//! Every registration checks the fork gate first, registers a wrapping
//! callback and then tells the host which handle to fire. Each returns the
//! handle name, which [`Engine::unregister_handle`] accepts.

use crate::catalog;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::function::{Function, Signature};
use crate::menu::MenuItem;
use crate::serializer;
use crate::value::Value;
use bridge_log::LogEntry;
use bridge_wire::{encode_handle, Envelope, MessageType, Registration};
use fork_gate::RegistrationKind;

/// Short help used when an alias has none
pub const DEFAULT_ALIAS_HELP: &str = "Custom command";

impl Engine {
    /// Registers a script console command
    ///
    /// Arguments that do not fit the function's signature print a usage
    /// line instead of running it.
    pub fn register_command(
        &mut self,
        name: &str,
        function: Function,
    ) -> Result<String, EngineError> {
        self.gate().check(RegistrationKind::Command)?;

        let command = name.to_string();
        let quote = self.config().quote_replacement.clone();
        let wrapper = Function::new(format!("command_{}", name), Signature::any(), move |engine, args| {
            if !function.signature().accepts(args.len()) {
                engine.error(format!(
                    "Syntax: {}",
                    usage(&command, function.signature())
                ))?;
                return Ok(Value::Null);
            }

            let args = replace_quotes(args, quote.as_deref());
            engine.log(LogEntry::debug("calling command").with_field("name", &command))?;
            function.invoke(engine, args)
        });

        self.register_wrapper(MessageType::Command, name, &wrapper)
    }

    /// Registers a session console alias
    ///
    /// The first argument the host passes is the session id. Usage errors
    /// and handler failures are summarized in the session's own log via
    /// `berror` as well as on the script console. Help text is sent with a
    /// `beacon_command_register` call; the usage line is always appended
    /// to the long help.
    pub fn register_alias(
        &mut self,
        name: &str,
        function: Function,
        short_help: Option<&str>,
        long_help: Option<&str>,
    ) -> Result<String, EngineError> {
        self.gate().check(RegistrationKind::Alias)?;

        let syntax = usage(name, &function.signature().skip(1));
        let short_help = short_help.unwrap_or(DEFAULT_ALIAS_HELP).to_string();
        let long_help = format!(
            "{}\n\nSyntax: {}",
            long_help.unwrap_or(short_help.as_str()),
            syntax
        );

        let alias = name.to_string();
        let quote = self.config().quote_replacement.clone();
        let wrapper = Function::new(format!("alias_{}", name), Signature::any(), move |engine, args| {
            let Some(first) = args.first() else {
                engine.error(format!("alias '{}' was fired without a session id", alias))?;
                return Ok(Value::Null);
            };
            let bid = session_id(first);

            if !function.signature().accepts(args.len()) {
                engine.call_async("berror", vec![bid, Value::from(format!("Syntax: {}", syntax))])?;
                engine.error(format!(
                    "Invalid number of arguments passed to alias '{}'. Syntax: {}",
                    alias, syntax
                ))?;
                return Ok(Value::Null);
            }

            let mut args = replace_quotes(args, quote.as_deref());
            args[0] = bid.clone();

            match function.invoke(engine, args) {
                Err(err) if err.is_recoverable() => {
                    engine.call_async(
                        "berror",
                        vec![
                            bid,
                            Value::from(format!(
                                "Caught error while executing alias '{}': {}\n    See Script Console for more details.",
                                alias, err
                            )),
                        ],
                    )?;
                    Err(err)
                }
                other => other,
            }
        });

        let handle = self.register_wrapper(MessageType::Alias, name, &wrapper)?;
        self.call_async(
            "beacon_command_register",
            vec![
                Value::from(name),
                Value::from(short_help),
                Value::from(long_help),
            ],
        )?;
        Ok(handle)
    }

    /// Registers an event handler
    ///
    /// With `official_only` the event must be one the host fires itself.
    pub fn register_event(
        &mut self,
        name: &str,
        function: Function,
        official_only: bool,
    ) -> Result<String, EngineError> {
        self.gate().check(RegistrationKind::Event)?;
        if official_only && !catalog::is_official_event(name) {
            return Err(EngineError::UnknownEvent(name.to_string()));
        }

        let event = name.to_string();
        let signature = function.signature().clone();
        let wrapper = Function::new(format!("event_{}", name), signature, move |engine, args| {
            engine.log(LogEntry::debug("calling event handler").with_field("name", &event))?;
            function.invoke(engine, args)
        });

        self.register_wrapper(MessageType::Event, name, &wrapper)
    }

    /// Registers an output modifier
    ///
    /// Names are case-insensitive and sent upper-case. A failing modifier
    /// is reported and its output replaced with a notice.
    pub fn register_modifier(
        &mut self,
        name: &str,
        function: Function,
        known_only: bool,
    ) -> Result<String, EngineError> {
        self.gate().check(RegistrationKind::Modifier)?;
        let name = name.to_ascii_uppercase();
        if known_only && !catalog::is_known_modifier(&name) {
            return Err(EngineError::UnknownModifier(name));
        }

        let modifier = name.clone();
        let wrapper = Function::new(format!("modifier_{}", name), Signature::any(), move |engine, args| {
            match function.invoke(engine, args) {
                Err(err) if err.is_recoverable() => {
                    engine.report_exception(&err)?;
                    Ok(Value::from(format!(
                        "[!] An error occurred in the {} output modifier. See Script Console for more details.",
                        modifier
                    )))
                }
                other => other,
            }
        });

        self.register_wrapper(MessageType::Set, &name, &wrapper)
    }

    /// Registers a menu tree
    pub fn register_menu(&mut self, menu: &MenuItem) -> Result<(), EngineError> {
        self.gate().check(RegistrationKind::Menu)?;
        menu.validate().map_err(EngineError::InvalidMenu)?;

        let tree = serializer::serialize(&menu.to_value(), self.callbacks_mut());
        self.send(&Envelope::new(MessageType::Menu, tree))
    }

    /// Registers a bare callback and returns its handle
    pub fn register_callback(&mut self, function: &Function, prefix: Option<&str>) -> String {
        self.callbacks_mut().register(function, prefix)
    }

    /// Forgets a callback
    ///
    /// The host may still fire it; that is logged as an unknown callback.
    pub fn unregister(&mut self, function: &Function) -> Result<Option<String>, EngineError> {
        let handle = self.callbacks_mut().unregister(function);
        if let Some(handle) = &handle {
            self.log(LogEntry::debug("unregistered callback").with_field("handle", handle))?;
        }
        Ok(handle)
    }

    /// Forgets a callback by handle name
    pub fn unregister_handle(&mut self, handle: &str) -> Result<bool, EngineError> {
        let removed = self.callbacks_mut().unregister_handle(handle).is_some();
        if removed {
            self.log(LogEntry::debug("unregistered callback").with_field("handle", handle))?;
        }
        Ok(removed)
    }

    fn register_wrapper(
        &mut self,
        kind: MessageType,
        name: &str,
        wrapper: &Function,
    ) -> Result<String, EngineError> {
        let handle = self.callbacks_mut().register(wrapper, None);
        self.send(&Registration::new(name, encode_handle(&handle)).into_envelope(kind)?)?;
        Ok(handle)
    }
}

/// `name a b [c]`, or just `name`
fn usage(name: &str, signature: &Signature) -> String {
    let params = signature.render_usage();
    if params.is_empty() {
        name.to_string()
    } else {
        format!("{} {}", name, params)
    }
}

fn replace_quotes(args: Vec<Value>, replacement: Option<&str>) -> Vec<Value> {
    match replacement {
        Some(replacement) if !replacement.is_empty() => args
            .into_iter()
            .map(|arg| match arg {
                Value::Str(s) => Value::Str(s.replace(replacement, "\"")),
                other => other,
            })
            .collect(),
        _ => args,
    }
}

/// Session ids arrive as numbers or numeric strings
fn session_id(raw: &Value) -> Value {
    match raw {
        Value::Str(s) => s.trim().parse::<i64>().map_or_else(|_| raw.clone(), Value::Int),
        other => other.clone(),
    }
}
