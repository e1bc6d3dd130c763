//! # Bridge Engine
//!
//! Guest side of a script bridge: the value model, callback marshaling,
//! the call/return dispatcher and the inbound message router.
//!
//! ## Philosophy
//!
//! - **One owner**: All session state lives in an [`Engine`] passed by `&mut`
//! - **Re-entrant by construction**: A waiting call keeps serving the host
//! - **Identity, not equality**: Functions are marshaled by identity token
//! - **Survive the script**: A failing handler is reported, not fatal
//!
//! ## Example
//!
//! ```
//! use bridge_engine::{Engine, EngineConfig, Function, MemoryTransport, Signature, Value};
//! use bridge_wire::{Envelope, MessageType};
//! use serde_json::json;
//!
//! let transport = MemoryTransport::new();
//! let host = transport.handle();
//! let mut engine = Engine::new(transport, EngineConfig::default());
//!
//! let hello = Function::new("hello", Signature::positional(["who"]), |engine, args| {
//!     let who = args[0].as_str().unwrap_or("nobody").to_string();
//!     engine.message(format!("hello {}", who))?;
//!     Ok(Value::Null)
//! });
//! let handle = engine.register_command("hello", hello).unwrap();
//!
//! host.push_envelope(&Envelope::new(
//!     MessageType::Callback,
//!     json!({"name": handle, "args": ["world"]}),
//! ));
//! engine.run().unwrap();
//!
//! let sent = host.sent();
//! assert_eq!(sent[0].name, "command");
//! assert_eq!(sent[1], Envelope::signal(MessageType::Fork));
//! assert_eq!(sent[2], Envelope::new(MessageType::Message, json!("hello world")));
//! ```

pub mod callbacks;
pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod function;
pub mod menu;
mod panic_capture;
pub mod registrations;
mod router;
pub mod serializer;
pub mod transport;
pub mod value;

pub use callbacks::{CallbackError, CallbackRegistry};
pub use config::{EngineConfig, ReturnCorrelation, DEFAULT_MAX_CALL_DEPTH};
pub use dispatcher::{CallOptions, PendingCall};
pub use engine::{Engine, EvalHook};
pub use error::EngineError;
pub use function::{Function, FunctionId, HandlerResult, Param, ParamKind, Signature};
pub use menu::{MenuItem, MenuKind};
pub use registrations::DEFAULT_ALIAS_HELP;
pub use transport::{
    LineTransport, MemoryTransport, MemoryTransportHandle, Transport, TransportError,
};
pub use value::Value;
