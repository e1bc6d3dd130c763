//! # Bridge Wire Protocol
//!
//! This crate defines the records exchanged between a guest script process
//! and the host scripting engine.
//!
//! ## Philosophy
//!
//! - **One record shape**: Every line on the pipe is an [`Envelope`] `{name, message}`
//! - **Line delimited**: One envelope per line, flushed immediately
//! - **Non-fatal decoding**: A malformed line is a value, never a panic
//! - **Reserved prefixes**: Non-primitive values travel as sentinel-prefixed strings
//!
//! ## Architecture
//!
//! The envelope `name` is a message type tag ([`MessageType`]). Everything
//! else is carried inside `message`:
//! - `call` carries a [`CallRequest`]
//! - `return` carries a bare value, or a [`TaggedReturn`] when correlated
//! - `callback` carries a [`CallbackInvocation`]
//! - `command`, `alias`, `event` and `set` carry a [`Registration`]

pub mod call;
pub mod codec;
pub mod envelope;
pub mod sentinel;

pub use call::{CallId, CallRequest, CallbackInvocation, Registration, TaggedReturn};
pub use codec::{decode, encode, unquote_keys, CodecError, DecodeError};
pub use envelope::{Envelope, MessageType};
pub use sentinel::{
    decode_bytes, decode_handle, encode_bytes, encode_handle, is_sentinel, BYTES_PREFIX,
    CALLBACK_PREFIX,
};
