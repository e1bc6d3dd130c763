//! Envelope contract tests
//!
//! These tests define the stable record shape and the set of type tags.

use crate::test_helpers::*;
use bridge_wire::{encode, Envelope, MessageType};
use serde_json::json;

// ===== Type Tags =====
const TAGS: [&str; 15] = [
    "call", "return", "eval", "callback", "debug", "error", "message", "command", "alias",
    "event", "menu", "fork", "set", "stop", "delete",
];

// ===== Contract Tests =====
