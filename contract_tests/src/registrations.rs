//! Registration contract tests
//!
//! These tests define the bodies of `command`, `alias`, `event`, `set` and
//! `menu`.

use serde::{Deserialize, Serialize};

// ===== Canonical Payload Structures =====

/// Body of `command`, `alias`, `event` and `set`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RegistrationBody {
    pub name: String,
    pub callback: String,
}

// ===== Contract Tests =====
