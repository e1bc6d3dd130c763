//! Sentinel contract tests
//!
//! These tests pin the two reserved string prefixes. The host matches them
//! byte for byte.

use bridge_wire::{BYTES_PREFIX, CALLBACK_PREFIX};

// ===== Reserved Prefixes =====
const EXPECTED_CALLBACK_PREFIX: &str = "<<--bridge callback-->> ";
const EXPECTED_BYTES_PREFIX: &str = "<<--bridge bytes-->> ";

// ===== Contract Tests =====
