//! Sentinel prefixes for non-primitive values
//!
//! Two prefixes are reserved inside string values. Both end with a single
//! space that separates the prefix from the payload:
//!
//! - [`CALLBACK_PREFIX`] marks a callback handle name
//! - [`BYTES_PREFIX`] marks a base64 (standard alphabet, padded) byte payload

use base64::Engine as _;

/// Marks a marshaled function handle
pub const CALLBACK_PREFIX: &str = "<<--bridge callback-->> ";

/// Marks a base64-encoded byte payload
pub const BYTES_PREFIX: &str = "<<--bridge bytes-->> ";

/// Marshals a callback handle name
pub fn encode_handle(handle: &str) -> String {
    format!("{}{}", CALLBACK_PREFIX, handle)
}

/// Returns the handle name if the string is a marshaled handle
pub fn decode_handle(text: &str) -> Option<&str> {
    text.strip_prefix(CALLBACK_PREFIX)
}

/// Marshals a byte payload
pub fn encode_bytes(bytes: &[u8]) -> String {
    format!(
        "{}{}",
        BYTES_PREFIX,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Decodes a marshaled byte payload
///
/// Returns `None` when the string does not carry the bytes prefix.
pub fn decode_bytes(text: &str) -> Option<Result<Vec<u8>, base64::DecodeError>> {
    text.strip_prefix(BYTES_PREFIX)
        .map(|encoded| base64::engine::general_purpose::STANDARD.decode(encoded))
}

/// Checks whether a string carries either reserved prefix
pub fn is_sentinel(text: &str) -> bool {
    text.starts_with(CALLBACK_PREFIX) || text.starts_with(BYTES_PREFIX)
}
