//! Lowercase hex text form of physical keys.
//!
//! Used for the key ranges handed to the delete-range sink and for key
//! context in error messages.

const DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Encode raw key bytes as lowercase hex.
#[must_use]
pub fn encode_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .flat_map(|byte| [DIGITS[usize::from(byte >> 4)], DIGITS[usize::from(byte & 0x0F)]])
        .map(char::from)
        .collect()
}

///
/// TESTS
///
