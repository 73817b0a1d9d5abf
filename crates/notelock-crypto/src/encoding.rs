//! # Hex Encoding Helpers
//!
//! Lowercase hex rendering for payload data handed to the ledger, and
//! strict hex decoding for signature strings. Decoding failures carry the
//! offending position so operators can spot truncated headers in logs.

use thiserror::Error;

/// Error decoding a hex string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    /// The input length was odd.
    #[error("hex string has odd length: {0}")]
    OddLength(usize),

    /// A character outside `[0-9a-fA-F]` was found.
    #[error("invalid hex at position {0}")]
    InvalidDigit(usize),
}

/// Render bytes as a lowercase hex string.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a hex string into bytes. Accepts upper- and lowercase digits.
pub fn from_hex(s: &str) -> Result<Vec<u8>, HexError> {
    let s = s.trim();
    if s.len() % 2 != 0 {
        return Err(HexError::OddLength(s.len()));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| HexError::InvalidDigit(i)))
        .collect()
}
