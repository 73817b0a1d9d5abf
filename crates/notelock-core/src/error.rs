//! # Error Types — Structured Error Hierarchy
//!
//! Core-level error types. All errors use `thiserror` for derive-based
//! `Display` and `Error` implementations. Higher layers convert these at
//! their own boundaries (the API layer maps them onto HTTP responses).

use thiserror::Error;

/// Validation failure for caller-supplied input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The order identifier was empty or whitespace-only.
    #[error("order_id must not be empty")]
    EmptyOrderId,

    /// The order identifier exceeded the maximum accepted length.
    #[error("order_id must not exceed {max} characters, got {actual}")]
    OrderIdTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Length of the rejected value.
        actual: usize,
    },

    /// The order identifier contained control characters.
    #[error("order_id must not contain control characters")]
    OrderIdControlChars,

    /// The requested amount was zero, negative, or not a finite number.
    #[error("amount must be a positive finite number, got {0}")]
    InvalidAmount(f64),

    /// The encrypted payload was empty.
    #[error("encrypted_payload must not be empty")]
    EmptyPayload,
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// The input was not valid JSON, or the value could not be serialized.
    #[error("canonical serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
