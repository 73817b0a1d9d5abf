//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers that cross Notelock's component
//! seams. These prevent accidental identifier confusion — you cannot pass
//! a `PaymentId` where an `OrderId` is expected.
//!
//! `OrderId` is the only identifier with a validated constructor: callers
//! supply it, so it is an injection surface (it ends up in charge
//! descriptions, database keys, and log lines). `PaymentId` and
//! `TxReference` are opaque values minted by external collaborators and
//! are stored verbatim.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Maximum accepted length for a caller-supplied order identifier.
const MAX_ORDER_ID_LEN: usize = 128;

/// Unique identifier for a payment order.
///
/// Caller-supplied (validated) or system-generated (UUID v4). Immutable
/// once the order is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Create a validated order identifier from caller input.
    ///
    /// Rejects empty/whitespace-only values, values longer than 128
    /// characters, and values containing control characters.
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyOrderId);
        }
        if trimmed.len() > MAX_ORDER_ID_LEN {
            return Err(ValidationError::OrderIdTooLong {
                max: MAX_ORDER_ID_LEN,
                actual: trimmed.len(),
            });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ValidationError::OrderIdControlChars);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Generate a fresh random order identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque payment identifier minted by the payment processor when a charge
/// is created. Set once per order, never overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(pub String);

impl PaymentId {
    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque transaction reference returned by the ledger notarization
/// service. Present on an order only once recording has succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxReference(pub String);

impl TxReference {
    /// Return the reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TxReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_accepts_plain_identifier() {
        let id = OrderId::new("note-2026-0001").unwrap();
        assert_eq!(id.as_str(), "note-2026-0001");
    }

    #[test]
    fn order_id_trims_surrounding_whitespace() {
        let id = OrderId::new("  N1  ").unwrap();
        assert_eq!(id.as_str(), "N1");
    }

    #[test]
    fn order_id_rejects_empty() {
        assert!(OrderId::new("").is_err());
        assert!(OrderId::new("   ").is_err());
    }

    #[test]
    fn order_id_rejects_overlong() {
        let long = "x".repeat(129);
        assert!(OrderId::new(long).is_err());
        let ok = "x".repeat(128);
        assert!(OrderId::new(ok).is_ok());
    }

    #[test]
    fn order_id_rejects_control_characters() {
        assert!(OrderId::new("abc\ndef").is_err());
        assert!(OrderId::new("abc\x00def").is_err());
    }

    #[test]
    fn generated_order_ids_are_unique() {
        assert_ne!(OrderId::generate(), OrderId::generate());
    }

    #[test]
    fn order_id_serializes_transparently() {
        let id = OrderId::new("N1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"N1\"");
        let back: OrderId = serde_json::from_str("\"N1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn payment_id_and_tx_reference_display_verbatim() {
        assert_eq!(PaymentId("P1".into()).to_string(), "P1");
        assert_eq!(TxReference("0xabc".into()).to_string(), "0xabc");
    }
}
