//! # Canonical Serialization — Deterministic Byte Production
//!
//! This module defines `CanonicalBytes`, the sole construction path for
//! the bytes that inbound notification signatures are verified against.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only ways to
//! construct it are `CanonicalBytes::from_value()` and
//! `CanonicalBytes::from_slice()`, both of which serialize through
//! `serde_json::Value`. `serde_json`'s default object map is a BTreeMap, so
//! every object — at every nesting level — serializes with its keys in
//! lexicographic order, with compact separators. That is the payment
//! processor's documented signing convention; a verifier that serialized
//! any other way would reject every legitimate notification.
//!
//! Functions that verify signatures accept `&CanonicalBytes`, never raw
//! `&[u8]`, so a non-canonical byte path is a compile error rather than a
//! silent total verification failure.
//!
//! ## What is deliberately NOT normalized
//!
//! Numbers pass through as `serde_json` renders them. The processor puts
//! JSON numbers (amounts, timestamps) in notification bodies, so rejecting
//! or coercing them would diverge from what the processor signed. If the
//! processor's convention ever changes to signing raw body bytes,
//! `from_slice` call sites are the only thing that moves.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by canonical (key-sorted, compact) JSON
/// serialization.
///
/// # Invariants
///
/// - Constructed only via [`CanonicalBytes::from_value`] or
///   [`CanonicalBytes::from_slice`].
/// - Object keys are lexicographically sorted at every nesting level.
/// - Compact separators, no insignificant whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// The value is first lowered into a `serde_json::Value` (whose object
    /// representation sorts keys) and then serialized compactly.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value
    /// cannot be represented as JSON.
    pub fn from_value(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value: Value = serde_json::to_value(obj)?;
        let bytes = serde_json::to_vec(&value)?;
        Ok(Self(bytes))
    }

    /// Construct canonical bytes from a raw JSON document.
    ///
    /// This is the inbound-webhook path: the raw request body is parsed and
    /// re-serialized canonically, reproducing what the processor signed.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the input is
    /// not valid JSON.
    pub fn from_slice(raw: &[u8]) -> Result<Self, CanonicalizationError> {
        let value: Value = serde_json::from_slice(raw)?;
        let bytes = serde_json::to_vec(&value)?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
