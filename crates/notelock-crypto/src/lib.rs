//! # notelock-crypto — Signature Verification Primitives
//!
//! Authenticates inbound payment-processor notifications: the processor
//! computes HMAC-SHA512 over a canonical serialization of the notification
//! body with a shared secret, and this crate recomputes and compares it in
//! constant time.
//!
//! ## Security Invariant
//!
//! [`IpnVerifier::verify`] accepts only
//! [`CanonicalBytes`](notelock_core::CanonicalBytes), never raw bytes.
//! The canonicalization pipeline is the single point that reproduces the
//! processor's signing convention; accepting raw bytes here would let a
//! call site silently verify against a different serialization.

pub mod encoding;
pub mod ipn;

pub use encoding::{from_hex, to_hex};
pub use ipn::IpnVerifier;
