//! # notelock-core — Foundational Types for Notelock
//!
//! This crate is the bedrock of the Notelock service. It defines the
//! type-system primitives every other crate builds on. It depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain identifiers.** `OrderId`, `PaymentId`,
//!    `TxReference` — you cannot pass a processor payment identifier where
//!    an order identifier is expected. No bare strings at component seams.
//!
//! 2. **`CanonicalBytes` newtype.** ALL signature verification input flows
//!    through `CanonicalBytes::from_value()`. The payment processor signs a
//!    deterministic, lexicographically key-sorted serialization of the
//!    notification body; any other serialization path would make every
//!    legitimate verification fail.
//!
//! 3. **UTC-only timestamps.** The `Timestamp` type enforces UTC with a
//!    `Z` suffix and second precision in serialized form.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `notelock-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{OrderId, PaymentId, TxReference};
pub use temporal::Timestamp;
