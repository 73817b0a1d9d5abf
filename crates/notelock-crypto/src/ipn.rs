//! # IPN Signature Verification
//!
//! The payment processor authenticates its asynchronous notifications by
//! sending an HMAC-SHA512 of the canonicalized notification body, hex
//! encoded, in a request header. [`IpnVerifier`] recomputes that MAC with
//! the shared secret and compares in constant time.
//!
//! ## Behavior on malformed input
//!
//! `verify` never errors: a signature that is not valid hex, has the wrong
//! length, or simply does not match is uniformly "not valid" (`false`).
//! Distinguishing malformed from mismatched signatures would hand an
//! attacker an oracle and buys the operator nothing.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use notelock_core::CanonicalBytes;

use crate::encoding::{from_hex, to_hex};

type HmacSha512 = Hmac<Sha512>;

/// Verifies payment-processor notification signatures.
///
/// Holds the shared IPN secret. The secret is zeroized on drop and never
/// appears in `Debug` output.
#[derive(Clone)]
pub struct IpnVerifier {
    secret: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for IpnVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpnVerifier")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl IpnVerifier {
    /// Create a verifier from the shared IPN secret.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
        }
    }

    /// Compute the hex-encoded HMAC-SHA512 of the canonical body.
    ///
    /// This is what the processor sends in the signature header; it is
    /// exposed for tests and operational tooling that replays
    /// notifications.
    pub fn sign(&self, body: &CanonicalBytes) -> String {
        let mut mac = match HmacSha512::new_from_slice(&self.secret) {
            Ok(mac) => mac,
            // HMAC accepts keys of any length; unreachable in practice.
            Err(_) => return String::new(),
        };
        mac.update(body.as_bytes());
        to_hex(&mac.finalize().into_bytes())
    }

    /// Verify a provided hex signature against the canonical body.
    ///
    /// Constant-time comparison of the decoded MAC. On length mismatch a
    /// dummy comparison runs so timing does not reveal how close the
    /// length was. Malformed hex is `false`, never an error.
    pub fn verify(&self, body: &CanonicalBytes, provided: &str) -> bool {
        let provided = match from_hex(provided.trim()) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };

        let mut mac = match HmacSha512::new_from_slice(&self.secret) {
            Ok(mac) => mac,
            Err(_) => return false,
        };
        mac.update(body.as_bytes());
        let expected = mac.finalize().into_bytes();
        let expected: &[u8] = expected.as_slice();

        if provided.len() != expected.len() {
            let _ = expected.ct_eq(expected);
            return false;
        }
        provided.as_slice().ct_eq(expected).into()
    }
}
