//! Collaborator client errors.
//!
//! Every error is tagged with the endpoint it came from — when a charge
//! creation and a ledger recording both fail in one incident window, the
//! operator needs to know which integration to look at.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors from outbound collaborator calls.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure: connection refused, DNS, timeout.
    #[error("http error calling {endpoint}: {source}")]
    Http {
        /// The logical endpoint being called.
        endpoint: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The collaborator answered with a non-success status.
    #[error("api error from {endpoint}: status {status}: {body}")]
    Api {
        /// The logical endpoint being called.
        endpoint: String,
        /// HTTP status code returned.
        status: u16,
        /// Response body, verbatim, for operator diagnosis.
        body: String,
    },

    /// The collaborator answered 2xx but the body did not match the
    /// expected schema.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        /// The logical endpoint being called.
        endpoint: String,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },

    /// Client configuration was invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
