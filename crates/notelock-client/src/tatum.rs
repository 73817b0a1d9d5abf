//! Typed client for the Tatum-shaped ledger notarization service.
//!
//! Records arbitrary hex data durably on chain and returns a transaction
//! identifier. The signing credential is an opaque pass-through — this
//! service never derives or inspects it.
//!
//! ## Wire format
//!
//! | Method | Path         | Operation              |
//! |--------|--------------|------------------------|
//! | POST   | `/v3/record` | Record data on chain   |
//!
//! Authentication is an `x-api-key` header.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use notelock_core::TxReference;

use crate::error::ClientError;
use crate::NotarizationClient;

/// Chain the data is recorded on.
const RECORD_CHAIN: &str = "BSC";

/// Recording target. The record carries its payload in transaction data;
/// the destination is the zero address.
const RECORD_TO: &str = "0x0000000000000000000000000000000000000000";

// ─── Request/Response types matching the ledger schema ──────────────

/// Request body for `POST /v3/record`.
#[derive(Debug, Serialize)]
struct RecordRequest<'a> {
    chain: &'static str,
    data: &'a str,
    #[serde(rename = "fromPrivateKey")]
    from_private_key: &'a str,
    to: &'static str,
}

/// Response body for `POST /v3/record`.
#[derive(Debug, Deserialize)]
struct RecordResponse {
    #[serde(rename = "txId")]
    tx_id: String,
}

// ─── Client ─────────────────────────────────────────────────────────

/// Client for the ledger notarization API.
#[derive(Clone)]
pub struct TatumClient {
    http: reqwest::Client,
    base_url: url::Url,
    api_key: String,
    signing_key: String,
}

impl std::fmt::Debug for TatumClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TatumClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}

impl TatumClient {
    pub(crate) fn new(
        http: reqwest::Client,
        base_url: url::Url,
        api_key: String,
        signing_key: String,
    ) -> Self {
        Self {
            http,
            base_url,
            api_key,
            signing_key,
        }
    }
}

#[async_trait]
impl NotarizationClient for TatumClient {
    /// Record data via `POST {base_url}/v3/record`.
    async fn record(&self, data_hex: &str) -> Result<TxReference, ClientError> {
        let endpoint = "POST /v3/record";
        let url = format!("{}v3/record", self.base_url);

        let body = RecordRequest {
            chain: RECORD_CHAIN,
            data: data_hex,
            from_private_key: &self.signing_key,
            to: RECORD_TO,
        };

        let resp = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        let parsed: RecordResponse =
            resp.json().await.map_err(|e| ClientError::Deserialization {
                endpoint: endpoint.into(),
                source: e,
            })?;

        tracing::debug!(tx_id = %parsed.tx_id, "data recorded on ledger");

        Ok(TxReference(parsed.tx_id))
    }
}
