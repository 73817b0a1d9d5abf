//! Typed client for the NOWPayments-shaped payment processor.
//!
//! Creates a payable charge for an order. The processor later delivers an
//! asynchronous IPN callback (HMAC-SHA512 signed, handled by the API
//! layer) reporting payment progress.
//!
//! ## Wire format
//!
//! | Method | Path          | Operation     |
//! |--------|---------------|---------------|
//! | POST   | `/v1/payment` | Create charge |
//!
//! Authentication is an `x-api-key` header. Amounts are denominated in
//! USDT (BEP-20) on both the price and pay side.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use notelock_core::PaymentId;

use crate::error::ClientError;
use crate::{Charge, ChargeRequest, PaymentGateway};

/// Currency code used on both the price and pay side of a charge.
const CHARGE_CURRENCY: &str = "usdtbep20";

// ─── Request/Response types matching the processor schema ───────────

/// Request body for `POST /v1/payment`.
#[derive(Debug, Serialize)]
struct CreatePaymentRequest<'a> {
    price_amount: f64,
    price_currency: &'static str,
    pay_currency: &'static str,
    order_id: &'a str,
    order_description: &'a str,
    ipn_callback_url: &'a str,
    payout_address: &'a str,
}

/// Response body for `POST /v1/payment`.
///
/// Fields use `#[serde(default)]` for resilience against schema evolution
/// in the live processor API; `deny_unknown_fields` is intentionally NOT
/// used. `payment_id` arrives as a string or a bare number depending on
/// processor version, so it is decoded tolerantly.
#[derive(Debug, Deserialize)]
struct CreatePaymentResponse {
    #[serde(deserialize_with = "string_or_number")]
    payment_id: String,
    #[serde(default)]
    payment_address: String,
    #[serde(default)]
    qr_code: Option<String>,
}

/// Accept a JSON string or number and normalize to `String`.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

// ─── Client ─────────────────────────────────────────────────────────

/// Client for the payment processor API.
#[derive(Clone)]
pub struct NowPaymentsClient {
    http: reqwest::Client,
    base_url: url::Url,
    api_key: String,
    ipn_callback_url: String,
    payout_wallet: String,
}

impl std::fmt::Debug for NowPaymentsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NowPaymentsClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("ipn_callback_url", &self.ipn_callback_url)
            .field("payout_wallet", &self.payout_wallet)
            .finish()
    }
}

impl NowPaymentsClient {
    pub(crate) fn new(
        http: reqwest::Client,
        base_url: url::Url,
        api_key: String,
        ipn_callback_url: String,
        payout_wallet: String,
    ) -> Self {
        Self {
            http,
            base_url,
            api_key,
            ipn_callback_url,
            payout_wallet,
        }
    }
}

#[async_trait]
impl PaymentGateway for NowPaymentsClient {
    /// Create a charge via `POST {base_url}/v1/payment`.
    async fn create_charge(&self, req: &ChargeRequest) -> Result<Charge, ClientError> {
        let endpoint = "POST /v1/payment";
        let url = format!("{}v1/payment", self.base_url);

        let body = CreatePaymentRequest {
            price_amount: req.amount,
            price_currency: CHARGE_CURRENCY,
            pay_currency: CHARGE_CURRENCY,
            order_id: req.order_id.as_str(),
            order_description: &req.description,
            ipn_callback_url: &self.ipn_callback_url,
            payout_address: &self.payout_wallet,
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

        let parsed: CreatePaymentResponse =
            resp.json().await.map_err(|e| ClientError::Deserialization {
                endpoint: endpoint.into(),
                source: e,
            })?;

        tracing::debug!(
            order_id = %req.order_id,
            payment_id = %parsed.payment_id,
            "charge created"
        );

        Ok(Charge {
            pay_address: parsed.payment_address,
            qr_code: parsed.qr_code,
            payment_id: PaymentId(parsed.payment_id),
        })
    }
}
