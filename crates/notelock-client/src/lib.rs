//! # notelock-client — Outbound Collaborator Clients
//!
//! Typed HTTP clients for the two external collaborators:
//!
//! - **Payment processor** (NOWPayments-shaped): creates a payable charge
//!   for an order and later delivers asynchronous IPN callbacks to the
//!   service's webhook endpoint.
//! - **Ledger notarization service** (Tatum-shaped): durably records
//!   arbitrary hex data on chain and returns a transaction identifier.
//!
//! ## Architecture
//!
//! The rest of the workspace depends only on the [`PaymentGateway`] and
//! [`NotarizationClient`] traits, never on a concrete vendor or transport.
//! Both collaborators cross a trust boundary: responses are assumed to
//! fail, time out, or be malformed, which is why every response is
//! deserialized defensively and every error carries the endpoint it came
//! from.
//!
//! [`mock`] provides scriptable in-process collaborators with call
//! counters; the at-most-once notarization property is asserted by
//! counting `record` calls.

pub mod config;
pub mod error;
pub mod mock;
pub mod nowpayments;
pub mod tatum;

pub use config::RailsConfig;
pub use error::ClientError;
pub use nowpayments::NowPaymentsClient;
pub use tatum::TatumClient;

use std::time::Duration;

use async_trait::async_trait;

use notelock_core::{OrderId, PaymentId, TxReference};

// ─── Collaborator ports ─────────────────────────────────────────────

/// Request to create a payable charge for an order.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    /// The order the charge pays for.
    pub order_id: OrderId,
    /// Requested charge amount.
    pub amount: f64,
    /// Human-readable description shown by the processor.
    pub description: String,
}

/// A created charge: everything the caller needs to pay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    /// Address the caller pays to.
    pub pay_address: String,
    /// QR rendering of the payment, when the processor provides one.
    pub qr_code: Option<String>,
    /// The processor's opaque identifier for this payment.
    pub payment_id: PaymentId,
}

/// Port for the payment processor collaborator.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payable charge. A failure here must leave no trace: the
    /// caller persists nothing unless this returns `Ok`.
    async fn create_charge(&self, req: &ChargeRequest) -> Result<Charge, ClientError>;
}

/// Port for the ledger notarization collaborator.
#[async_trait]
pub trait NotarizationClient: Send + Sync {
    /// Durably record the given hex-encoded data, returning the ledger's
    /// transaction reference.
    async fn record(&self, data_hex: &str) -> Result<TxReference, ClientError>;
}

// ─── Aggregate client ───────────────────────────────────────────────

/// Top-level collaborator client set, built from one shared HTTP client
/// with a common timeout.
#[derive(Debug, Clone)]
pub struct RailsClient {
    payments: NowPaymentsClient,
    ledger: TatumClient,
}

impl RailsClient {
    /// Create the collaborator clients from configuration.
    pub fn new(config: &RailsConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            payments: NowPaymentsClient::new(
                http.clone(),
                config.nowpayments_url.clone(),
                config.nowpayments_api_key.clone(),
                config.ipn_callback_url(),
                config.payout_wallet.clone(),
            ),
            ledger: TatumClient::new(
                http,
                config.tatum_url.clone(),
                config.tatum_api_key.clone(),
                config.ledger_signing_key.clone(),
            ),
        })
    }

    /// Access the payment-processor client.
    pub fn payments(&self) -> &NowPaymentsClient {
        &self.payments
    }

    /// Access the ledger notarization client.
    pub fn ledger(&self) -> &TatumClient {
        &self.ledger
    }
}
