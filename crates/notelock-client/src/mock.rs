//! Scriptable in-process collaborators for tests.
//!
//! Both mocks count their calls with atomics so tests can assert the
//! at-most-once notarization property by counting `record` invocations
//! across duplicate notification deliveries.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use notelock_core::{PaymentId, TxReference};

use crate::error::ClientError;
use crate::{Charge, ChargeRequest, NotarizationClient, PaymentGateway};

/// Scripted outcome for a mock collaborator call.
#[derive(Debug, Clone)]
enum Outcome {
    Succeed,
    FailApi { status: u16, body: String },
}

// ─── Payment gateway mock ───────────────────────────────────────────

/// In-process [`PaymentGateway`] with a fixed scripted outcome.
#[derive(Debug, Clone)]
pub struct MockPaymentGateway {
    outcome: Outcome,
    payment_id: String,
    calls: Arc<AtomicUsize>,
}

impl MockPaymentGateway {
    /// A gateway that accepts every charge, minting the given payment id.
    pub fn succeeding(payment_id: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Succeed,
            payment_id: payment_id.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A gateway that rejects every charge with the given status and body.
    pub fn failing(status: u16, body: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::FailApi {
                status,
                body: body.into(),
            },
            payment_id: String::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `create_charge` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_charge(&self, req: &ChargeRequest) -> Result<Charge, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Succeed => Ok(Charge {
                pay_address: format!("0xpay-{}", req.order_id),
                qr_code: Some(format!("qr-{}", req.order_id)),
                payment_id: PaymentId(self.payment_id.clone()),
            }),
            Outcome::FailApi { status, body } => Err(ClientError::Api {
                endpoint: "POST /v1/payment".into(),
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

// ─── Notarization mock ──────────────────────────────────────────────

/// In-process [`NotarizationClient`] with a fixed scripted outcome.
#[derive(Debug, Clone)]
pub struct MockNotarizationClient {
    outcome: Outcome,
    tx_reference: String,
    calls: Arc<AtomicUsize>,
}

impl MockNotarizationClient {
    /// A ledger that records everything, returning the given reference.
    pub fn succeeding(tx_reference: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Succeed,
            tx_reference: tx_reference.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A ledger that fails every recording with the given status and body.
    pub fn failing(status: u16, body: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::FailApi {
                status,
                body: body.into(),
            },
            tx_reference: String::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `record` calls so far. The at-most-once property is
    /// asserted against this counter.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotarizationClient for MockNotarizationClient {
    async fn record(&self, _data_hex: &str) -> Result<TxReference, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Succeed => Ok(TxReference(self.tx_reference.clone())),
            Outcome::FailApi { status, body } => Err(ClientError::Api {
                endpoint: "POST /v3/record".into(),
                status: *status,
                body: body.clone(),
            }),
        }
    }
}
