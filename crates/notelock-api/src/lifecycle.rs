//! # OrderLifecycle — The Payment-Order Orchestrator
//!
//! Drives orders through the state machine: creates them against the
//! payment processor, consumes verified payment notifications, triggers
//! the single notarization attempt, and answers status queries.
//!
//! ## Notification handling, in order
//!
//! 1. **Authenticate.** The raw body is canonicalized and checked against
//!    the HMAC signature header. Fail-closed: a missing or invalid
//!    signature discards the notification without touching any order.
//! 2. **Filter.** Only a final-success `payment_status` advances anything;
//!    every other status is acknowledged and ignored.
//! 3. **Compare-and-set.** `AWAITING_PAYMENT → CONFIRMED` through the
//!    store's atomic primitive. Losing the CAS means this delivery is a
//!    duplicate (or a concurrent redelivery); it is acknowledged as a
//!    no-op. Winning it grants this task the sole right to notarize.
//! 4. **Notarize once.** The payload is recorded on the ledger; success
//!    settles the order as `RECORDED` with its transaction reference,
//!    failure settles it as `FAILED` with the reason. Either way the
//!    processor gets its acknowledgement — a notarization failure is an
//!    operator problem, not the processor's.

use std::sync::Arc;

use serde::Deserialize;

use notelock_client::{ChargeRequest, NotarizationClient, PaymentGateway};
use notelock_core::{CanonicalBytes, OrderId, PaymentId, TxReference};
use notelock_crypto::{to_hex, IpnVerifier};
use notelock_state::{Order, OrderState};

use crate::error::AppError;
use crate::store::{OrderStore, TransitionOutcome};

/// The processor's terminal success status. Anything else is ignored.
const FINAL_SUCCESS_STATUS: &str = "finished";

/// Result of creating an order: everything the caller needs to pay.
#[derive(Debug, Clone)]
pub struct CreatedCharge {
    /// The order identifier.
    pub order_id: OrderId,
    /// The processor's payment identifier.
    pub payment_id: PaymentId,
    /// Address the caller pays to.
    pub pay_address: String,
    /// QR rendering of the payment, when the processor provides one.
    pub qr_code: Option<String>,
}

/// How a notification was handled. Every variant is acknowledged with 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationAck {
    /// The order advanced and settled in the given terminal state.
    Settled(OrderState),
    /// The order was already past `AWAITING_PAYMENT`: duplicate or
    /// replayed delivery, acknowledged without side effects.
    Duplicate,
    /// The notification did not report final success and was ignored.
    Ignored,
}

/// The notification body fields this service acts on. The processor sends
/// more; unknown fields are ignored by design (the signature covers the
/// whole body regardless).
#[derive(Debug, Deserialize)]
struct IpnNotification {
    #[serde(default)]
    payment_status: String,
    #[serde(default)]
    order_id: Option<String>,
}

/// The payment-order lifecycle orchestrator.
#[derive(Clone)]
pub struct OrderLifecycle {
    store: OrderStore,
    gateway: Arc<dyn PaymentGateway>,
    notary: Arc<dyn NotarizationClient>,
    verifier: IpnVerifier,
}

impl std::fmt::Debug for OrderLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderLifecycle")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl OrderLifecycle {
    /// Assemble the orchestrator from its collaborators.
    pub fn new(
        store: OrderStore,
        gateway: Arc<dyn PaymentGateway>,
        notary: Arc<dyn NotarizationClient>,
        verifier: IpnVerifier,
    ) -> Self {
        Self {
            store,
            gateway,
            notary,
            verifier,
        }
    }

    /// Access the underlying store (startup hydration).
    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    /// Create an order: ask the processor for a payable charge, then
    /// persist the order as `AWAITING_PAYMENT`.
    ///
    /// Gateway failure persists nothing — there is no partial order.
    pub async fn create_order(
        &self,
        order_id: OrderId,
        amount: f64,
        encrypted_payload: Vec<u8>,
    ) -> Result<CreatedCharge, AppError> {
        // Cheap early rejection. The insert below is the authoritative
        // duplicate check; this avoids creating charges that could never
        // be attached to an order.
        if self.store.get(&order_id).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "order {order_id} already exists"
            )));
        }

        let charge = self
            .gateway
            .create_charge(&ChargeRequest {
                order_id: order_id.clone(),
                amount,
                description: format!("Notelock order {order_id}"),
            })
            .await
            .map_err(|e| {
                tracing::warn!(order_id = %order_id, error = %e, "charge creation failed");
                AppError::Gateway(e.to_string())
            })?;

        let order = Order::new(
            order_id.clone(),
            charge.payment_id.clone(),
            amount,
            encrypted_payload,
        );
        self.store.insert(order).await?;

        tracing::info!(
            order_id = %order_id,
            payment_id = %charge.payment_id,
            "order created, awaiting payment"
        );

        Ok(CreatedCharge {
            order_id,
            payment_id: charge.payment_id,
            pay_address: charge.pay_address,
            qr_code: charge.qr_code,
        })
    }

    /// Consume an asynchronous payment notification.
    ///
    /// See the module docs for the handling sequence. Returns how the
    /// notification was disposed of; the HTTP layer acknowledges every
    /// `Ok` with 200.
    pub async fn handle_notification(
        &self,
        raw_body: &[u8],
        signature: Option<&str>,
    ) -> Result<NotificationAck, AppError> {
        let Some(signature) = signature else {
            tracing::warn!("notification rejected: missing signature header");
            return Err(AppError::Unauthorized("missing signature header".into()));
        };

        let canonical = CanonicalBytes::from_slice(raw_body).map_err(|_| {
            AppError::BadRequest("notification body is not valid JSON".into())
        })?;

        if !self.verifier.verify(&canonical, signature) {
            tracing::warn!("notification rejected: invalid signature");
            return Err(AppError::Unauthorized("invalid signature".into()));
        }

        let notification: IpnNotification = serde_json::from_slice(raw_body)
            .map_err(|e| AppError::BadRequest(format!("malformed notification: {e}")))?;

        if notification.payment_status != FINAL_SUCCESS_STATUS {
            tracing::debug!(
                status = %notification.payment_status,
                "non-final notification acknowledged and ignored"
            );
            return Ok(NotificationAck::Ignored);
        }

        // Unknown or unparseable order identifiers can legitimately arrive
        // (forged or stale notifications); they must not advance anything.
        let order_id = notification
            .order_id
            .as_deref()
            .and_then(|raw| OrderId::new(raw).ok())
            .ok_or_else(|| {
                tracing::warn!("finished notification without a usable order_id");
                AppError::NotFound("notification references no known order".into())
            })?;

        let outcome = self
            .store
            .transition(&order_id, OrderState::AwaitingPayment, |o| o.confirm())
            .await?;

        let order = match outcome {
            TransitionOutcome::NotFound => {
                tracing::warn!(order_id = %order_id, "notification for unknown order");
                return Err(AppError::NotFound(format!("no order {order_id}")));
            }
            TransitionOutcome::StateMismatch(state) => {
                tracing::info!(
                    order_id = %order_id,
                    state = %state,
                    "duplicate notification acknowledged"
                );
                return Ok(NotificationAck::Duplicate);
            }
            TransitionOutcome::Applied(order) => order,
        };

        // This task won the CAS: it holds the sole notarization right.
        let settled = self.notarize(order).await?;
        Ok(NotificationAck::Settled(settled))
    }

    /// Run the single notarization attempt for a freshly confirmed order
    /// and settle it terminally.
    async fn notarize(&self, order: Order) -> Result<OrderState, AppError> {
        let data_hex = to_hex(&order.encrypted_payload);
        let order_id = order.id.clone();

        let outcome = match self.notary.record(&data_hex).await {
            Ok(tx) => {
                tracing::info!(order_id = %order_id, tx = %tx, "payload recorded on ledger");
                self.store
                    .transition(&order_id, OrderState::Confirmed, move |o| o.record(tx))
                    .await?
            }
            Err(e) => {
                tracing::error!(
                    order_id = %order_id,
                    error = %e,
                    "notarization failed — order settling as FAILED, operator attention required"
                );
                let reason = e.to_string();
                self.store
                    .transition(&order_id, OrderState::Confirmed, move |o| o.fail(reason))
                    .await?
            }
        };

        match outcome {
            TransitionOutcome::Applied(order) => Ok(order.state),
            // CONFIRMED is held exclusively by this task; anything else
            // here means the store was mutated out from under us.
            other => Err(AppError::Internal(format!(
                "confirmed order {order_id} could not settle: {other:?}"
            ))),
        }
    }

    /// Fetch the full order for a status query. Read-only.
    pub async fn order(&self, order_id: &OrderId) -> Result<Order, AppError> {
        self.store
            .get(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no order {order_id}")))
    }

    /// Return the transaction reference once the order is `RECORDED`,
    /// a not-ready signal otherwise. Never blocks waiting for progress.
    pub async fn receipt(&self, order_id: &OrderId) -> Result<TxReference, AppError> {
        let order = self.order(order_id).await?;
        match order.receipt() {
            Some(tx) => Ok(tx.clone()),
            None => Err(AppError::NotReady(format!(
                "order {order_id} is {}",
                order.state
            ))),
        }
    }
}
