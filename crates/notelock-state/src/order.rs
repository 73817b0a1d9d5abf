//! # Order Entity & State Machine
//!
//! The central entity of the service and its runtime-checked lifecycle.
//! Storage backends persist [`Order`] as-is; the compare-and-set primitive
//! in the store layer uses [`OrderState`] equality as its guard, and
//! [`Order::try_transition`] is the only mutation path for `state`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use notelock_core::{OrderId, PaymentId, Timestamp, TxReference};

// ─── States ─────────────────────────────────────────────────────────

/// Lifecycle state of a payment order.
///
/// Serialized as SCREAMING_SNAKE_CASE strings so database rows and API
/// responses can only carry spec-aligned state names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    /// Charge created at the processor; waiting for the confirmation
    /// notification.
    AwaitingPayment,
    /// A verified notification reported final payment success; the order
    /// holds this state only while its single notarization attempt runs.
    Confirmed,
    /// Notarization succeeded; the transaction reference is set (terminal).
    Recorded,
    /// Notarization failed after payment was taken (terminal). Carries a
    /// failure reason for operator intervention.
    Failed,
}

impl OrderState {
    /// Returns the canonical state name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AwaitingPayment => "AWAITING_PAYMENT",
            Self::Confirmed => "CONFIRMED",
            Self::Recorded => "RECORDED",
            Self::Failed => "FAILED",
        }
    }

    /// Whether this state is terminal (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Recorded | Self::Failed)
    }

    /// Whether the transition `from → to` is allowed by the state machine.
    ///
    /// Allowed edges:
    /// - `AWAITING_PAYMENT → CONFIRMED`
    /// - `CONFIRMED → RECORDED`
    /// - `CONFIRMED → FAILED`
    pub fn can_transition(from: OrderState, to: OrderState) -> bool {
        matches!(
            (from, to),
            (OrderState::AwaitingPayment, OrderState::Confirmed)
                | (OrderState::Confirmed, OrderState::Recorded)
                | (OrderState::Confirmed, OrderState::Failed)
        )
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Transition Record ──────────────────────────────────────────────

/// Record of a single state transition in the order lifecycle.
///
/// Every transition is logged with its UTC timestamp, creating an
/// immutable audit trail of how the order reached its current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// State before the transition.
    pub from_state: String,
    /// State after the transition.
    pub to_state: String,
    /// When the transition occurred (UTC).
    pub timestamp: Timestamp,
    /// Human-readable reason for the transition.
    pub reason: Option<String>,
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Errors that can occur during order state operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Attempted transition is not allowed by the state machine.
    #[error("invalid order transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: OrderState,
        /// Attempted target state.
        to: OrderState,
    },
}

// ─── The Order ──────────────────────────────────────────────────────

/// A payment order: the mapping from an order identifier to everything the
/// service knows about one paid notarization request.
///
/// The encrypted payload is opaque — stored verbatim at creation, handed
/// verbatim (hex-encoded) to the ledger on confirmation, never inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier. Immutable once created.
    pub id: OrderId,
    /// Processor payment identifier, set once at charge creation.
    pub payment_id: PaymentId,
    /// The charged amount, as requested by the caller.
    pub amount: f64,
    /// The opaque encrypted payload, stored verbatim.
    pub encrypted_payload: Vec<u8>,
    /// Current lifecycle state.
    pub state: OrderState,
    /// Ledger transaction reference; present only once `RECORDED`.
    pub tx_reference: Option<TxReference>,
    /// Failure reason; present only when `FAILED`.
    pub failure_reason: Option<String>,
    /// Immutable log of all state transitions.
    pub transition_log: Vec<TransitionRecord>,
    /// When the order was created.
    pub created_at: Timestamp,
    /// When the order was last mutated.
    pub updated_at: Timestamp,
}

impl Order {
    /// Create a new order in `AWAITING_PAYMENT`.
    ///
    /// Creation is not itself a transition — the log starts empty and the
    /// first entry will be the payment confirmation.
    pub fn new(
        id: OrderId,
        payment_id: PaymentId,
        amount: f64,
        encrypted_payload: Vec<u8>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            payment_id,
            amount,
            encrypted_payload,
            state: OrderState::AwaitingPayment,
            tx_reference: None,
            failure_reason: None,
            transition_log: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Attempt a state transition with runtime validation.
    ///
    /// Records the transition in the log and bumps `updated_at` on
    /// success. Returns an error (and leaves the order untouched) if the
    /// edge is not in the transition matrix.
    pub fn try_transition(
        &mut self,
        to: OrderState,
        reason: Option<String>,
    ) -> Result<(), OrderError> {
        if !OrderState::can_transition(self.state, to) {
            return Err(OrderError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        let now = Timestamp::now();
        self.transition_log.push(TransitionRecord {
            from_state: self.state.name().to_string(),
            to_state: to.name().to_string(),
            timestamp: now.clone(),
            reason,
        });
        self.state = to;
        self.updated_at = now;
        Ok(())
    }

    /// Transition `AWAITING_PAYMENT → CONFIRMED` on a verified final
    /// payment notification.
    pub fn confirm(&mut self) -> Result<(), OrderError> {
        self.try_transition(OrderState::Confirmed, Some("payment confirmed".into()))
    }

    /// Transition `CONFIRMED → RECORDED`, setting the transaction
    /// reference in the same step.
    ///
    /// Because `RECORDED` is reachable only from `CONFIRMED`, the
    /// reference can never be overwritten once set.
    pub fn record(&mut self, tx: TxReference) -> Result<(), OrderError> {
        self.try_transition(OrderState::Recorded, Some("notarization succeeded".into()))?;
        self.tx_reference = Some(tx);
        Ok(())
    }

    /// Transition `CONFIRMED → FAILED`, capturing the failure reason.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), OrderError> {
        let reason = reason.into();
        self.try_transition(OrderState::Failed, Some(reason.clone()))?;
        self.failure_reason = Some(reason);
        Ok(())
    }

    /// The transaction reference, if and only if the order is `RECORDED`.
    pub fn receipt(&self) -> Option<&TxReference> {
        match self.state {
            OrderState::Recorded => self.tx_reference.as_ref(),
            _ => None,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
