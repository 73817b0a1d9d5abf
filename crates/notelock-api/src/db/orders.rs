//! Order persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `orders` table.
//! The state machine's transition matrix is enforced at the application
//! layer; what SQL enforces is atomicity — [`update_if_state`] is a
//! conditional UPDATE whose row count is the compare-and-set verdict.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use notelock_core::{OrderId, PaymentId, Timestamp, TxReference};
use notelock_state::{Order, OrderState, TransitionRecord};

/// Serialize an `OrderState` to the string stored in the `state` column.
///
/// Fails loudly rather than defaulting: persisting a wrong state string
/// would corrupt the state machine on the next load.
fn serialize_order_state(state: OrderState) -> Result<String, sqlx::Error> {
    let value = serde_json::to_value(state).map_err(|e| {
        tracing::error!(error = %e, state = ?state, "failed to serialize order state");
        sqlx::Error::Encode(Box::new(e))
    })?;
    value.as_str().map(String::from).ok_or_else(|| {
        tracing::error!(value = ?value, "order state did not serialize to a JSON string");
        sqlx::Error::Encode(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "order state did not serialize to a string",
        )))
    })
}

/// Parse the `state` column back into an `OrderState`.
///
/// Unknown state strings are a hard error, never a default: silently
/// mapping an unknown value to `AWAITING_PAYMENT` would re-arm the
/// notarization path for an order that may already be settled, breaking
/// the at-most-once guarantee.
fn parse_order_state(raw: &str) -> Result<OrderState, sqlx::Error> {
    serde_json::from_value(serde_json::Value::String(raw.to_string())).map_err(|e| {
        tracing::error!(state = %raw, error = %e, "unknown order state in database");
        sqlx::Error::Decode(Box::new(e))
    })
}

/// Serialize a transition log slice to JSON for persistence.
fn serialize_transition_log(log: &[TransitionRecord]) -> Result<serde_json::Value, sqlx::Error> {
    serde_json::to_value(log).map_err(|e| {
        tracing::error!(error = %e, "failed to serialize order transition_log");
        sqlx::Error::Encode(Box::new(e))
    })
}

/// Insert a new order record.
///
/// A duplicate `order_id` surfaces as a unique-violation database error;
/// the store layer maps it to a conflict.
pub async fn insert(pool: &PgPool, order: &Order) -> Result<(), sqlx::Error> {
    let state = serialize_order_state(order.state)?;
    let transition_log = serialize_transition_log(&order.transition_log)?;

    sqlx::query(
        "INSERT INTO orders (order_id, payment_id, amount, encrypted_payload, state,
                             tx_reference, failure_reason, transition_log, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(order.id.as_str())
    .bind(order.payment_id.as_str())
    .bind(order.amount)
    .bind(&order.encrypted_payload)
    .bind(&state)
    .bind(order.tx_reference.as_ref().map(TxReference::as_str))
    .bind(order.failure_reason.as_deref())
    .bind(&transition_log)
    .bind(order.created_at.as_datetime())
    .bind(order.updated_at.as_datetime())
    .execute(pool)
    .await?;

    Ok(())
}

/// Atomically persist a state transition: updates the mutable columns only
/// if the row is still in `expected` state.
///
/// Returns `true` if the row was updated (this caller won the
/// compare-and-set), `false` if the row was missing or already past
/// `expected` (a concurrent or duplicate delivery won instead).
pub async fn update_if_state(
    pool: &PgPool,
    id: &OrderId,
    expected: OrderState,
    updated: &Order,
) -> Result<bool, sqlx::Error> {
    let expected_state = serialize_order_state(expected)?;
    let new_state = serialize_order_state(updated.state)?;
    let transition_log = serialize_transition_log(&updated.transition_log)?;

    let result = sqlx::query(
        "UPDATE orders
         SET state = $1, tx_reference = $2, failure_reason = $3,
             transition_log = $4, updated_at = $5
         WHERE order_id = $6 AND state = $7",
    )
    .bind(&new_state)
    .bind(updated.tx_reference.as_ref().map(TxReference::as_str))
    .bind(updated.failure_reason.as_deref())
    .bind(&transition_log)
    .bind(updated.updated_at.as_datetime())
    .bind(id.as_str())
    .bind(&expected_state)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Fetch an order by ID.
pub async fn fetch(pool: &PgPool, id: &OrderId) -> Result<Option<Order>, sqlx::Error> {
    let row = sqlx::query_as::<_, OrderRow>(
        "SELECT order_id, payment_id, amount, encrypted_payload, state,
                tx_reference, failure_reason, transition_log, created_at, updated_at
         FROM orders WHERE order_id = $1",
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(OrderRow::into_order).transpose()
}

/// Load all orders from the database into the in-memory index on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Order>, sqlx::Error> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT order_id, payment_id, amount, encrypted_payload, state,
                tx_reference, failure_reason, transition_log, created_at, updated_at
         FROM orders ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(OrderRow::into_order).collect()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct OrderRow {
    order_id: String,
    payment_id: String,
    amount: f64,
    encrypted_payload: Vec<u8>,
    state: String,
    tx_reference: Option<String>,
    failure_reason: Option<String>,
    transition_log: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, sqlx::Error> {
        let state = parse_order_state(&self.state)?;

        let id = OrderId::new(&self.order_id).map_err(|e| {
            tracing::error!(order_id = %self.order_id, error = %e, "invalid order_id in database");
            sqlx::Error::Decode(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e.to_string(),
            )))
        })?;

        let transition_log: Vec<TransitionRecord> = serde_json::from_value(self.transition_log)
            .map_err(|e| {
                tracing::error!(order_id = %self.order_id, error = %e,
                    "failed to deserialize order transition_log");
                sqlx::Error::Decode(Box::new(e))
            })?;

        Ok(Order {
            id,
            payment_id: PaymentId(self.payment_id),
            amount: self.amount,
            encrypted_payload: self.encrypted_payload,
            state,
            tx_reference: self.tx_reference.map(TxReference),
            failure_reason: self.failure_reason,
            transition_log,
            created_at: Timestamp::from_datetime(self.created_at),
            updated_at: Timestamp::from_datetime(self.updated_at),
        })
    }
}
