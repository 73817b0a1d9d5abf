//! # Order Operations API
//!
//! Handles order creation (charge issuance at the payment processor),
//! status queries, receipt retrieval, and the payload preview.
//!
//! ## Endpoints
//!
//! - `POST /v1/orders` — create an order and its payable charge
//! - `GET /v1/orders/:id` — full order status
//! - `GET /v1/orders/:id/receipt` — ledger transaction reference
//! - `POST /v1/orders/preview` — hex preview of a payload

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use notelock_core::OrderId;
use notelock_crypto::to_hex;
use notelock_state::OrderState;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to create a new order.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// Amount to charge, in the service's settlement currency.
    pub amount: f64,
    /// Caller-chosen order identifier.
    pub order_id: String,
    /// The opaque encrypted payload to notarize once paid.
    pub encrypted_payload: String,
}

impl Validate for CreateOrderRequest {
    fn validate(&self) -> Result<(), String> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(format!(
                "amount must be a positive finite number, got {}",
                self.amount
            ));
        }
        if self.order_id.trim().is_empty() {
            return Err("order_id must not be empty".to_string());
        }
        if self.encrypted_payload.is_empty() {
            return Err("encrypted_payload must not be empty".to_string());
        }
        Ok(())
    }
}

/// Response to a successful order creation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderResponse {
    /// The order identifier.
    pub order_id: String,
    /// The processor's payment identifier.
    pub payment_id: String,
    /// Address the caller pays to.
    pub pay_address: String,
    /// QR rendering of the payment, when the processor provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
}

/// Full order status.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderStatusResponse {
    pub order_id: String,
    /// Lifecycle state (AWAITING_PAYMENT, CONFIRMED, RECORDED, FAILED).
    #[schema(value_type = String)]
    pub state: OrderState,
    pub payment_id: String,
    /// Ledger transaction reference, present once RECORDED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_reference: Option<String>,
    /// Failure reason, present when FAILED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Creation time (UTC).
    #[schema(value_type = String)]
    pub created_at: String,
    /// Last mutation time (UTC).
    #[schema(value_type = String)]
    pub updated_at: String,
}

/// Receipt: the ledger transaction reference for a recorded order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReceiptResponse {
    pub tx_reference: String,
}

/// Request to preview how a payload will be submitted to the ledger.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PreviewRequest {
    /// The opaque encrypted payload.
    pub encrypted_payload: String,
}

impl Validate for PreviewRequest {
    fn validate(&self) -> Result<(), String> {
        if self.encrypted_payload.is_empty() {
            return Err("encrypted_payload must not be empty".to_string());
        }
        Ok(())
    }
}

/// Hex rendering of the payload exactly as it would reach the ledger.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PreviewResponse {
    pub preview: String,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/orders", post(create_order))
        .route("/v1/orders/preview", post(preview_payload))
        .route("/v1/orders/:id", get(get_order))
        .route("/v1/orders/:id/receipt", get(get_receipt))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/orders — Create an order and its payable charge.
#[utoipa::path(
    post,
    path = "/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created, awaiting payment", body = CreateOrderResponse),
        (status = 409, description = "Order identifier already exists", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
        (status = 502, description = "Payment processor rejected the charge", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub(crate) async fn create_order(
    State(state): State<AppState>,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(axum::http::StatusCode, Json<CreateOrderResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let order_id = OrderId::new(req.order_id)?;

    let charge = state
        .lifecycle
        .create_order(order_id, req.amount, req.encrypted_payload.into_bytes())
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(CreateOrderResponse {
            order_id: charge.order_id.to_string(),
            payment_id: charge.payment_id.to_string(),
            pay_address: charge.pay_address,
            qr_code: charge.qr_code,
        }),
    ))
}

/// GET /v1/orders/:id — Full order status.
///
/// This is the one place notarization failures become caller-visible:
/// a FAILED order carries its failure reason here.
#[utoipa::path(
    get,
    path = "/v1/orders/{id}",
    params(("id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order status", body = OrderStatusResponse),
        (status = 404, description = "Order not found", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub(crate) async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderStatusResponse>, AppError> {
    let order_id =
        OrderId::new(id).map_err(|e| AppError::NotFound(format!("no order: {e}")))?;
    let order = state.lifecycle.order(&order_id).await?;

    Ok(Json(OrderStatusResponse {
        order_id: order.id.to_string(),
        state: order.state,
        payment_id: order.payment_id.to_string(),
        tx_reference: order.tx_reference.map(|tx| tx.to_string()),
        failure_reason: order.failure_reason,
        created_at: order.created_at.to_canonical_string(),
        updated_at: order.updated_at.to_canonical_string(),
    }))
}

/// GET /v1/orders/:id/receipt — Ledger transaction reference.
///
/// 404 NOT_READY while the order exists but is not yet RECORDED; plain
/// 404 NOT_FOUND when it does not exist.
#[utoipa::path(
    get,
    path = "/v1/orders/{id}/receipt",
    params(("id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Transaction reference", body = ReceiptResponse),
        (status = 404, description = "Order unknown or not yet recorded", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub(crate) async fn get_receipt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReceiptResponse>, AppError> {
    let order_id =
        OrderId::new(id).map_err(|e| AppError::NotFound(format!("no order: {e}")))?;
    let tx = state.lifecycle.receipt(&order_id).await?;
    Ok(Json(ReceiptResponse {
        tx_reference: tx.to_string(),
    }))
}

/// POST /v1/orders/preview — Hex preview of a payload.
///
/// Pure function of its input: renders the payload exactly as it would be
/// submitted to the ledger, without creating anything.
#[utoipa::path(
    post,
    path = "/v1/orders/preview",
    request_body = PreviewRequest,
    responses(
        (status = 200, description = "Hex rendering of the payload", body = PreviewResponse),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub(crate) async fn preview_payload(
    body: Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<Json<PreviewResponse>, AppError> {
    let req = extract_validated_json(body)?;
    Ok(Json(PreviewResponse {
        preview: to_hex(req.encrypted_payload.as_bytes()),
    }))
}
