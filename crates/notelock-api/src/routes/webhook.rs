//! # Payment Notification Webhook
//!
//! Receives the payment processor's asynchronous IPN callbacks. The raw
//! body bytes are handed to the lifecycle untouched — canonicalization
//! and signature verification need the body exactly as it arrived.
//!
//! ## Response contract
//!
//! The processor only needs an acknowledgement: every handled case —
//! including duplicate deliveries, ignored non-final statuses, and
//! notarization failures — returns 200 so the processor stops
//! redelivering. Non-2xx is reserved for cases where redelivery or
//! operator attention is correct: 401 (signature mismatch), 400
//! (malformed body), 404 (unknown order).

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the processor's HMAC-SHA512 signature.
const SIGNATURE_HEADER: &str = "x-nowpayments-sig";

/// Build the webhook router.
pub fn router() -> Router<AppState> {
    Router::new().route("/webhooks/payment", post(handle_notification))
}

/// POST /webhooks/payment — consume a payment notification.
#[utoipa::path(
    post,
    path = "/webhooks/payment",
    responses(
        (status = 200, description = "Notification acknowledged (processed, duplicate, or ignored)"),
        (status = 400, description = "Malformed notification body", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or invalid signature", body = crate::error::ErrorBody),
        (status = 404, description = "Notification references an unknown order", body = crate::error::ErrorBody),
    ),
    tag = "webhooks"
)]
pub(crate) async fn handle_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    state
        .lifecycle
        .handle_notification(&body, signature)
        .await?;

    Ok("OK")
}
