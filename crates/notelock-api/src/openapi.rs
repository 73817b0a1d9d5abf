//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notelock API",
        version = "0.1.0",
        description = "Payment-gated blob notarization: create a payment order for an encrypted payload, and retrieve the ledger transaction reference once the confirmed payment has been recorded.",
        license(name = "MIT")
    ),
    paths(
        crate::routes::orders::create_order,
        crate::routes::orders::get_order,
        crate::routes::orders::get_receipt,
        crate::routes::orders::preview_payload,
        crate::routes::webhook::handle_notification,
    ),
    components(schemas(
        crate::routes::orders::CreateOrderRequest,
        crate::routes::orders::CreateOrderResponse,
        crate::routes::orders::OrderStatusResponse,
        crate::routes::orders::ReceiptResponse,
        crate::routes::orders::PreviewRequest,
        crate::routes::orders::PreviewResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "orders", description = "Order lifecycle and status queries"),
        (name = "webhooks", description = "Payment processor callbacks"),
    )
)]
struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve_spec))
}

/// GET /openapi.json — the generated specification.
async fn serve_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_contains_all_paths() {
        let spec = ApiDoc::openapi();
        let paths: Vec<&String> = spec.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/v1/orders"));
        assert!(paths.iter().any(|p| p.as_str() == "/v1/orders/{id}"));
        assert!(paths.iter().any(|p| p.as_str() == "/v1/orders/{id}/receipt"));
        assert!(paths.iter().any(|p| p.as_str() == "/v1/orders/preview"));
        assert!(paths.iter().any(|p| p.as_str() == "/webhooks/payment"));
    }
}
