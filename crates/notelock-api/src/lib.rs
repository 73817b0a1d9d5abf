//! # notelock-api — Axum API Service for Notelock
//!
//! Notelock is a payment-gated blob-notarization service: a caller pays to
//! have an opaque encrypted payload durably recorded on an external
//! ledger. This crate assembles the service: the order store with its
//! atomic compare-and-set, the lifecycle orchestrator, the HTTP surface,
//! and the server binary.
//!
//! ## API Surface
//!
//! | Method | Path                      | Purpose                         |
//! |--------|---------------------------|---------------------------------|
//! | POST   | `/v1/orders`              | Create order + payable charge   |
//! | POST   | `/v1/orders/preview`      | Hex preview of a payload        |
//! | GET    | `/v1/orders/:id`          | Full order status               |
//! | GET    | `/v1/orders/:id/receipt`  | Ledger transaction reference    |
//! | POST   | `/webhooks/payment`       | Processor IPN callback          |
//! | GET    | `/health/liveness`        | Process liveness probe          |
//! | GET    | `/health/readiness`       | Readiness probe                 |
//! | GET    | `/openapi.json`           | Generated OpenAPI document      |
//!
//! ## Middleware
//!
//! `TraceLayer` for request tracing and a permissive `CorsLayer` — the
//! order endpoints are called directly from browser clients.

pub mod db;
pub mod error;
pub mod extractors;
pub mod lifecycle;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod store;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes are mounted outside the traced API router so probe
/// traffic does not drown the request logs.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .merge(routes::orders::router())
        .merge(routes::webhook::router())
        .merge(openapi::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
