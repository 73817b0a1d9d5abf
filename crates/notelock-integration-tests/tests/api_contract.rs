//! # API Contract
//!
//! Tests every endpoint's error surfaces — validation (422), bad request
//! (400), conflict (409), not found (404) — plus the preview endpoint,
//! health probes, and the OpenAPI document.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use notelock_api::lifecycle::OrderLifecycle;
use notelock_api::state::{AppConfig, AppState};
use notelock_api::store::OrderStore;
use notelock_client::mock::{MockNotarizationClient, MockPaymentGateway};
use notelock_crypto::IpnVerifier;

/// Build a test app with always-succeeding collaborators.
fn test_app() -> axum::Router {
    let lifecycle = OrderLifecycle::new(
        OrderStore::in_memory(),
        Arc::new(MockPaymentGateway::succeeding("P1")),
        Arc::new(MockNotarizationClient::succeeding("T1")),
        IpnVerifier::new(b"contract-secret".to_vec()),
    );
    notelock_api::app(AppState::new(AppConfig::default(), lifecycle))
}

/// POST helper with JSON body.
fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// GET helper.
fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Read response body as JSON Value.
async fn body_json(response: axum::http::Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// =========================================================================
// Order creation: validation errors (422)
// =========================================================================

#[tokio::test]
async fn create_missing_fields_is_bad_request() {
    let app = test_app();
    let resp = app
        .oneshot(post_json("/v1/orders", json!({"amount": 10})))
        .await
        .unwrap();
    // Missing required fields fail deserialization.
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_zero_amount_is_rejected() {
    let app = test_app();
    let resp = app
        .oneshot(post_json(
            "/v1/orders",
            json!({"amount": 0, "order_id": "N1", "encrypted_payload": "xx"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn create_negative_amount_is_rejected() {
    let app = test_app();
    let resp = app
        .oneshot(post_json(
            "/v1/orders",
            json!({"amount": -5.0, "order_id": "N1", "encrypted_payload": "xx"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_empty_order_id_is_rejected() {
    let app = test_app();
    let resp = app
        .oneshot(post_json(
            "/v1/orders",
            json!({"amount": 10, "order_id": "   ", "encrypted_payload": "xx"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_overlong_order_id_is_rejected() {
    let app = test_app();
    let long = "x".repeat(256);
    let resp = app
        .oneshot(post_json(
            "/v1/orders",
            json!({"amount": 10, "order_id": long, "encrypted_payload": "xx"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_empty_payload_is_rejected() {
    let app = test_app();
    let resp = app
        .oneshot(post_json(
            "/v1/orders",
            json!({"amount": 10, "order_id": "N1", "encrypted_payload": ""}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_malformed_json_is_bad_request() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/v1/orders")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

// =========================================================================
// Order creation: conflict (409)
// =========================================================================

#[tokio::test]
async fn duplicate_order_id_conflicts() {
    let app = test_app();
    let req = json!({"amount": 10, "order_id": "N1", "encrypted_payload": "xx"});
    let resp = app.clone().oneshot(post_json("/v1/orders", req.clone())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app.oneshot(post_json("/v1/orders", req)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "CONFLICT");
}

// =========================================================================
// Status queries: not found / not ready (404)
// =========================================================================

#[tokio::test]
async fn get_nonexistent_order_returns_404() {
    let app = test_app();
    let resp = app.oneshot(get("/v1/orders/ghost")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn receipt_of_nonexistent_order_is_not_found() {
    let app = test_app();
    let resp = app.oneshot(get("/v1/orders/ghost/receipt")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn receipt_of_unpaid_order_is_not_ready() {
    let app = test_app();
    let resp = app
        .clone()
        .oneshot(post_json(
            "/v1/orders",
            json!({"amount": 10, "order_id": "N1", "encrypted_payload": "xx"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app.oneshot(get("/v1/orders/N1/receipt")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "NOT_READY");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("AWAITING_PAYMENT"));
}

// =========================================================================
// Preview
// =========================================================================

#[tokio::test]
async fn preview_returns_hex_of_payload() {
    let app = test_app();
    let resp = app
        .oneshot(post_json(
            "/v1/orders/preview",
            json!({"encrypted_payload": "AB"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    // "AB" as UTF-8 bytes is 0x41 0x42.
    assert_eq!(body["preview"], "4142");
}

#[tokio::test]
async fn preview_rejects_empty_payload() {
    let app = test_app();
    let resp = app
        .oneshot(post_json("/v1/orders/preview", json!({"encrypted_payload": ""})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn preview_creates_nothing() {
    let app = test_app();
    app.clone()
        .oneshot(post_json(
            "/v1/orders/preview",
            json!({"encrypted_payload": "xx"}),
        ))
        .await
        .unwrap();
    // Nothing was persisted under any identifier.
    let resp = app.oneshot(get("/v1/orders/xx")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// =========================================================================
// Probes and spec
// =========================================================================

#[tokio::test]
async fn health_probes_answer() {
    let app = test_app();
    let resp = app.clone().oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app.oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = test_app();
    let resp = app.oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let spec = body_json(resp).await;
    assert_eq!(spec["info"]["title"], "Notelock API");
    assert!(spec["paths"].get("/v1/orders").is_some());
}
