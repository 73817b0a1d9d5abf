//! # End-to-End Payment Flow
//!
//! Drives the assembled application through the full order lifecycle over
//! HTTP: create → signed notification → recorded → receipt, plus the
//! duplicate-delivery, invalid-signature, unknown-order, and
//! notarization-failure scenarios. Collaborators are in-process mocks so
//! notarization attempts can be counted.

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
use notelock_core::CanonicalBytes;
use notelock_crypto::IpnVerifier;

const TEST_SECRET: &[u8] = b"integration-ipn-secret";

/// Build the test app with the given collaborators.
fn test_app(
    gateway: MockPaymentGateway,
    notary: MockNotarizationClient,
) -> axum::Router {
    let lifecycle = OrderLifecycle::new(
        OrderStore::in_memory(),
        Arc::new(gateway),
        Arc::new(notary),
        IpnVerifier::new(TEST_SECRET.to_vec()),
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

/// Signed webhook request for a raw notification body.
fn webhook(body: &str) -> Request<Body> {
    let canonical = CanonicalBytes::from_slice(body.as_bytes()).unwrap();
    let signature = IpnVerifier::new(TEST_SECRET.to_vec()).sign(&canonical);
    Request::builder()
        .method("POST")
        .uri("/webhooks/payment")
        .header("content-type", "application/json")
        .header("x-nowpayments-sig", signature)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Read response body as JSON Value.
async fn body_json(response: axum::http::Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create order N1 for amount 10 with payload bytes 0xAABB (as text).
async fn create_n1(app: &axum::Router) -> serde_json::Value {
    let resp = app
        .clone()
        .oneshot(post_json(
            "/v1/orders",
            json!({"amount": 10, "order_id": "N1", "encrypted_payload": "0xAABB"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

fn finished(order_id: &str) -> String {
    json!({"payment_status": "finished", "order_id": order_id, "payment_id": "P1"})
        .to_string()
}

// =========================================================================
// Happy path, end to end
// =========================================================================

#[tokio::test]
async fn full_lifecycle_create_pay_record_retrieve() {
    let notary = MockNotarizationClient::succeeding("T1");
    let app = test_app(MockPaymentGateway::succeeding("P1"), notary.clone());

    // Create order N1 -> gateway returns P1 -> stored AWAITING_PAYMENT.
    let created = create_n1(&app).await;
    assert_eq!(created["order_id"], "N1");
    assert_eq!(created["payment_id"], "P1");
    assert!(created["pay_address"].as_str().unwrap().len() > 0);

    let status = body_json(app.clone().oneshot(get("/v1/orders/N1")).await.unwrap()).await;
    assert_eq!(status["state"], "AWAITING_PAYMENT");

    // Receipt is not ready yet.
    let resp = app.clone().oneshot(get("/v1/orders/N1/receipt")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let not_ready = body_json(resp).await;
    assert_eq!(not_ready["error"]["code"], "NOT_READY");

    // Valid finished notification -> notarization succeeds with T1.
    let resp = app.clone().oneshot(webhook(&finished("N1"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(notary.call_count(), 1);

    // Order is RECORDED and the receipt is exactly T1.
    let status = body_json(app.clone().oneshot(get("/v1/orders/N1")).await.unwrap()).await;
    assert_eq!(status["state"], "RECORDED");
    assert_eq!(status["tx_reference"], "T1");

    let resp = app.clone().oneshot(get("/v1/orders/N1/receipt")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let receipt = body_json(resp).await;
    assert_eq!(receipt["tx_reference"], "T1");
}

#[tokio::test]
async fn redelivered_notification_is_acknowledged_with_no_second_recording() {
    let notary = MockNotarizationClient::succeeding("T1");
    let app = test_app(MockPaymentGateway::succeeding("P1"), notary.clone());
    create_n1(&app).await;

    // Deliver the identical notification three times.
    for _ in 0..3 {
        let resp = app.clone().oneshot(webhook(&finished("N1"))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    // Exactly one notarization call; state unchanged after the first.
    assert_eq!(notary.call_count(), 1);
    let status = body_json(app.clone().oneshot(get("/v1/orders/N1")).await.unwrap()).await;
    assert_eq!(status["state"], "RECORDED");
    assert_eq!(status["tx_reference"], "T1");
}

#[tokio::test]
async fn invalid_signature_is_rejected_and_store_untouched() {
    let notary = MockNotarizationClient::succeeding("T1");
    let app = test_app(MockPaymentGateway::succeeding("P1"), notary.clone());
    create_n1(&app).await;

    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/payment")
        .header("content-type", "application/json")
        .header("x-nowpayments-sig", "deadbeef")
        .body(Body::from(finished("N1")))
        .unwrap();
    let resp = app.clone().oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(notary.call_count(), 0);

    // getTxReference still reports not-ready.
    let resp = app.clone().oneshot(get("/v1/orders/N1/receipt")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "NOT_READY");

    let status = body_json(app.clone().oneshot(get("/v1/orders/N1")).await.unwrap()).await;
    assert_eq!(status["state"], "AWAITING_PAYMENT");
}

#[tokio::test]
async fn missing_signature_header_is_unauthorized() {
    let app = test_app(
        MockPaymentGateway::succeeding("P1"),
        MockNotarizationClient::succeeding("T1"),
    );
    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/payment")
        .header("content-type", "application/json")
        .body(Body::from(finished("N1")))
        .unwrap();
    let resp = app.oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_order_notification_returns_404_and_mutates_nothing() {
    let notary = MockNotarizationClient::succeeding("T1");
    let app = test_app(MockPaymentGateway::succeeding("P1"), notary.clone());
    create_n1(&app).await;

    let resp = app.clone().oneshot(webhook(&finished("ghost"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(notary.call_count(), 0);

    let status = body_json(app.clone().oneshot(get("/v1/orders/N1")).await.unwrap()).await;
    assert_eq!(status["state"], "AWAITING_PAYMENT");
}

#[tokio::test]
async fn non_final_statuses_are_acknowledged_and_ignored() {
    let notary = MockNotarizationClient::succeeding("T1");
    let app = test_app(MockPaymentGateway::succeeding("P1"), notary.clone());
    create_n1(&app).await;

    for status in ["waiting", "confirming", "partially_paid", "expired"] {
        let body = json!({"payment_status": status, "order_id": "N1"}).to_string();
        let resp = app.clone().oneshot(webhook(&body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "status {status}");
    }

    assert_eq!(notary.call_count(), 0);
    let status = body_json(app.clone().oneshot(get("/v1/orders/N1")).await.unwrap()).await;
    assert_eq!(status["state"], "AWAITING_PAYMENT");
}

#[tokio::test]
async fn notarization_failure_settles_as_failed_but_acknowledges() {
    let notary = MockNotarizationClient::failing(500, "out of gas");
    let app = test_app(MockPaymentGateway::succeeding("P1"), notary.clone());
    create_n1(&app).await;

    // The processor still gets its 200 — recording trouble is not its
    // problem.
    let resp = app.clone().oneshot(webhook(&finished("N1"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(notary.call_count(), 1);

    // FAILED is caller-visible through the status query, with the reason.
    let status = body_json(app.clone().oneshot(get("/v1/orders/N1")).await.unwrap()).await;
    assert_eq!(status["state"], "FAILED");
    assert!(status["failure_reason"]
        .as_str()
        .unwrap()
        .contains("out of gas"));

    // Redelivery does not retry a terminally failed order.
    let resp = app.clone().oneshot(webhook(&finished("N1"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(notary.call_count(), 1);

    let resp = app.clone().oneshot(get("/v1/orders/N1/receipt")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn gateway_rejection_persists_no_order() {
    let app = test_app(
        MockPaymentGateway::failing(400, "amount too small"),
        MockNotarizationClient::succeeding("T1"),
    );

    let resp = app
        .clone()
        .oneshot(post_json(
            "/v1/orders",
            json!({"amount": 10, "order_id": "N1", "encrypted_payload": "0xAABB"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "GATEWAY_ERROR");

    // No partial order exists.
    let resp = app.clone().oneshot(get("/v1/orders/N1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn shuffled_notification_key_order_still_verifies() {
    // The signature is computed over the canonical (sorted-keys)
    // serialization, so a delivery with keys in another order carries the
    // same signature.
    let notary = MockNotarizationClient::succeeding("T1");
    let app = test_app(MockPaymentGateway::succeeding("P1"), notary.clone());
    create_n1(&app).await;

    let shuffled =
        r#"{"payment_id": "P1", "order_id": "N1", "payment_status": "finished"}"#;
    let resp = app.clone().oneshot(webhook(shuffled)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(notary.call_count(), 1);
}
