//! Checkout initiation integration tests.

mod common;

use common::TestHarness;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn checkout_returns_hosted_session_url() {
    let harness = TestHarness::new().await;

    Mock::given(method("POST"))
        .and(path("/checkout/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cs_test_123",
            "url": "https://pay.example.com/c/cs_test_123",
            "payment_status": "unpaid"
        })))
        .mount(&harness.payments)
        .await;

    let response = harness
        .server
        .post("/v1/checkout")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({"pack_name": "basic"}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["session_id"], "cs_test_123");
    assert_eq!(body["redirect_url"], "https://pay.example.com/c/cs_test_123");
}

#[tokio::test]
async fn checkout_prices_from_the_catalog() {
    let harness = TestHarness::new().await;

    // The basic pack is 30 credits for 999 minor units; the session request
    // must carry the catalog figures, not anything client-supplied.
    Mock::given(method("POST"))
        .and(path("/checkout/sessions"))
        .and(body_string_contains("unit_amount%5D=999"))
        .and(body_string_contains("credits%5D=30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cs_test_456",
            "url": "https://pay.example.com/c/cs_test_456"
        })))
        .expect(1)
        .mount(&harness.payments)
        .await;

    let response = harness
        .server
        .post("/v1/checkout")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({"pack_name": "basic", "price": 1, "credits": 99999}))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn unknown_pack_rejected_before_any_provider_call() {
    let harness = TestHarness::new().await;

    Mock::given(method("POST"))
        .and(path("/checkout/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cs_test_123",
            "url": "https://pay.example.com/c/cs_test_123"
        })))
        .expect(0)
        .mount(&harness.payments)
        .await;

    let response = harness
        .server
        .post("/v1/checkout")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({"pack_name": "mega"}))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn pack_names_are_case_sensitive() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/v1/checkout")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({"pack_name": "Basic"}))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn checkout_requires_authentication() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/v1/checkout")
        .json(&json!({"pack_name": "basic"}))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn provider_failure_is_upstream_error() {
    let harness = TestHarness::new().await;

    Mock::given(method("POST"))
        .and(path("/checkout/sessions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"type": "api_error", "message": "provider down"}
        })))
        .mount(&harness.payments)
        .await;

    let response = harness
        .server
        .post("/v1/checkout")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({"pack_name": "starter"}))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
}
