//! Common test utilities for pixelmint integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use tempfile::TempDir;
use wiremock::MockServer;

use pixelmint_core::{Account, UserId};
use pixelmint_service::crypto::hmac_sha256_hex;
use pixelmint_service::{create_router, AppState, ServiceConfig};
use pixelmint_store::{RocksStore, Store};

/// Webhook signing secret used by every test harness.
pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct store handle for seeding and inspecting ledger state.
    pub store: Arc<RocksStore>,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// A test user ID for authenticated requests.
    pub test_user_id: UserId,
    /// Mock generation provider.
    pub generation: MockServer,
    /// Mock payment provider.
    pub payments: MockServer,
    /// Mock identity provider (code exchange).
    pub identity: MockServer,
}

impl TestHarness {
    /// Create a new test harness with a fresh database and mocked upstreams.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Arc::new(RocksStore::open(temp_dir.path()).expect("Failed to open store"));

        let generation = MockServer::start().await;
        let payments = MockServer::start().await;
        let identity = MockServer::start().await;

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            auth_issuer_url: identity.uri(),
            auth_audience: "pixelmint".into(),
            auth_public_key_pem: None,
            allow_test_tokens: true,
            payment_api_key: Some("sk_test_xxx".into()),
            payment_webhook_secret: Some(WEBHOOK_SECRET.into()),
            payment_api_url: Some(payments.uri()),
            generation_api_url: Some(generation.uri()),
            generation_api_token: Some("gen_test_token".into()),
            app_url: "http://localhost:3000".into(),
            cookie_domain: ".pixelmint.test".into(),
            session_cookie_name: "pm-session".into(),
            provider_cookie_name: "idp-auth-token".into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(Arc::clone(&store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");
        let test_user_id = UserId::generate();

        Self {
            server,
            store,
            _temp_dir: temp_dir,
            test_user_id,
            generation,
            payments,
            identity,
        }
    }

    /// Get the authorization header for user authentication.
    pub fn user_auth_header(&self) -> String {
        format!("Bearer test-token:{}", self.test_user_id)
    }

    /// Seed the test user's account with a specific balance.
    pub fn seed_account(&self, credits: i64) {
        let mut account = Account::new(self.test_user_id.clone());
        account.credits = credits;
        self.store.put_account(&account).expect("seed account");
    }

    /// Read the test user's balance straight from the store.
    pub fn balance(&self) -> i64 {
        self.store
            .get_account(&self.test_user_id)
            .expect("get account")
            .expect("account exists")
            .credits
    }

    /// Build a valid webhook signature header for a raw body.
    pub fn sign_webhook(&self, body: &str) -> String {
        let timestamp = "1700000000";
        let sig = hmac_sha256_hex(WEBHOOK_SECRET, &format!("{timestamp}.{body}"));
        format!("t={timestamp},v1={sig}")
    }

    /// Build a `checkout.session.completed` event body for the test user.
    pub fn checkout_completed_event(&self, session_id: &str, credits: &str) -> String {
        serde_json::json!({
            "id": format!("evt_{session_id}"),
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": session_id,
                    "payment_status": "paid",
                    "payment_intent": format!("pi_{session_id}"),
                    "amount_total": 999,
                    "metadata": {
                        "user_id": self.test_user_id.to_string(),
                        "pack_name": "basic",
                        "credits": credits
                    }
                }
            }
        })
        .to_string()
    }
}
