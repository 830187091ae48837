//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{accounts, checkout, generate, health, session, webhooks};
use crate::state::AppState;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `GET /auth/callback` - OAuth code exchange + session cookies
///
/// ## Generation (bearer auth optional: anonymous requests take the free path)
/// - `POST /v1/generate` - Generate an image, debiting one credit
///
/// ## Account (bearer auth)
/// - `GET /v1/account/balance` - Get current credit balance
/// - `GET /v1/account/purchases` - List settled purchase history
/// - `POST /v1/checkout` - Initiate a credit-pack purchase
///
/// ## Webhooks (signature verification)
/// - `POST /webhooks/payments` - Payment provider settlement events
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Session bridge
        .route("/auth/callback", get(session::auth_callback))
        // Generation
        .route("/v1/generate", post(generate::generate))
        // Account
        .route("/v1/account/balance", get(accounts::get_balance))
        .route("/v1/account/purchases", get(accounts::list_purchases))
        // Checkout
        .route("/v1/checkout", post(checkout::checkout))
        // Webhooks
        .route("/webhooks/payments", post(webhooks::payment_webhook))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
