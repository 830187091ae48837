//! Checkout initiation handler.
//!
//! Translates a named credit pack into a payment-provider checkout session.
//! Price and credit amount come solely from the server-side catalog; any
//! client-supplied figures are ignored.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use pixelmint_core::find_pack;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::accounts::ensure_account;
use crate::state::AppState;

/// Checkout request. Only the pack name is trusted.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Catalog pack name.
    pub pack_name: String,
}

/// Checkout response.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Hosted checkout page to redirect the user to.
    pub redirect_url: String,

    /// Checkout-session id, for client-side tracking.
    pub session_id: String,
}

/// Initiate a credit-pack purchase.
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    // Validate before any side effect.
    let pack = find_pack(&body.pack_name)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown pack: {}", body.pack_name)))?;

    let payments = state
        .payments
        .as_ref()
        .ok_or_else(|| ApiError::Upstream("payment provider not configured".into()))?;

    ensure_account(&state, &auth.user_id)?;

    let success_url = format!(
        "{}/credits/success?session_id={{CHECKOUT_SESSION_ID}}",
        state.config.app_url
    );
    let cancel_url = format!("{}/credits/cancel", state.config.app_url);

    let session = payments
        .create_checkout_session(&auth.user_id, pack, &success_url, &cancel_url)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create checkout session");
            ApiError::Upstream(format!("failed to create checkout session: {e}"))
        })?;

    let redirect_url = session
        .url
        .ok_or_else(|| ApiError::Upstream("payment provider returned no checkout URL".into()))?;

    tracing::info!(
        user_id = %auth.user_id,
        pack = %pack.name,
        session_id = %session.id,
        "Checkout session created"
    );

    Ok(Json(CheckoutResponse {
        redirect_url,
        session_id: session.id,
    }))
}
