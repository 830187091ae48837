//! Payment provider webhook handler: the settlement protocol.
//!
//! The only path that increases a balance. The request is authenticated by
//! signature over the raw body, not by user identity. Handled and ignored
//! events both acknowledge with 200 so the provider stops redelivering;
//! only signature and metadata failures are 4xx.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use pixelmint_core::Purchase;
use pixelmint_store::{Store, StoreError};

use crate::error::ApiError;
use crate::state::AppState;

/// Payment webhook payload.
#[derive(Debug, Deserialize)]
pub struct PaymentWebhook {
    /// Event type.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event ID.
    pub id: String,
    /// Event data.
    pub data: PaymentEventData,
}

/// Payment event data container.
#[derive(Debug, Deserialize)]
pub struct PaymentEventData {
    /// Event object (the checkout session, for completion events).
    pub object: serde_json::Value,
}

/// Webhook acknowledgment.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Whether the webhook was received.
    pub received: bool,

    /// Credits added by this delivery, when the event settled a purchase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits_added: Option<i64>,

    /// Balance after crediting, for observability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<i64>,
}

impl WebhookResponse {
    fn ack() -> Self {
        Self {
            received: true,
            credits_added: None,
            balance: None,
        }
    }
}

/// Handle payment provider webhooks.
///
/// The body is consumed as raw text before any JSON parsing: signature
/// verification operates over the exact bytes sent.
pub async fn payment_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookResponse>, ApiError> {
    let signature = headers
        .get("webhook-signature")
        .and_then(|v| v.to_str().ok());

    if state.config.payment_webhook_secret.is_some() {
        let sig = signature.ok_or(ApiError::InvalidSignature)?;

        let payments = state
            .payments
            .as_ref()
            .ok_or_else(|| ApiError::Upstream("payment provider not configured".into()))?;

        payments.verify_webhook_signature(&body, sig).map_err(|e| {
            tracing::warn!(error = %e, "Invalid webhook signature");
            ApiError::InvalidSignature
        })?;
    } else {
        // No signing secret configured - skip verification (development mode).
        tracing::warn!("Webhook secret not configured - skipping signature verification");
    }

    let webhook: PaymentWebhook =
        serde_json::from_str(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    tracing::info!(
        event_type = %webhook.event_type,
        event_id = %webhook.id,
        "Received payment webhook"
    );

    match webhook.event_type.as_str() {
        "checkout.session.completed" => handle_checkout_completed(&state, &webhook.data.object),
        _ => {
            // Acknowledge everything else so the provider stops retrying.
            tracing::debug!(event_type = %webhook.event_type, "Ignored payment event");
            Ok(Json(WebhookResponse::ack()))
        }
    }
}

/// Settle a completed checkout session: credit the ledger exactly once per
/// session id and append the purchase record.
fn handle_checkout_completed(
    state: &AppState,
    data: &serde_json::Value,
) -> Result<Json<WebhookResponse>, ApiError> {
    let session_id = data
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ApiError::MissingMetadata("session id".into()))?;

    let payment_status = data
        .get("payment_status")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");

    if payment_status != "paid" {
        tracing::info!(
            session_id = %session_id,
            payment_status = %payment_status,
            "Checkout session not paid yet, skipping"
        );
        return Ok(Json(WebhookResponse::ack()));
    }

    let metadata = data.get("metadata");

    let user_id_str = metadata
        .and_then(|m| m.get("user_id"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| ApiError::MissingMetadata("user_id".into()))?;

    let credits_str = metadata
        .and_then(|m| m.get("credits"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| ApiError::MissingMetadata("credits".into()))?;

    let credits: i64 = credits_str
        .parse()
        .map_err(|_| ApiError::InvalidCredits(format!("credits not an integer: {credits_str}")))?;
    if credits <= 0 {
        return Err(ApiError::InvalidCredits(format!(
            "credits must be positive: {credits}"
        )));
    }

    let pack_name = metadata
        .and_then(|m| m.get("pack_name"))
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");

    let user_id = user_id_str
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid user_id: {user_id_str}")))?;

    // Idempotency: providers redeliver events. A session settled before is
    // acknowledged without a second credit.
    if let Some(existing) = state.store.get_settlement(session_id)? {
        tracing::info!(
            session_id = %session_id,
            purchase_id = %existing.id,
            "Settlement already recorded, skipping credit"
        );
        return Ok(Json(WebhookResponse::ack()));
    }

    let amount_minor_units = data
        .get("amount_total")
        .and_then(serde_json::Value::as_i64)
        .unwrap_or(0);

    let external_payment_id = data
        .get("payment_intent")
        .and_then(|v| v.as_str())
        .map(String::from);

    let purchase = Purchase::settled(
        user_id,
        session_id.to_string(),
        external_payment_id,
        pack_name.to_string(),
        amount_minor_units,
        credits,
    );

    let balance = match state.store.settle_purchase(&purchase) {
        Ok(balance) => balance,
        // Lost a redelivery race between the existence check and the write.
        Err(StoreError::DuplicateSettlement { session_id }) => {
            tracing::info!(session_id = %session_id, "Settlement raced a redelivery, skipping");
            return Ok(Json(WebhookResponse::ack()));
        }
        Err(StoreError::NotFound) => {
            return Err(ApiError::NotFound(format!(
                "account not found for user {user_id_str}"
            )));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        user_id = %user_id_str,
        session_id = %session_id,
        credits_added = %credits,
        balance = %balance,
        purchase_id = %purchase.id,
        "Credits added from checkout settlement"
    );

    Ok(Json(WebhookResponse {
        received: true,
        credits_added: Some(credits),
        balance: Some(balance),
    }))
}
