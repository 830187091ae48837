//! Payment provider API types.
//!
//! Only the subset of the provider's checkout-session surface this service
//! reads back is modeled here; everything else stays opaque JSON.

use serde::Deserialize;

/// A hosted checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Session ID (e.g. `cs_...`). The settlement idempotency key.
    pub id: String,

    /// URL of the hosted checkout page to redirect the user to.
    pub url: Option<String>,

    /// Payment status (`paid`, `unpaid`, ...), present on retrieval and in
    /// webhook payloads.
    #[serde(default)]
    pub payment_status: Option<String>,
}

/// Error envelope returned by the provider API.
#[derive(Debug, Deserialize)]
pub struct ProviderErrorResponse {
    /// The error payload.
    pub error: ProviderError,
}

/// Error detail returned by the provider API.
#[derive(Debug, Deserialize)]
pub struct ProviderError {
    /// Error category.
    #[serde(rename = "type")]
    pub error_type: String,

    /// Human-readable message.
    pub message: String,

    /// Machine-readable code, when present.
    #[serde(default)]
    pub code: Option<String>,
}
