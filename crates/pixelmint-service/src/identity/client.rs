//! Identity provider API client (authorization-code exchange).

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Error type for identity provider operations.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the exchange.
    #[error("code exchange failed ({status}): {message}")]
    Exchange {
        /// HTTP status returned by the provider.
        status: u16,
        /// Provider error message.
        message: String,
    },
}

/// Session material returned by a successful code exchange.
///
/// Serialized to JSON and persisted as the session cookie value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    /// Bearer token for subsequent API calls.
    pub access_token: String,

    /// Refresh token, when the provider issues one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Access-token lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ExchangeErrorResponse {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Identity provider API client.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    client: Client,
    base_url: String,
}

impl IdentityClient {
    /// Create a new identity client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Exchange an authorization code for a session.
    ///
    /// No retry semantics: a failed exchange is terminal for the request.
    pub async fn exchange_code(&self, code: &str) -> Result<SessionTokens, IdentityError> {
        let response = self
            .client
            .post(format!("{}/oauth/token", self.base_url))
            .form(&[("grant_type", "authorization_code"), ("code", code)])
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ExchangeErrorResponse>()
                .await
                .ok()
                .and_then(|r| r.error_description.or(r.error))
                .unwrap_or_else(|| format!("HTTP {status}"));

            return Err(IdentityError::Exchange {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
