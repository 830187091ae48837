//! Payment provider API client.

use reqwest::Client;
use std::time::Duration;

use pixelmint_core::{CreditPack, UserId};

use super::types::{CheckoutSession, ProviderErrorResponse};
use crate::crypto::{constant_time_eq, hmac_sha256_hex};

/// Error type for payment provider operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider API returned an error.
    #[error("payment provider error: {error_type} - {message}")]
    Api {
        /// Error type.
        error_type: String,
        /// Error message.
        message: String,
        /// Error code.
        code: Option<String>,
    },

    /// Invalid webhook signature.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Default payment provider API base URL (Stripe-compatible).
const DEFAULT_BASE_URL: &str = "https://api.stripe.com/v1";

/// Payment provider API client.
#[derive(Debug, Clone)]
pub struct PaymentClient {
    client: Client,
    base_url: String,
    api_key: String,
    webhook_secret: Option<String>,
}

impl PaymentClient {
    /// Create a new payment client against the default provider endpoint.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, webhook_secret: Option<String>) -> Self {
        Self::with_base_url(api_key, webhook_secret, DEFAULT_BASE_URL)
    }

    /// Create a payment client against a custom base URL (tests, proxies).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    pub fn with_base_url(
        api_key: impl Into<String>,
        webhook_secret: Option<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            webhook_secret,
        }
    }

    /// Create a hosted checkout session for a credit pack.
    ///
    /// The line item is priced from the catalog entry; the session metadata
    /// carries `{user_id, pack_name, credits}` verbatim so the settlement
    /// webhook can act without a second lookup.
    pub async fn create_checkout_session(
        &self,
        user_id: &UserId,
        pack: &CreditPack,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let params = vec![
            ("mode", "payment".to_string()),
            ("success_url", success_url.to_string()),
            ("cancel_url", cancel_url.to_string()),
            ("client_reference_id", user_id.to_string()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            (
                "line_items[0][price_data][product_data][name]",
                format!("Pixelmint {} pack", pack.name),
            ),
            (
                "line_items[0][price_data][product_data][description]",
                format!("{} image generation credits", pack.credits),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                pack.price_minor_units.to_string(),
            ),
            ("line_items[0][quantity]", "1".to_string()),
            ("metadata[user_id]", user_id.to_string()),
            ("metadata[pack_name]", pack.name.to_string()),
            ("metadata[credits]", pack.credits.to_string()),
        ];

        tracing::debug!(
            user_id = %user_id,
            pack = %pack.name,
            amount_minor_units = %pack.price_minor_units,
            "Creating checkout session"
        );

        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.base_url))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .form(&params)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Verify a webhook signature over the raw request body.
    ///
    /// Signature header format: `t=timestamp,v1=signature[,v1=...]`. The
    /// signed payload is `"{timestamp}.{body}"`.
    pub fn verify_webhook_signature(
        &self,
        payload: &str,
        signature: &str,
    ) -> Result<(), PaymentError> {
        let secret = self
            .webhook_secret
            .as_ref()
            .ok_or_else(|| PaymentError::Configuration("webhook secret not configured".into()))?;

        let mut timestamp: Option<&str> = None;
        let mut signatures: Vec<&str> = Vec::new();

        for part in signature.split(',') {
            let mut kv = part.splitn(2, '=');
            match (kv.next(), kv.next()) {
                (Some("t"), Some(ts)) => timestamp = Some(ts),
                (Some("v1"), Some(sig)) => signatures.push(sig),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(PaymentError::InvalidSignature)?;

        if signatures.is_empty() {
            return Err(PaymentError::InvalidSignature);
        }

        let signed_payload = format!("{timestamp}.{payload}");
        let expected = hmac_sha256_hex(secret, &signed_payload);

        let valid = signatures
            .iter()
            .any(|sig| constant_time_eq(&expected, sig));

        if valid {
            Ok(())
        } else {
            Err(PaymentError::InvalidSignature)
        }
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PaymentError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let error_body: Result<ProviderErrorResponse, _> = response.json().await;

        match error_body {
            Ok(provider_error) => Err(PaymentError::Api {
                error_type: provider_error.error.error_type,
                message: provider_error.error.message,
                code: provider_error.error.code,
            }),
            Err(_) => Err(PaymentError::Api {
                error_type: "unknown".to_string(),
                message: format!("HTTP {status}"),
                code: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_secret(secret: &str) -> PaymentClient {
        PaymentClient::new("sk_test_xxx", Some(secret.to_string()))
    }

    /// Build a valid signature header the way the provider does.
    fn sign(secret: &str, timestamp: &str, body: &str) -> String {
        let sig = hmac_sha256_hex(secret, &format!("{timestamp}.{body}"));
        format!("t={timestamp},v1={sig}")
    }

    #[test]
    fn accepts_valid_signature() {
        let client = client_with_secret("whsec_test");
        let body = r#"{"type":"checkout.session.completed"}"#;
        let header = sign("whsec_test", "1700000000", body);

        assert!(client.verify_webhook_signature(body, &header).is_ok());
    }

    #[test]
    fn rejects_wrong_secret() {
        let client = client_with_secret("whsec_test");
        let body = r#"{"type":"checkout.session.completed"}"#;
        let header = sign("whsec_other", "1700000000", body);

        assert!(matches!(
            client.verify_webhook_signature(body, &header),
            Err(PaymentError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_tampered_body() {
        let client = client_with_secret("whsec_test");
        let header = sign("whsec_test", "1700000000", r#"{"credits":"30"}"#);

        assert!(matches!(
            client.verify_webhook_signature(r#"{"credits":"3000"}"#, &header),
            Err(PaymentError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_malformed_header() {
        let client = client_with_secret("whsec_test");

        assert!(client.verify_webhook_signature("{}", "garbage").is_err());
        assert!(client.verify_webhook_signature("{}", "t=123").is_err());
        assert!(client.verify_webhook_signature("{}", "v1=abc").is_err());
    }

    #[test]
    fn unconfigured_secret_is_a_configuration_error() {
        let client = PaymentClient::new("sk_test_xxx", None);

        assert!(matches!(
            client.verify_webhook_signature("{}", "t=1,v1=abc"),
            Err(PaymentError::Configuration(_))
        ));
    }
}
