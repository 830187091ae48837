//! Generation provider API client.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use pixelmint_core::AspectRatio;

/// Error type for generation provider operations.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// HTTP request failed (network, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider API returned an error.
    #[error("generation provider error ({status}): {message}")]
    Api {
        /// HTTP status returned by the provider.
        status: u16,
        /// Provider error message.
        message: String,
    },

    /// Provider rejected the request as rate-limited.
    #[error("generation provider rate limited")]
    RateLimited,

    /// Provider reported quota exhaustion for our token.
    #[error("generation provider quota exceeded")]
    QuotaExceeded,

    /// Provider returned a success status but no usable image.
    #[error("generation provider returned no image")]
    MalformedResponse,
}

/// A successfully generated image.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// URL of the generated image, hosted by the provider.
    pub url: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    aspect_ratio: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Generation provider API client.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    client: Client,
    base_url: String,
    token: String,
}

impl GenerationClient {
    /// Create a new generation client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Generate an image for a prompt.
    ///
    /// The prompt must already be validated (non-empty after trimming); this
    /// client sends it verbatim.
    pub async fn generate(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<GeneratedImage, GenerationError> {
        let response = self
            .client
            .post(format!("{}/v1/images/generations", self.base_url))
            .bearer_auth(&self.token)
            .json(&GenerateRequest {
                prompt,
                aspect_ratio: aspect_ratio.as_str(),
            })
            .send()
            .await?;

        let status = response.status();

        match status {
            StatusCode::TOO_MANY_REQUESTS => return Err(GenerationError::RateLimited),
            StatusCode::PAYMENT_REQUIRED | StatusCode::FORBIDDEN => {
                return Err(GenerationError::QuotaExceeded)
            }
            _ => {}
        }

        if !status.is_success() {
            let message = response
                .json::<GenerateResponse>()
                .await
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| format!("HTTP {status}"));

            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response.json().await?;
        let url = body.url.ok_or(GenerationError::MalformedResponse)?;

        if url.is_empty() {
            return Err(GenerationError::MalformedResponse);
        }

        Ok(GeneratedImage { url })
    }
}
