//! Image generation handler: the credit debit protocol.
//!
//! Authenticated requests spend exactly one credit if and only if generation
//! ultimately succeeds. The debit is a compare-and-swap decrement
//! conditioned on the balance just read; a failed generation triggers a
//! best-effort compensating credit. Requests without any `Authorization`
//! header take the free anonymous path with no ledger interaction.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use pixelmint_core::AspectRatio;
use pixelmint_store::Store;

use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::ApiError;
use crate::generation::{GenerationClient, GenerationError};
use crate::handlers::accounts::ensure_account;
use crate::state::AppState;

/// Generation request.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// The text prompt. Must be non-empty after trimming.
    pub prompt: String,

    /// Aspect ratio; absent or unrecognized values fall back to square.
    #[serde(default)]
    pub aspect_ratio: Option<String>,
}

/// Generation response.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    /// URL of the generated image.
    pub image_url: String,

    /// Remaining credit balance. Absent on the anonymous free path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<i64>,
}

/// Generate an image, debiting one credit for authenticated users.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    auth: MaybeAuthUser,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let prompt = body.prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::BadRequest("prompt must not be empty".into()));
    }

    let aspect_ratio = AspectRatio::parse_or_default(body.aspect_ratio.as_deref());

    let generation = state
        .generation
        .as_ref()
        .ok_or_else(|| ApiError::Upstream("generation provider not configured".into()))?;

    match auth.0 {
        Some(user) => {
            generate_with_debit(&state, generation, user, prompt, aspect_ratio).await
        }
        None => {
            // Free anonymous path: provider-direct, no ledger interaction.
            let image = generation
                .generate(prompt, aspect_ratio)
                .await
                .map_err(map_generation_error)?;

            Ok(Json(GenerateResponse {
                image_url: image.url,
                credits: None,
            }))
        }
    }
}

/// The paid path: reserve a credit, generate, compensate on failure.
async fn generate_with_debit(
    state: &AppState,
    generation: &GenerationClient,
    user: AuthUser,
    prompt: &str,
    aspect_ratio: AspectRatio,
) -> Result<Json<GenerateResponse>, ApiError> {
    let account = ensure_account(state, &user.user_id)?;

    if account.credits < 1 {
        return Err(ApiError::InsufficientCredits {
            balance: account.credits,
        });
    }

    // Reserve: conditional decrement on the balance we just read. A
    // conflict means another request moved the balance; the caller must
    // resubmit, we never retry here.
    let balance_after_debit =
        state
            .store
            .compare_and_swap_credits(&user.user_id, account.credits, account.credits - 1)?;

    tracing::debug!(
        user_id = %user.user_id,
        balance = %balance_after_debit,
        "Credit reserved for generation"
    );

    match generation.generate(prompt, aspect_ratio).await {
        Ok(image) => Ok(Json(GenerateResponse {
            image_url: image.url,
            credits: Some(balance_after_debit),
        })),
        Err(generation_err) => {
            // Compensate: best effort. A failed compensation is logged and
            // never escalates past the original generation failure.
            match state.store.add_credits(&user.user_id, 1) {
                Ok(balance) => {
                    tracing::info!(
                        user_id = %user.user_id,
                        balance = %balance,
                        error = %generation_err,
                        "Generation failed, credit refunded"
                    );
                }
                Err(compensation_err) => {
                    tracing::error!(
                        user_id = %user.user_id,
                        generation_error = %generation_err,
                        compensation_error = %compensation_err,
                        "Generation failed and compensating credit also failed"
                    );
                }
            }

            Err(map_generation_error(generation_err))
        }
    }
}

/// Map provider failures onto the API error taxonomy.
fn map_generation_error(err: GenerationError) -> ApiError {
    match err {
        GenerationError::RateLimited => ApiError::RateLimited,
        GenerationError::QuotaExceeded => ApiError::QuotaExceeded,
        GenerationError::Http(e) => ApiError::Upstream(format!("generation request failed: {e}")),
        GenerationError::Api { status, message } => {
            ApiError::Upstream(format!("generation failed ({status}): {message}"))
        }
        GenerationError::MalformedResponse => {
            ApiError::Upstream("generation provider returned no image".into())
        }
    }
}
