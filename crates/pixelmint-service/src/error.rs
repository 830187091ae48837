//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Webhook signature verification failed.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// Settlement metadata lacked a required field.
    #[error("missing metadata: {0}")]
    MissingMetadata(String),

    /// Settlement metadata carried a non-positive or unparsable credit
    /// amount.
    #[error("invalid credits: {0}")]
    InvalidCredits(String),

    /// Insufficient credits for the requested generation.
    #[error("insufficient credits: balance={balance}")]
    InsufficientCredits {
        /// Current balance.
        balance: i64,
    },

    /// The balance changed under a conditional write; caller must resubmit.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The generation provider rejected the request as rate-limited.
    #[error("upstream rate limited")]
    RateLimited,

    /// The generation provider reported quota exhaustion.
    #[error("upstream quota exceeded")]
    QuotaExceeded,

    /// An upstream provider is down or misbehaving.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::InvalidSignature => (
                StatusCode::BAD_REQUEST,
                "invalid_signature",
                self.to_string(),
                None,
            ),
            Self::MissingMetadata(field) => (
                StatusCode::BAD_REQUEST,
                "missing_metadata",
                format!("missing metadata field: {field}"),
                None,
            ),
            Self::InvalidCredits(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_credits",
                msg.clone(),
                None,
            ),
            Self::InsufficientCredits { balance } => (
                StatusCode::PAYMENT_REQUIRED,
                "insufficient_credits",
                "purchase more credits to keep generating".to_string(),
                Some(serde_json::json!({ "balance": balance })),
            ),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "the image service is rate limited, try again shortly".to_string(),
                None,
            ),
            Self::QuotaExceeded => (
                StatusCode::TOO_MANY_REQUESTS,
                "quota_exceeded",
                "the image service quota is exhausted, try again later".to_string(),
                None,
            ),
            Self::Upstream(msg) => (StatusCode::BAD_GATEWAY, "upstream_error", msg.clone(), None),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<pixelmint_store::StoreError> for ApiError {
    fn from(err: pixelmint_store::StoreError) -> Self {
        match err {
            pixelmint_store::StoreError::NotFound => Self::NotFound("account not found".into()),
            pixelmint_store::StoreError::InsufficientCredits { balance, .. } => {
                Self::InsufficientCredits { balance }
            }
            pixelmint_store::StoreError::BalanceConflict { .. } => {
                Self::Conflict("balance changed concurrently, please retry".into())
            }
            pixelmint_store::StoreError::DuplicateSettlement { session_id } => {
                // Handlers treat redelivery as success before converting;
                // reaching here means a non-webhook path hit the guard.
                Self::Conflict(format!("session {session_id} already settled"))
            }
            pixelmint_store::StoreError::Database(msg)
            | pixelmint_store::StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelmint_store::StoreError;

    async fn response_parts(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn losing_a_balance_race_surfaces_as_409_conflict() {
        // The response a debit request receives when the conditional
        // decrement finds the balance already moved.
        let err: ApiError = StoreError::BalanceConflict {
            expected: 5,
            actual: 4,
        }
        .into();

        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "conflict");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("retry"));
    }

    #[tokio::test]
    async fn insufficient_credits_carries_balance_detail() {
        let err: ApiError = StoreError::InsufficientCredits {
            balance: 0,
            required: 1,
        }
        .into();

        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body["error"]["code"], "insufficient_credits");
        assert_eq!(body["error"]["details"]["balance"], 0);
    }
}
