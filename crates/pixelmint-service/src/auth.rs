//! Authentication extractors.
//!
//! This module provides extractors for:
//! - `AuthUser` - required end-user authentication via an identity-provider
//!   JWT bearer token
//! - `MaybeAuthUser` - optional authentication for the generation endpoint,
//!   where a wholly absent `Authorization` header selects the anonymous
//!   free path but a present-and-invalid credential is still rejected

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use pixelmint_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// An authenticated user extracted from an identity-provider JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user ID.
    pub user_id: UserId,
    /// The raw subject claim from the JWT.
    pub subject: String,
}

/// JWT claims issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID).
    pub sub: String,
    /// Audience.
    pub aud: String,
    /// Issuer.
    pub iss: String,
    /// Expiration time.
    pub exp: i64,
    /// Issued at.
    pub iat: i64,
}

/// Validate a bearer token and resolve the user it belongs to.
fn authenticate(token: &str, state: &AppState) -> Result<AuthUser, ApiError> {
    // Test-token bypass for integration tests, gated behind config.
    if state.config.allow_test_tokens {
        if let Some(user_id_str) = token.strip_prefix("test-token:") {
            let user_id = user_id_str
                .parse::<UserId>()
                .map_err(|_| ApiError::Unauthorized)?;

            return Ok(AuthUser {
                user_id,
                subject: user_id_str.to_string(),
            });
        }
    }

    let pem = state
        .config
        .auth_public_key_pem
        .as_ref()
        .ok_or(ApiError::Unauthorized)?;

    let key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
        tracing::error!(error = %e, "Identity provider public key is not valid PEM");
        ApiError::Internal("auth misconfigured".into())
    })?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[state.config.auth_audience.as_str()]);
    validation.set_issuer(&[state.config.auth_issuer_url.as_str()]);

    let data = jsonwebtoken::decode::<JwtClaims>(token, &key, &validation)
        .map_err(|_| ApiError::Unauthorized)?;

    let user_id = data
        .claims
        .sub
        .parse::<UserId>()
        .map_err(|_| ApiError::Unauthorized)?;

    Ok(AuthUser {
        user_id,
        subject: data.claims.sub,
    })
}

/// Extract the bearer token from an `Authorization` header value.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let token = bearer_token(parts).ok_or(ApiError::Unauthorized)?;
            authenticate(token, state)
        })
    }
}

/// Optional authentication: `None` only when no `Authorization` header was
/// sent at all. A malformed or invalid credential is rejected, not treated
/// as anonymous.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequestParts<Arc<AppState>> for MaybeAuthUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            if !parts.headers.contains_key("authorization") {
                return Ok(Self(None));
            }

            let token = bearer_token(parts).ok_or(ApiError::Unauthorized)?;
            authenticate(token, state).map(|user| Self(Some(user)))
        })
    }
}
