//! Session bridge handler: the OAuth callback.
//!
//! Exchanges an authorization code for a session and persists it as
//! chunked cookies under the shared key, so cooperating subdomains can
//! read it back. A failed exchange redirects to a client-visible error
//! state; there are no retry semantics.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;

use crate::session::{encode_chunks, set_cookie_header};
use crate::state::AppState;

/// Callback query parameters.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code from the identity provider, when present.
    #[serde(default)]
    pub code: Option<String>,
}

/// Handle the identity provider's redirect back to us.
pub async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let app_url = state.config.app_url.clone();

    // No code: pass-through redirect.
    let Some(code) = query.code else {
        return Redirect::to(&app_url).into_response();
    };

    let Some(identity) = state.identity.as_ref() else {
        tracing::error!("Identity provider not configured");
        return Redirect::to(&format!("{app_url}/?auth_error=unavailable")).into_response();
    };

    let tokens = match identity.exchange_code(&code).await {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::warn!(error = %e, "Authorization code exchange failed");
            return Redirect::to(&format!("{app_url}/?auth_error=exchange_failed"))
                .into_response();
        }
    };

    let session_value = match serde_json::to_string(&tokens) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize session");
            return Redirect::to(&format!("{app_url}/?auth_error=exchange_failed"))
                .into_response();
        }
    };

    let mut headers = HeaderMap::new();
    for (name, value) in encode_chunks(&state.config.session_cookie_name, &session_value) {
        let header = set_cookie_header(&name, &value, &state.config.cookie_domain);
        match header.parse() {
            Ok(parsed) => {
                headers.append(SET_COOKIE, parsed);
            }
            Err(e) => {
                tracing::error!(error = %e, cookie = %name, "Failed to build session cookie");
                return Redirect::to(&format!("{app_url}/?auth_error=exchange_failed"))
                    .into_response();
            }
        }
    }

    tracing::info!("Session established via code exchange");

    (headers, Redirect::to(&app_url)).into_response()
}
