//! Account balance and purchase-history handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use pixelmint_core::{Account, Purchase, UserId};
use pixelmint_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Fetch the account for a user, creating it with the signup grant on
/// first authenticated use.
pub fn ensure_account(state: &AppState, user_id: &UserId) -> Result<Account, ApiError> {
    if let Some(account) = state.store.get_account(user_id)? {
        return Ok(account);
    }

    let account = Account::new(user_id.clone());
    state.store.put_account(&account)?;

    tracing::info!(
        user_id = %user_id,
        credits = %account.credits,
        "Account created with signup grant"
    );

    Ok(account)
}

/// Balance response.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Current credit balance.
    pub credits: i64,
}

/// Get current credit balance.
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<BalanceResponse>, ApiError> {
    let account = ensure_account(&state, &auth.user_id)?;

    Ok(Json(BalanceResponse {
        credits: account.credits,
    }))
}

/// Purchase list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListPurchasesQuery {
    /// Maximum number of purchases to return (default: 50).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Purchase response.
#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    /// Purchase ID.
    pub id: String,
    /// Catalog pack name.
    pub pack_name: String,
    /// Credits added by this purchase.
    pub credits_purchased: i64,
    /// Amount paid, in currency minor units.
    pub amount_minor_units: i64,
    /// Timestamp.
    pub created_at: String,
}

impl From<&Purchase> for PurchaseResponse {
    fn from(purchase: &Purchase) -> Self {
        Self {
            id: purchase.id.to_string(),
            pack_name: purchase.pack_name.clone(),
            credits_purchased: purchase.credits_purchased,
            amount_minor_units: purchase.amount_minor_units,
            created_at: purchase.created_at.to_rfc3339(),
        }
    }
}

/// List purchases response.
#[derive(Debug, Serialize)]
pub struct ListPurchasesResponse {
    /// Purchases (newest first).
    pub purchases: Vec<PurchaseResponse>,
    /// Whether there are more purchases.
    pub has_more: bool,
}

/// List settled purchase history.
pub async fn list_purchases(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListPurchasesQuery>,
) -> Result<Json<ListPurchasesResponse>, ApiError> {
    ensure_account(&state, &auth.user_id)?;

    // Fetch one more than requested to determine has_more.
    let limit = query.limit.min(100);
    let purchases = state
        .store
        .list_purchases_by_user(&auth.user_id, limit + 1, query.offset)?;

    let has_more = purchases.len() > limit;
    let purchases: Vec<_> = purchases
        .iter()
        .take(limit)
        .map(PurchaseResponse::from)
        .collect();

    Ok(Json(ListPurchasesResponse {
        purchases,
        has_more,
    }))
}
