//! Account types for pixelmint.
//!
//! An account is the per-user credit ledger entry. Balances are integer
//! credit counts and must never be observed below zero; mutations that would
//! produce a negative balance are rejected by the store, not clamped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Credits granted to every account on first authentication.
pub const SIGNUP_GRANT_CREDITS: i64 = 2;

/// A credit ledger account for a user.
///
/// Created lazily on first authenticated use. Only the debit protocol and
/// the settlement protocol mutate the balance; `updated_at` is bumped on
/// every balance change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// The identity-provider subject this account belongs to.
    pub user_id: UserId,

    /// Current credit balance. One credit buys one generation.
    pub credits: i64,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the balance last changed.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account carrying the signup grant.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            credits: SIGNUP_GRANT_CREDITS,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the account can afford a debit of `amount` credits.
    #[must_use]
    pub fn has_credits(&self, amount: i64) -> bool {
        self.credits >= amount
    }
}
