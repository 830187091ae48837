//! Settled purchase records.
//!
//! A `Purchase` is the append-only audit row written when a payment-provider
//! checkout session settles. The external session id is the idempotency key:
//! at most one purchase may exist per session id, and records are never
//! mutated or deleted after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PurchaseId, UserId};

/// An audit record of one settled credit purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    /// Unique purchase ID (ULID for time-ordering).
    pub id: PurchaseId,

    /// The user whose balance was credited.
    pub user_id: UserId,

    /// The payment provider's checkout-session id. Idempotency key.
    pub external_session_id: String,

    /// The payment provider's payment id, when the event carried one.
    pub external_payment_id: Option<String>,

    /// Catalog pack name from the session metadata.
    pub pack_name: String,

    /// Amount paid, in currency minor units.
    pub amount_minor_units: i64,

    /// Credits added to the balance.
    pub credits_purchased: i64,

    /// Settlement status. Only completed purchases are recorded.
    pub status: PurchaseStatus,

    /// When the settlement was processed.
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    /// Create a settled purchase record.
    #[must_use]
    pub fn settled(
        user_id: UserId,
        external_session_id: String,
        external_payment_id: Option<String>,
        pack_name: String,
        amount_minor_units: i64,
        credits_purchased: i64,
    ) -> Self {
        Self {
            id: PurchaseId::generate(),
            user_id,
            external_session_id,
            external_payment_id,
            pack_name,
            amount_minor_units,
            credits_purchased,
            status: PurchaseStatus::Completed,
            created_at: Utc::now(),
        }
    }
}

/// Settlement status of a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    /// Payment completed and credits applied.
    Completed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settled_purchase_record() {
        let user_id = UserId::generate();
        let purchase = Purchase::settled(
            user_id.clone(),
            "cs_test_123".into(),
            Some("pi_test_456".into()),
            "basic".into(),
            999,
            30,
        );

        assert_eq!(purchase.user_id, user_id);
        assert_eq!(purchase.external_session_id, "cs_test_123");
        assert_eq!(purchase.credits_purchased, 30);
        assert_eq!(purchase.status, PurchaseStatus::Completed);
    }
}
