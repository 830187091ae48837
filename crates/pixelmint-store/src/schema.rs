//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Primary account records, keyed by `user_id`.
    pub const ACCOUNTS: &str = "accounts";

    /// Settled purchase records, keyed by `purchase_id` (ULID).
    pub const PURCHASES: &str = "purchases";

    /// Index: purchases by user, keyed by `user_id || 0x00 || purchase_id`.
    /// Value is empty (index only).
    pub const PURCHASES_BY_USER: &str = "purchases_by_user";

    /// Settlement idempotency index, keyed by the payment provider's
    /// checkout-session id. Value is the purchase id.
    pub const SETTLEMENTS: &str = "settlements";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::ACCOUNTS,
        cf::PURCHASES,
        cf::PURCHASES_BY_USER,
        cf::SETTLEMENTS,
    ]
}
