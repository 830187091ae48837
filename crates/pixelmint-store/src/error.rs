//! Error types for pixelmint storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("not found")]
    NotFound,

    /// Insufficient credits for a debit.
    #[error("insufficient credits: balance={balance}, required={required}")]
    InsufficientCredits {
        /// Current balance.
        balance: i64,
        /// Required amount.
        required: i64,
    },

    /// Conditional balance write lost the race: the balance no longer
    /// matches the caller's snapshot.
    #[error("balance conflict: expected={expected}, actual={actual}")]
    BalanceConflict {
        /// The balance the caller observed.
        expected: i64,
        /// The balance currently stored.
        actual: i64,
    },

    /// A settlement for this checkout session was already recorded
    /// (idempotency check).
    #[error("duplicate settlement: {session_id}")]
    DuplicateSettlement {
        /// The external session id that was already settled.
        session_id: String,
    },
}
