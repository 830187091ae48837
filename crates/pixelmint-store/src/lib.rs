//! `RocksDB` storage layer for pixelmint.
//!
//! This crate provides persistent storage for credit-ledger accounts and
//! settled purchases using `RocksDB` with column families for indexing.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `accounts`: Primary account records, keyed by `user_id`
//! - `purchases`: Settled purchase records, keyed by `purchase_id` (ULID)
//! - `purchases_by_user`: Index for listing purchases by user
//! - `settlements`: Idempotency index, keyed by external checkout-session id
//!
//! # Concurrency
//!
//! All shared state between requests lives here. Balance mutations are
//! serialized behind one store-wide lock so that
//! [`Store::compare_and_swap_credits`] gives genuine compare-and-swap
//! semantics: the write only lands if the balance still equals the value
//! the caller read. That conditional write is the ledger's sole guard
//! against concurrent debits driving a balance negative.
//!
//! # Example
//!
//! ```no_run
//! use pixelmint_store::{RocksStore, Store};
//! use pixelmint_core::{UserId, Account};
//!
//! let store = RocksStore::open("/tmp/pixelmint-db").unwrap();
//!
//! let account = Account::new(UserId::generate());
//! store.put_account(&account).unwrap();
//!
//! // Spend one credit, conditioned on the balance we just read.
//! let balance = store
//!     .compare_and_swap_credits(&account.user_id, account.credits, account.credits - 1)
//!     .unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use pixelmint_core::{Account, Purchase, PurchaseId, UserId};

/// The storage trait defining all ledger operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // Account Operations
    // =========================================================================

    /// Insert or update an account record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_account(&self, account: &Account) -> Result<()>;

    /// Get an account by user ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_account(&self, user_id: &UserId) -> Result<Option<Account>>;

    /// Conditionally replace an account's balance.
    ///
    /// The write only succeeds if the stored balance still equals
    /// `expected`. Returns the new balance.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the account doesn't exist.
    /// - `StoreError::BalanceConflict` if the stored balance no longer
    ///   matches `expected` (caller must re-read and resubmit).
    /// - `StoreError::InsufficientCredits` if `new` is negative; balances
    ///   are rejected, never clamped.
    fn compare_and_swap_credits(&self, user_id: &UserId, expected: i64, new: i64) -> Result<i64>;

    /// Add credits to an account unconditionally (atomic increment).
    ///
    /// Used by the compensating credit after a failed generation. Returns
    /// the new balance.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the account doesn't exist.
    fn add_credits(&self, user_id: &UserId, amount: i64) -> Result<i64>;

    // =========================================================================
    // Purchase Operations
    // =========================================================================

    /// Get a purchase by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_purchase(&self, purchase_id: &PurchaseId) -> Result<Option<Purchase>>;

    /// List purchases for a user, ordered by time (newest first).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_purchases_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Purchase>>;

    // =========================================================================
    // Settlement Operations
    // =========================================================================

    /// Look up the settled purchase for an external checkout-session id,
    /// if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_settlement(&self, external_session_id: &str) -> Result<Option<Purchase>>;

    /// Settle a purchase: credit the balance and append the purchase record
    /// atomically, exactly once per external session id.
    ///
    /// Returns the new balance after crediting.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the account doesn't exist.
    /// - `StoreError::DuplicateSettlement` if this session id was already
    ///   settled (redelivered webhook).
    fn settle_purchase(&self, purchase: &Purchase) -> Result<i64>;
}
