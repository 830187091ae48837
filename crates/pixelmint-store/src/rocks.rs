//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use pixelmint_core::{Account, Purchase, PurchaseId, UserId};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    // Serializes balance mutations so the conditional write in
    // `compare_and_swap_credits` is atomic with its re-read.
    balance_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            balance_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Write an account record (caller holds the balance lock).
    fn write_account(&self, account: &Account) -> Result<()> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(&account.user_id);
        let value = Self::serialize(account)?;
        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Account Operations
    // =========================================================================

    fn put_account(&self, account: &Account) -> Result<()> {
        let _guard = self
            .balance_lock
            .lock()
            .map_err(|_| StoreError::Database("balance lock poisoned".into()))?;

        self.write_account(account)
    }

    fn get_account(&self, user_id: &UserId) -> Result<Option<Account>> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(user_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn compare_and_swap_credits(&self, user_id: &UserId, expected: i64, new: i64) -> Result<i64> {
        if new < 0 {
            return Err(StoreError::InsufficientCredits {
                balance: expected,
                required: expected - new,
            });
        }

        let _guard = self
            .balance_lock
            .lock()
            .map_err(|_| StoreError::Database("balance lock poisoned".into()))?;

        let mut account = self.get_account(user_id)?.ok_or(StoreError::NotFound)?;

        if account.credits != expected {
            return Err(StoreError::BalanceConflict {
                expected,
                actual: account.credits,
            });
        }

        account.credits = new;
        account.updated_at = chrono::Utc::now();
        self.write_account(&account)?;

        Ok(account.credits)
    }

    fn add_credits(&self, user_id: &UserId, amount: i64) -> Result<i64> {
        let _guard = self
            .balance_lock
            .lock()
            .map_err(|_| StoreError::Database("balance lock poisoned".into()))?;

        let mut account = self.get_account(user_id)?.ok_or(StoreError::NotFound)?;

        account.credits += amount;
        account.updated_at = chrono::Utc::now();
        self.write_account(&account)?;

        Ok(account.credits)
    }

    // =========================================================================
    // Purchase Operations
    // =========================================================================

    fn get_purchase(&self, purchase_id: &PurchaseId) -> Result<Option<Purchase>> {
        let cf = self.cf(cf::PURCHASES)?;
        let key = keys::purchase_key(purchase_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_purchases_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Purchase>> {
        let cf_by_user = self.cf(cf::PURCHASES_BY_USER)?;
        let prefix = keys::user_purchases_prefix(user_id);

        let iter = self.db.iterator_cf(
            &cf_by_user,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        // ULIDs are time-ordered, so index order is chronological. Collect
        // the prefix range and reverse for newest-first listing.
        let mut all_keys: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            all_keys.push(key.to_vec());
        }

        all_keys.reverse();

        let mut purchases = Vec::new();
        for key in all_keys.into_iter().skip(offset) {
            if purchases.len() >= limit {
                break;
            }

            let Some(purchase_id) = keys::extract_purchase_id_from_user_key(&key) else {
                continue;
            };
            if let Some(purchase) = self.get_purchase(&purchase_id)? {
                purchases.push(purchase);
            }
        }

        Ok(purchases)
    }

    // =========================================================================
    // Settlement Operations
    // =========================================================================

    fn get_settlement(&self, external_session_id: &str) -> Result<Option<Purchase>> {
        let cf = self.cf(cf::SETTLEMENTS)?;
        let key = keys::settlement_key(external_session_id);

        let Some(purchase_id_bytes) = self
            .db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let purchase_id: PurchaseId = Self::deserialize(&purchase_id_bytes)?;
        self.get_purchase(&purchase_id)
    }

    fn settle_purchase(&self, purchase: &Purchase) -> Result<i64> {
        let _guard = self
            .balance_lock
            .lock()
            .map_err(|_| StoreError::Database("balance lock poisoned".into()))?;

        // Idempotency: at most one settlement per external session id.
        let cf_settlements = self.cf(cf::SETTLEMENTS)?;
        let settlement_key = keys::settlement_key(&purchase.external_session_id);
        let already_settled = self
            .db
            .get_cf(&cf_settlements, &settlement_key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();

        if already_settled {
            return Err(StoreError::DuplicateSettlement {
                session_id: purchase.external_session_id.clone(),
            });
        }

        let mut account = self
            .get_account(&purchase.user_id)?
            .ok_or(StoreError::NotFound)?;

        account.credits += purchase.credits_purchased;
        account.updated_at = chrono::Utc::now();

        let cf_accounts = self.cf(cf::ACCOUNTS)?;
        let cf_purchases = self.cf(cf::PURCHASES)?;
        let cf_by_user = self.cf(cf::PURCHASES_BY_USER)?;

        let account_key = keys::account_key(&purchase.user_id);
        let purchase_key = keys::purchase_key(&purchase.id);
        let user_purchase_key = keys::user_purchase_key(&purchase.user_id, &purchase.id);

        let account_value = Self::serialize(&account)?;
        let purchase_value = Self::serialize(purchase)?;
        let settlement_value = Self::serialize(&purchase.id)?;

        // Credit, audit record, index, and idempotency marker land in one
        // atomic batch.
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_accounts, &account_key, &account_value);
        batch.put_cf(&cf_purchases, &purchase_key, &purchase_value);
        batch.put_cf(&cf_by_user, &user_purchase_key, []);
        batch.put_cf(&cf_settlements, &settlement_key, &settlement_value);

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(account.credits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn account_with_credits(store: &RocksStore, credits: i64) -> UserId {
        let mut account = Account::new(UserId::generate());
        account.credits = credits;
        store.put_account(&account).unwrap();
        account.user_id
    }

    #[test]
    fn account_crud() {
        let (store, _dir) = create_test_store();
        let user_id = account_with_credits(&store, 5);

        let retrieved = store.get_account(&user_id).unwrap().unwrap();
        assert_eq!(retrieved.credits, 5);

        assert!(store.get_account(&UserId::generate()).unwrap().is_none());
    }

    #[test]
    fn cas_debit_happy_path() {
        let (store, _dir) = create_test_store();
        let user_id = account_with_credits(&store, 5);

        let balance = store.compare_and_swap_credits(&user_id, 5, 4).unwrap();
        assert_eq!(balance, 4);

        let account = store.get_account(&user_id).unwrap().unwrap();
        assert_eq!(account.credits, 4);
        assert!(account.updated_at >= account.created_at);
    }

    #[test]
    fn cas_fails_on_stale_snapshot() {
        let (store, _dir) = create_test_store();
        let user_id = account_with_credits(&store, 5);

        // Another writer moves the balance first.
        store.compare_and_swap_credits(&user_id, 5, 4).unwrap();

        let result = store.compare_and_swap_credits(&user_id, 5, 4);
        assert!(matches!(
            result,
            Err(StoreError::BalanceConflict {
                expected: 5,
                actual: 4
            })
        ));

        // The losing writer mutated nothing.
        assert_eq!(store.get_account(&user_id).unwrap().unwrap().credits, 4);
    }

    #[test]
    fn cas_rejects_negative_balance() {
        let (store, _dir) = create_test_store();
        let user_id = account_with_credits(&store, 0);

        let result = store.compare_and_swap_credits(&user_id, 0, -1);
        assert!(matches!(
            result,
            Err(StoreError::InsufficientCredits {
                balance: 0,
                required: 1
            })
        ));
        assert_eq!(store.get_account(&user_id).unwrap().unwrap().credits, 0);
    }

    #[test]
    fn concurrent_debits_of_last_credit() {
        let (store, _dir) = create_test_store();
        let store = Arc::new(store);
        let user_id = account_with_credits(&store, 1);

        // Both writers read balance=1 and race the conditional decrement.
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let store = Arc::clone(&store);
                let user_id = user_id.clone();
                std::thread::spawn(move || store.compare_and_swap_credits(&user_id, 1, 0))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let successes = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(StoreError::BalanceConflict { .. })))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 1);
        assert_eq!(store.get_account(&user_id).unwrap().unwrap().credits, 0);
    }

    #[test]
    fn debit_then_compensate_conserves_balance() {
        let (store, _dir) = create_test_store();
        let user_id = account_with_credits(&store, 5);

        store.compare_and_swap_credits(&user_id, 5, 4).unwrap();
        let balance = store.add_credits(&user_id, 1).unwrap();

        assert_eq!(balance, 5);
    }

    #[test]
    fn add_credits_requires_account() {
        let (store, _dir) = create_test_store();
        let result = store.add_credits(&UserId::generate(), 1);
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[test]
    fn settlement_credits_and_records_purchase() {
        let (store, _dir) = create_test_store();
        let user_id = account_with_credits(&store, 2);

        let purchase = Purchase::settled(
            user_id.clone(),
            "cs_test_abc".into(),
            Some("pi_test_def".into()),
            "basic".into(),
            999,
            30,
        );

        let balance = store.settle_purchase(&purchase).unwrap();
        assert_eq!(balance, 32);

        let recorded = store.get_settlement("cs_test_abc").unwrap().unwrap();
        assert_eq!(recorded.credits_purchased, 30);
        assert_eq!(recorded.pack_name, "basic");

        let listed = store.list_purchases_by_user(&user_id, 10, 0).unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[test]
    fn settlement_is_idempotent_per_session_id() {
        let (store, _dir) = create_test_store();
        let user_id = account_with_credits(&store, 2);

        let first = Purchase::settled(
            user_id.clone(),
            "cs_test_once".into(),
            None,
            "basic".into(),
            999,
            30,
        );
        store.settle_purchase(&first).unwrap();

        // Redelivery arrives with a fresh purchase id but the same session.
        let redelivered = Purchase::settled(
            user_id.clone(),
            "cs_test_once".into(),
            None,
            "basic".into(),
            999,
            30,
        );
        let result = store.settle_purchase(&redelivered);
        assert!(matches!(
            result,
            Err(StoreError::DuplicateSettlement { .. })
        ));

        // Credit applied exactly once, one purchase row.
        assert_eq!(store.get_account(&user_id).unwrap().unwrap().credits, 32);
        assert_eq!(
            store.list_purchases_by_user(&user_id, 10, 0).unwrap().len(),
            1
        );
    }

    #[test]
    fn settlement_requires_account() {
        let (store, _dir) = create_test_store();
        let purchase = Purchase::settled(
            UserId::generate(),
            "cs_test_ghost".into(),
            None,
            "starter".into(),
            499,
            10,
        );

        let result = store.settle_purchase(&purchase);
        assert!(matches!(result, Err(StoreError::NotFound)));

        // A failed settlement leaves no idempotency marker behind.
        assert!(store.get_settlement("cs_test_ghost").unwrap().is_none());
    }

    #[test]
    fn purchase_listing_is_newest_first_with_pagination() {
        let (store, _dir) = create_test_store();
        let user_id = account_with_credits(&store, 0);

        for (i, session) in ["cs_1", "cs_2", "cs_3"].iter().enumerate() {
            let purchase = Purchase::settled(
                user_id.clone(),
                (*session).to_string(),
                None,
                "starter".into(),
                499,
                10,
            );
            store.settle_purchase(&purchase).unwrap();
            if i < 2 {
                // ULIDs are generated at creation time; keep them distinct.
                std::thread::sleep(std::time::Duration::from_millis(2));
            }
        }

        let all = store.list_purchases_by_user(&user_id, 10, 0).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].external_session_id, "cs_3");
        assert_eq!(all[2].external_session_id, "cs_1");

        let page2 = store.list_purchases_by_user(&user_id, 1, 1).unwrap();
        assert_eq!(page2.len(), 1);
        assert_eq!(page2[0].external_session_id, "cs_2");
    }
}
