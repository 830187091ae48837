//! Key encoding utilities for `RocksDB`.
//!
//! User ids are variable-length identity-provider subjects, so user-scoped
//! index keys carry a `0x00` separator between the subject bytes and the
//! fixed-width purchase id. `UserId` construction rejects NUL bytes, which
//! keeps prefix scans from bleeding into a longer subject that shares a
//! prefix.

use pixelmint_core::{PurchaseId, UserId};

/// Separator between the user id and the purchase id in index keys.
const SEP: u8 = 0x00;

/// Create an account key from a user ID.
#[must_use]
pub fn account_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a purchase key from a purchase ID.
#[must_use]
pub fn purchase_key(purchase_id: &PurchaseId) -> Vec<u8> {
    purchase_id.to_bytes().to_vec()
}

/// Create a user-purchase index key.
///
/// Format: `user_id || 0x00 || purchase_id (16 bytes)`
///
/// Since ULIDs are time-ordered, purchases for a user sort chronologically.
#[must_use]
pub fn user_purchase_key(user_id: &UserId, purchase_id: &PurchaseId) -> Vec<u8> {
    let mut key = Vec::with_capacity(user_id.as_bytes().len() + 1 + 16);
    key.extend_from_slice(user_id.as_bytes());
    key.push(SEP);
    key.extend_from_slice(&purchase_id.to_bytes());
    key
}

/// Create a prefix for iterating all purchases for a user.
#[must_use]
pub fn user_purchases_prefix(user_id: &UserId) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(user_id.as_bytes().len() + 1);
    prefix.extend_from_slice(user_id.as_bytes());
    prefix.push(SEP);
    prefix
}

/// Extract the purchase ID from the tail of a user-purchase index key.
///
/// Returns `None` if the key is shorter than a purchase id.
#[must_use]
pub fn extract_purchase_id_from_user_key(key: &[u8]) -> Option<PurchaseId> {
    if key.len() < 16 {
        return None;
    }
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[key.len() - 16..]);
    Some(PurchaseId::from_bytes(bytes))
}

/// Create a settlement idempotency key from an external session id.
#[must_use]
pub fn settlement_key(external_session_id: &str) -> Vec<u8> {
    external_session_id.as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_purchase_key_format() {
        let user_id = UserId::new("user-a").unwrap();
        let purchase_id = PurchaseId::generate();
        let key = user_purchase_key(&user_id, &purchase_id);

        assert_eq!(&key[..6], b"user-a");
        assert_eq!(key[6], 0x00);
        assert_eq!(&key[7..], purchase_id.to_bytes());
    }

    #[test]
    fn prefix_does_not_match_longer_subject() {
        let short = UserId::new("user-1").unwrap();
        let long = UserId::new("user-12").unwrap();
        let purchase_id = PurchaseId::generate();

        let prefix = user_purchases_prefix(&short);
        let other_key = user_purchase_key(&long, &purchase_id);
        assert!(!other_key.starts_with(&prefix));
    }

    #[test]
    fn extract_purchase_id_roundtrip() {
        let user_id = UserId::generate();
        let purchase_id = PurchaseId::generate();
        let key = user_purchase_key(&user_id, &purchase_id);

        assert_eq!(
            extract_purchase_id_from_user_key(&key),
            Some(purchase_id)
        );
    }
}
