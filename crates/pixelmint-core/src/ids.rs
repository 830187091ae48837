//! Identifier types for pixelmint.
//!
//! This module provides strongly-typed identifiers for users and purchases.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Error type for identifier parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The user id was empty or whitespace.
    #[error("user id must be a non-empty string")]
    EmptyUserId,

    /// The user id contained a NUL byte, which the store reserves as a key
    /// separator.
    #[error("user id must not contain NUL bytes")]
    NulInUserId,

    /// The ULID string was malformed.
    #[error("invalid ULID")]
    InvalidUlid,
}

/// A user identifier: the opaque subject claim issued by the identity
/// provider.
///
/// The identity provider owns the format; pixelmint only requires the
/// subject to be non-empty and treats it as the account's primary key.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a `UserId` from an identity-provider subject.
    ///
    /// # Errors
    ///
    /// Returns `IdError::EmptyUserId` if the subject is empty after
    /// trimming, or `IdError::NulInUserId` if it contains a NUL byte
    /// (reserved as the store's key separator).
    pub fn new(subject: impl Into<String>) -> Result<Self, IdError> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(IdError::EmptyUserId);
        }
        if subject.contains('\0') {
            return Err(IdError::NulInUserId);
        }
        Ok(Self(subject))
    }

    /// Generate a random `UserId` (for testing).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Return the subject as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the bytes of the subject.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl AsRef<[u8]> for UserId {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// A purchase identifier using ULID for time-ordering.
///
/// Purchase IDs are time-ordered so per-user history listings come back in
/// chronological order without a secondary sort key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PurchaseId(Ulid);

impl PurchaseId {
    /// Generate a new `PurchaseId` with the current timestamp.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Return the underlying ULID.
    #[must_use]
    pub const fn as_ulid(&self) -> &Ulid {
        &self.0
    }

    /// Return the bytes of the ULID (16 bytes).
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 16] {
        self.0.to_bytes()
    }

    /// Create a `PurchaseId` from bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Ulid::from_bytes(bytes))
    }
}

impl FromStr for PurchaseId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ulid = Ulid::from_string(s).map_err(|_| IdError::InvalidUlid)?;
        Ok(Self(ulid))
    }
}

impl fmt::Debug for PurchaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PurchaseId({})", self.0)
    }
}

impl fmt::Display for PurchaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PurchaseId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PurchaseId> for String {
    fn from(id: PurchaseId) -> Self {
        id.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_rejects_empty() {
        assert_eq!(UserId::new(""), Err(IdError::EmptyUserId));
        assert_eq!(UserId::new("   "), Err(IdError::EmptyUserId));
    }

    #[test]
    fn user_id_rejects_nul_bytes() {
        // NUL is the store's key separator; a subject carrying one could
        // alias another user's index prefix.
        assert_eq!(UserId::new("a\0x"), Err(IdError::NulInUserId));
        assert_eq!(UserId::new("\0"), Err(IdError::NulInUserId));
    }

    #[test]
    fn user_id_roundtrips_through_string() {
        let id = UserId::new("auth0|abc123").unwrap();
        let s: String = id.clone().into();
        assert_eq!(s, "auth0|abc123");
        assert_eq!(s.parse::<UserId>().unwrap(), id);
    }

    #[test]
    fn purchase_ids_are_time_ordered() {
        let a = PurchaseId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = PurchaseId::generate();
        assert!(a.to_bytes() < b.to_bytes());
    }

    #[test]
    fn purchase_id_byte_roundtrip() {
        let id = PurchaseId::generate();
        assert_eq!(PurchaseId::from_bytes(id.to_bytes()), id);
    }
}
