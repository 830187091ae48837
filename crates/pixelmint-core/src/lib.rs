//! Core domain types for pixelmint.
//!
//! This crate defines the credit ledger's entities: accounts, the static
//! credit-pack catalog, settled purchase records, and the identifier and
//! aspect-ratio types shared by the store and service crates. It performs
//! no I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod aspect;
pub mod catalog;
pub mod ids;
pub mod purchase;

pub use account::{Account, SIGNUP_GRANT_CREDITS};
pub use aspect::AspectRatio;
pub use catalog::{find_pack, CreditPack, CATALOG};
pub use ids::{IdError, PurchaseId, UserId};
pub use purchase::{Purchase, PurchaseStatus};
