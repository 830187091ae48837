//! Payment provider integration.
//!
//! The payment provider handles:
//! - Hosted checkout sessions for credit-pack purchases
//! - Signed webhooks confirming settlement

pub mod client;
pub mod types;

pub use client::{PaymentClient, PaymentError};
pub use types::{CheckoutSession, ProviderErrorResponse};
