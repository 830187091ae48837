//! HTTP request handlers.

pub mod accounts;
pub mod checkout;
pub mod generate;
pub mod health;
pub mod session;
pub mod webhooks;
