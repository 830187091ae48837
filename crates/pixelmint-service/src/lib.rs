//! Pixelmint HTTP API Service.
//!
//! This crate provides the HTTP API for the pixelmint storefront,
//! including:
//!
//! - Image generation gated by the credit debit protocol
//! - Credit-pack checkout initiation
//! - Payment webhook settlement with per-session idempotency
//! - The OAuth session bridge (code exchange + chunked cookies)
//! - Balance and purchase-history readback
//!
//! # Authentication
//!
//! End-user requests carry an identity-provider JWT bearer token. The
//! generation endpoint additionally serves anonymous requests (no
//! `Authorization` header) through a free provider-direct path with no
//! ledger interaction.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers need async for routing consistency

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod generation;
pub mod handlers;
pub mod identity;
pub mod payments;
pub mod routes;
pub mod session;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use generation::{GenerationClient, GenerationError};
pub use identity::{IdentityClient, IdentityError};
pub use payments::{PaymentClient, PaymentError};
pub use routes::create_router;
pub use state::AppState;
