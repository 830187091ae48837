//! Identity provider integration.
//!
//! Bearer-token validation happens locally in `auth` against the provider's
//! public key; this module holds the client used by the session bridge to
//! exchange an authorization code for a session.

pub mod client;

pub use client::{IdentityClient, IdentityError, SessionTokens};
