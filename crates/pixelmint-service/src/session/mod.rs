//! Session bridge: cookie persistence shared across subdomains.
//!
//! The chunking codec is a pure function pair, testable without any HTTP
//! transport; the auth-callback handler applies it when writing `Set-Cookie`
//! headers.

pub mod cookies;

pub use cookies::{assemble_chunks, encode_chunks, read_session_value, set_cookie_header};
