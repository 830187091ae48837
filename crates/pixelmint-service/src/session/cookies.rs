//! Cookie chunking codec and attribute rendering.
//!
//! Browsers cap individual cookie values around 4KB, and session payloads
//! (token JSON) can exceed that. Values over [`CHUNK_SIZE`] are split into
//! ordered sub-cookies `key.0`, `key.1`, ... and reassembled by
//! concatenation in index order on read, stopping at the first missing
//! index. Values at or under the threshold are stored under the bare key.

use std::collections::HashMap;

/// Maximum bytes stored in a single cookie value before chunking applies.
pub const CHUNK_SIZE: usize = 3180;

/// Cookie lifetime: one year, in seconds.
const MAX_AGE_SECONDS: u64 = 60 * 60 * 24 * 365;

/// Split a value into its cookie representation.
///
/// Returns `[(key, value)]` for short values, or
/// `[(key.0, ..), (key.1, ..), ...]` for values over the threshold. Chunk
/// boundaries back off to the previous character boundary so every chunk is
/// valid UTF-8 and concatenation reproduces the value byte for byte.
#[must_use]
pub fn encode_chunks(key: &str, value: &str) -> Vec<(String, String)> {
    if value.len() <= CHUNK_SIZE {
        return vec![(key.to_string(), value.to_string())];
    }

    let mut chunks = Vec::with_capacity(value.len() / CHUNK_SIZE + 1);
    let mut start = 0;

    while start < value.len() {
        let mut end = usize::min(start + CHUNK_SIZE, value.len());
        while !value.is_char_boundary(end) {
            end -= 1;
        }

        chunks.push((format!("{key}.{}", chunks.len()), value[start..end].to_string()));
        start = end;
    }

    chunks
}

/// Reassemble a possibly-chunked value from a cookie map.
///
/// Prefers an exact match under `key`; otherwise concatenates `key.0`,
/// `key.1`, ... in index order, stopping at the first missing index.
/// Returns `None` when neither form exists.
#[must_use]
pub fn assemble_chunks(cookies: &HashMap<String, String>, key: &str) -> Option<String> {
    if let Some(value) = cookies.get(key) {
        return Some(value.clone());
    }

    let mut value = String::new();
    let mut index = 0usize;

    while let Some(chunk) = cookies.get(&format!("{key}.{index}")) {
        value.push_str(chunk);
        index += 1;
    }

    if index == 0 {
        None
    } else {
        Some(value)
    }
}

/// Read the session value, preferring the identity provider's native cookie
/// key and falling back to the shared key.
#[must_use]
pub fn read_session_value(
    cookies: &HashMap<String, String>,
    provider_key: &str,
    shared_key: &str,
) -> Option<String> {
    assemble_chunks(cookies, provider_key).or_else(|| assemble_chunks(cookies, shared_key))
}

/// Render a `Set-Cookie` header value with the fixed session attributes:
/// shared parent domain, path `/`, `SameSite=Lax`, `Secure`, one-year
/// max age.
#[must_use]
pub fn set_cookie_header(name: &str, value: &str, domain: &str) -> String {
    format!(
        "{name}={value}; Domain={domain}; Path=/; Max-Age={MAX_AGE_SECONDS}; SameSite=Lax; Secure"
    )
}
