//! Image-generation provider integration.
//!
//! The provider is an opaque capability: `generate(prompt, aspect_ratio)`
//! yields an image URL or a typed failure. Rate-limit and quota errors are
//! distinguished so the API can surface specific retry guidance.

pub mod client;

pub use client::{GeneratedImage, GenerationClient, GenerationError};
