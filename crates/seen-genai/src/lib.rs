//! Generative-AI provider client
//!
//! Two capabilities are consumed from the provider: a synchronous
//! content-generation call (prompt plus optional inline-base64 or
//! by-reference media) and a file-staging API (create / poll status /
//! delete) for media too large to inline. Both are exposed behind traits so
//! the verification pipeline can be exercised against scripted fakes.

mod client;
mod files;

pub use client::{GenaiClient, GenerateRequest, GenerativeModel, MediaPart};
pub use files::{FileState, FileStore, GenaiFileStore, RemoteFile};

use thiserror::Error;

/// Provider operation errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response shape: {0}")]
    Decode(String),
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Request(err.to_string())
    }
}
