//! crates/tally_io/src/lib.rs
//! Minimal I/O crate for the tally engine.
//!
//! - Proposal loading with size limits and typed, pointer-annotated shape errors.
//! - Canonical JSON bytes (sorted keys) and atomic file writes.
//! - SHA-256 digests of raw input bytes and canonical result payloads.
//!
//! Offline only: URL-looking paths are rejected before touching the filesystem.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for tally_io (loader/canonical_json/hasher).
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, read, create_dir_all, rename, fsync).
    #[error("io/path error: {0}")]
    Path(String),

    /// Input exceeded a configured limit.
    #[error("limit exceeded: {0}")]
    Limit(String),

    /// JSON syntax/serialization errors with a JSON Pointer.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Well-formed JSON with the wrong shape for a proposal.
    #[error("unexpected shape at {pointer}: {msg}")]
    Shape { pointer: String, msg: String },

    /// Hashing-related errors.
    #[error("hash error: {0}")]
    Hash(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps no pointer; callers enrich where they can.
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}

impl From<hasher::HashError> for IoError {
    fn from(e: hasher::HashError) -> Self {
        IoError::Hash(e.to_string())
    }
}

/// Returns true if `s` looks like a URL (any `<scheme>://`, including `file://`).
#[inline]
pub fn looks_like_url_strict(s: &str) -> bool {
    s.trim().contains("://")
}

pub mod canonical_json;
pub mod hasher;
pub mod loader;
