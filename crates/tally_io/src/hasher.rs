//! crates/tally_io/src/hasher.rs
//!
//! Deterministic hashing and ID builders.
//!
//! - Use `sha256_canonical(..)` for JSON **values/structs** (goes through canonical_json).
//! - Use `sha256_hex(..)` for **raw bytes** (the proposal file as read).
//! - Hex digests are lowercase; result ids are `TLY:<hex>`.

#![forbid(unsafe_code)]

use serde::Serialize;
use sha2::{Digest, Sha256 as Sha256Hasher};
use thiserror::Error;

use tally_core::ids::{Sha256, TallyId};

use crate::canonical_json::to_canonical_bytes;

#[derive(Error, Debug)]
pub enum HashError {
    #[error("canonicalization error: {0}")]
    Canonical(String),

    #[error("invalid hex (expected lowercase 64-hex): {0}")]
    InvalidHex(String),
}

/// SHA-256 over raw bytes, lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256Hasher::digest(bytes))
}

/// Typed digest of raw bytes.
pub fn sha256_digest(bytes: &[u8]) -> Result<Sha256, HashError> {
    let hex = sha256_hex(bytes);
    hex.parse().map_err(|_| HashError::InvalidHex(hex))
}

/// SHA-256 over **canonical JSON bytes** of any serializable value.
pub fn sha256_canonical<T: Serialize>(value: &T) -> Result<String, HashError> {
    let bytes = to_canonical_bytes(value).map_err(|e| HashError::Canonical(e.to_string()))?;
    Ok(sha256_hex(&bytes))
}

/// `TLY:<hex>` id for a result payload derived from its canonical bytes.
pub fn tally_id_from_canonical<T: Serialize>(value: &T) -> Result<TallyId, HashError> {
    let hex = sha256_canonical(value)?;
    let digest: Sha256 = hex.parse().map_err(|_| HashError::InvalidHex(hex.clone()))?;
    Ok(TallyId::from_digest(&digest))
}
