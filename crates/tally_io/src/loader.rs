//! Loader: read one local proposal JSON, type-check it against its voting
//! method, and return a `LoadedProposal` for the pipeline. No network I/O.
//!
//! Wire shape:
//! ```json
//! { "type": "weighted", "title": "…", "choices": ["A", "B"],
//!   "strategies": [{…}, {…}],
//!   "votes": [{ "choice": {"1": 3, "2": 1}, "balance": 2.5, "scores": [1.5, 1.0] }] }
//! ```
//! - `choice` is an integer (single-choice), an integer array (approval), or an
//!   object of integer weights keyed by choice (weighted/quadratic). Range and
//!   key checks are left to the tally layer so invalid votes stay countable.
//! - `strategies` entries are opaque; only their count is used.
//! - `scores` defaults to `[]`.

#![forbid(unsafe_code)]

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use tally_core::ballot::{Ballots, Proposal, Vote};
use tally_core::ids::Sha256;
use tally_core::MethodKind;

use crate::{hasher, looks_like_url_strict, IoError, IoResult};

/// Hard cap on input size.
pub const MAX_INPUT_BYTES: u64 = 64 * 1024 * 1024;

/// A parsed proposal plus the digest of the exact bytes it came from.
#[derive(Debug, Clone)]
pub struct LoadedProposal {
    pub title: Option<String>,
    pub ballots: Ballots,
    pub input_sha256: Sha256,
}

impl LoadedProposal {
    pub fn method(&self) -> MethodKind {
        self.ballots.method()
    }
}

#[derive(Deserialize)]
struct RawProposal {
    #[serde(rename = "type", alias = "method", default)]
    method: Option<String>,
    #[serde(default)]
    title: Option<String>,
    choices: Vec<String>,
    #[serde(default)]
    strategies: Vec<Value>,
    votes: Vec<Value>,
}

// ----------------------------- Entry points -----------------------------

/// Load a proposal from a local file. `method_override` wins over the file's `type`.
pub fn load_proposal(path: &Path, method_override: Option<MethodKind>) -> IoResult<LoadedProposal> {
    if looks_like_url_strict(&path.to_string_lossy()) {
        return Err(IoError::Path(format!("refusing non-local path: {}", path.display())));
    }
    let bytes = read_bytes_with_limit(path, MAX_INPUT_BYTES)?;
    parse_proposal_bytes(&bytes, method_override)
}

/// Parse proposal bytes; the digest covers `bytes` exactly.
pub fn parse_proposal_bytes(bytes: &[u8], method_override: Option<MethodKind>) -> IoResult<LoadedProposal> {
    let input_sha256 = hasher::sha256_digest(bytes)?;
    let v: Value = serde_json::from_slice(bytes)?;
    let (title, ballots) = proposal_from_value(v, method_override)?;
    Ok(LoadedProposal { title, ballots, input_sha256 })
}

/// Type-check a parsed document into tagged ballots.
pub fn proposal_from_value(
    v: Value,
    method_override: Option<MethodKind>,
) -> IoResult<(Option<String>, Ballots)> {
    let raw: RawProposal = serde_json::from_value(v).map_err(|e| shape("/", e))?;

    let method = match (method_override, raw.method.as_deref()) {
        (Some(m), _) => m,
        (None, Some(token)) => token.parse().map_err(|e| shape("/type", e))?,
        (None, None) => return Err(shape("/type", "missing voting method")),
    };

    let choices = raw.choices;
    let strategy_count = raw.strategies.len();
    let votes = raw.votes;

    let ballots = match method {
        MethodKind::SingleChoice => {
            Ballots::SingleChoice(Proposal::new(choices, typed_votes(votes)?, strategy_count))
        }
        MethodKind::Approval => {
            Ballots::Approval(Proposal::new(choices, typed_votes(votes)?, strategy_count))
        }
        MethodKind::Weighted => {
            Ballots::Weighted(Proposal::new(choices, typed_votes(votes)?, strategy_count))
        }
        MethodKind::Quadratic => {
            Ballots::Quadratic(Proposal::new(choices, typed_votes(votes)?, strategy_count))
        }
    };
    Ok((raw.title, ballots))
}

// ----------------------------- Helpers -----------------------------

fn typed_votes<S: DeserializeOwned>(votes: Vec<Value>) -> IoResult<Vec<Vote<S>>> {
    votes
        .into_iter()
        .enumerate()
        .map(|(i, v)| serde_json::from_value(v).map_err(|e| shape(&format!("/votes/{i}"), e)))
        .collect()
}

fn shape(pointer: &str, msg: impl ToString) -> IoError {
    IoError::Shape { pointer: pointer.to_string(), msg: msg.to_string() }
}

/// Read at most `limit` bytes; larger files are an error, not a truncation.
pub fn read_bytes_with_limit(path: &Path, limit: u64) -> IoResult<Vec<u8>> {
    let f = File::open(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let mut buf = Vec::new();
    f.take(limit + 1).read_to_end(&mut buf)?;
    if buf.len() as u64 > limit {
        return Err(IoError::Limit(format!(
            "{} exceeds {limit} bytes",
            path.display()
        )));
    }
    Ok(buf)
}
