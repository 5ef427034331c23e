//! build_result.rs
//! Assemble the canonical Result artifact from a tally outcome: check its
//! shape, hash the idless payload into `TLY:<hex>`, and return the document.

use serde::{Deserialize, Serialize};

use tally_algo::TallyOutcome;
use tally_core::MethodKind;
use tally_io::{hasher, loader::LoadedProposal};

use crate::EngineMeta;

/// ---------- Errors specific to building a Result ----------
#[derive(Debug, thiserror::Error)]
pub enum BuildResultError {
    #[error("result shape: {0}")]
    Shape(String),
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
    #[error("hash: {0}")]
    Hash(String),
}

/// Canonical result document (`result.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDoc {
    /// "TLY:<hex64>" over the canonical bytes of every other field.
    pub id: String,
    pub method: MethodKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub choices: Vec<String>,
    pub strategy_count: usize,
    pub votes_cast: usize,
    pub votes_valid: usize,
    /// 0-based positions of the valid votes in the input.
    pub valid_votes: Vec<usize>,
    pub scores_total: f64,
    pub scores: Vec<f64>,
    pub scores_by_strategy: Vec<Vec<f64>>,
    pub input_sha256: String,
    pub engine: EngineMeta,
}

/// Idless shape used for hashing; field names match `ResultDoc`.
#[derive(Serialize)]
struct ResultNoId<'a> {
    method: MethodKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    choices: &'a [String],
    strategy_count: usize,
    votes_cast: usize,
    votes_valid: usize,
    valid_votes: &'a [usize],
    scores_total: f64,
    scores: &'a [f64],
    scores_by_strategy: &'a [Vec<f64>],
    input_sha256: &'a str,
    engine: &'a EngineMeta,
}

pub fn build_result(
    loaded: &LoadedProposal,
    outcome: &TallyOutcome,
    engine: EngineMeta,
) -> Result<ResultDoc, BuildResultError> {
    let choices = loaded.ballots.choices();
    let strategy_count = loaded.ballots.strategy_count();
    check_shape(outcome, choices.len(), strategy_count)?;

    let no_id = ResultNoId {
        method: outcome.method,
        title: loaded.title.as_deref(),
        choices,
        strategy_count,
        votes_cast: loaded.ballots.vote_count(),
        votes_valid: outcome.valid_votes.len(),
        valid_votes: &outcome.valid_votes,
        scores_total: outcome.scores_total,
        scores: &outcome.scores,
        scores_by_strategy: &outcome.scores_by_strategy,
        input_sha256: loaded.input_sha256.as_str(),
        engine: &engine,
    };
    let id = hasher::tally_id_from_canonical(&no_id)
        .map_err(|e| BuildResultError::Hash(e.to_string()))?;

    Ok(ResultDoc {
        id: id.to_string(),
        method: outcome.method,
        title: loaded.title.clone(),
        choices: choices.to_vec(),
        strategy_count,
        votes_cast: no_id.votes_cast,
        votes_valid: no_id.votes_valid,
        valid_votes: outcome.valid_votes.clone(),
        scores_total: outcome.scores_total,
        scores: outcome.scores.clone(),
        scores_by_strategy: outcome.scores_by_strategy.clone(),
        input_sha256: loaded.input_sha256.to_string(),
        engine,
    })
}

/// Lengths must match the choice/strategy counts and every number must be finite.
pub fn check_shape(
    outcome: &TallyOutcome,
    choice_count: usize,
    strategy_count: usize,
) -> Result<(), BuildResultError> {
    if outcome.scores.len() != choice_count {
        return Err(BuildResultError::Shape(format!(
            "{} scores for {choice_count} choices",
            outcome.scores.len()
        )));
    }
    if outcome.scores_by_strategy.len() != choice_count
        || outcome.scores_by_strategy.iter().any(|r| r.len() != strategy_count)
    {
        return Err(BuildResultError::Shape(format!(
            "scores_by_strategy is not {choice_count}×{strategy_count}"
        )));
    }
    if !outcome.scores_total.is_finite() {
        return Err(BuildResultError::NonFinite("scores_total"));
    }
    if outcome.scores.iter().any(|s| !s.is_finite()) {
        return Err(BuildResultError::NonFinite("scores"));
    }
    if outcome.scores_by_strategy.iter().flatten().any(|s| !s.is_finite()) {
        return Err(BuildResultError::NonFinite("scores_by_strategy"));
    }
    Ok(())
}
