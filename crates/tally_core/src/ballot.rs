//! Votes, selection shapes, and the per-proposal input bundle.
//!
//! - A `Vote<S>` is immutable input: one voter's selection plus their voting
//!   power (`balance`) and per-strategy power breakdown (`scores`).
//! - Choice indices are 1-based on the wire; `0` and negatives stay
//!   representable so validation can reject them.
//! - Weighted/quadratic selections keep their keys as strings; keys are parsed
//!   to integers at use.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::method::MethodKind;

/// 1-based choice position as cast.
pub type ChoiceIndex = i64;

/// One cast vote.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vote<S> {
    pub choice: S,
    pub balance: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub scores: Vec<f64>,
}

impl<S> Vote<S> {
    pub fn new(choice: S, balance: f64, scores: Vec<f64>) -> Self {
        Self { choice, balance, scores }
    }

    /// Strategy score at `s`; entries missing from `scores` count as zero.
    #[inline]
    pub fn strategy_score(&self, s: usize) -> f64 {
        self.scores.get(s).copied().unwrap_or(0.0)
    }
}

/// Parse a weight-map key into a choice index.
pub fn parse_choice_key(key: &str) -> Result<ChoiceIndex, CoreError> {
    key.parse::<ChoiceIndex>()
        .map_err(|_| CoreError::InvalidChoiceKey(key.to_string()))
}

/// `choice key → weight` selection used by weighted and quadratic voting.
///
/// Iteration order is key order; results never depend on it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct WeightMap(BTreeMap<String, i64>);

impl WeightMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build from `(key, weight)` pairs; integer keys are stored as their decimal string.
    pub fn from_pairs<K: ToString>(pairs: impl IntoIterator<Item = (K, i64)>) -> Self {
        Self(pairs.into_iter().map(|(k, w)| (k.to_string(), w)).collect())
    }

    pub fn insert(&mut self, key: impl Into<String>, weight: i64) -> Option<i64> {
        self.0.insert(key.into(), weight)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.0.iter().map(|(k, w)| (k.as_str(), *w))
    }

    pub fn weights(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.values().copied()
    }

    /// Weights as floats, in iteration order (the pool for per-vote shares).
    pub fn weight_pool(&self) -> Vec<f64> {
        self.weights().map(|w| w as f64).collect()
    }
}

/// Everything one method needs to tally a proposal.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Proposal<S> {
    pub choices: Vec<String>,
    pub votes: Vec<Vote<S>>,
    /// Only the number of strategies matters to the tally.
    pub strategy_count: usize,
}

impl<S> Proposal<S> {
    pub fn new(choices: Vec<String>, votes: Vec<Vote<S>>, strategy_count: usize) -> Self {
        Self { choices, votes, strategy_count }
    }

    #[inline]
    pub fn choice_count(&self) -> usize {
        self.choices.len()
    }
}

/// A proposal tagged with its selection shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Ballots {
    SingleChoice(Proposal<ChoiceIndex>),
    Approval(Proposal<Vec<ChoiceIndex>>),
    Weighted(Proposal<WeightMap>),
    Quadratic(Proposal<WeightMap>),
}

impl Ballots {
    pub fn method(&self) -> MethodKind {
        match self {
            Ballots::SingleChoice(_) => MethodKind::SingleChoice,
            Ballots::Approval(_) => MethodKind::Approval,
            Ballots::Weighted(_) => MethodKind::Weighted,
            Ballots::Quadratic(_) => MethodKind::Quadratic,
        }
    }

    pub fn choices(&self) -> &[String] {
        match self {
            Ballots::SingleChoice(p) => &p.choices,
            Ballots::Approval(p) => &p.choices,
            Ballots::Weighted(p) | Ballots::Quadratic(p) => &p.choices,
        }
    }

    pub fn strategy_count(&self) -> usize {
        match self {
            Ballots::SingleChoice(p) => p.strategy_count,
            Ballots::Approval(p) => p.strategy_count,
            Ballots::Weighted(p) | Ballots::Quadratic(p) => p.strategy_count,
        }
    }

    pub fn vote_count(&self) -> usize {
        match self {
            Ballots::SingleChoice(p) => p.votes.len(),
            Ballots::Approval(p) => p.votes.len(),
            Ballots::Weighted(p) | Ballots::Quadratic(p) => p.votes.len(),
        }
    }

    /// `(balance, scores)` per vote in input order, independent of selection shape.
    pub fn vote_powers(&self) -> Vec<(f64, &[f64])> {
        fn rows<S>(p: &Proposal<S>) -> Vec<(f64, &[f64])> {
            p.votes.iter().map(|v| (v.balance, v.scores.as_slice())).collect()
        }
        match self {
            Ballots::SingleChoice(p) => rows(p),
            Ballots::Approval(p) => rows(p),
            Ballots::Weighted(p) | Ballots::Quadratic(p) => rows(p),
        }
    }
}
