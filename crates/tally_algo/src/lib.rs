// crates/tally_algo/src/lib.rs
#![forbid(unsafe_code)]

use core::fmt;

pub use tally_core::{
    ballot::{ChoiceIndex, Proposal, Vote, WeightMap},
    MethodKind,
};
use tally_core::determinism::ordered_sum;

// ----------------------------- Rejections --------------------------------------------

/// Why a vote fails its method's validity predicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// A selected choice is outside `[1, choice_count]`.
    OutOfRange(ChoiceIndex),
    /// An approval list names the same choice twice.
    DuplicateChoice(ChoiceIndex),
    /// A weight map with no entries.
    EmptySelection,
    /// A weight-map key that does not parse as an integer.
    BadKey(String),
    /// Weighted: weight below zero.
    NegativeWeight(ChoiceIndex),
    /// Quadratic: weight zero or below.
    NonPositiveWeight(ChoiceIndex),
}

impl Rejection {
    /// Stable snake_case code for reports.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::OutOfRange(_) => "out_of_range",
            Rejection::DuplicateChoice(_) => "duplicate_choice",
            Rejection::EmptySelection => "empty_selection",
            Rejection::BadKey(_) => "bad_key",
            Rejection::NegativeWeight(_) => "negative_weight",
            Rejection::NonPositiveWeight(_) => "non_positive_weight",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::OutOfRange(c) => write!(f, "choice {c} is out of range"),
            Rejection::DuplicateChoice(c) => write!(f, "choice {c} selected more than once"),
            Rejection::EmptySelection => write!(f, "no choices selected"),
            Rejection::BadKey(k) => write!(f, "choice key {k:?} is not an integer"),
            Rejection::NegativeWeight(c) => write!(f, "choice {c} has a negative weight"),
            Rejection::NonPositiveWeight(c) => write!(f, "choice {c} needs a weight above zero"),
        }
    }
}

// ----------------------------- Method contract ---------------------------------------

/// Contract shared by the four voting methods.
///
/// All functions are pure: nothing is cached, the input is never mutated, and
/// calling any of them twice on the same proposal yields identical results.
/// Invalid votes contribute nothing to any output.
pub trait VotingMethod {
    /// Shape of `Vote::choice` for this method.
    type Selection;

    const KIND: MethodKind;

    /// Validity predicate with the reason for rejection.
    fn check(selection: &Self::Selection, choice_count: usize) -> Result<(), Rejection>;

    fn is_valid(selection: &Self::Selection, choice_count: usize) -> bool {
        Self::check(selection, choice_count).is_ok()
    }

    /// Valid votes, in input order.
    fn valid_votes(p: &Proposal<Self::Selection>) -> Vec<&Vote<Self::Selection>> {
        let n = p.choice_count();
        p.votes.iter().filter(|v| Self::is_valid(&v.choice, n)).collect()
    }

    /// 0-based input positions of the valid votes.
    fn valid_vote_positions(p: &Proposal<Self::Selection>) -> Vec<usize> {
        let n = p.choice_count();
        p.votes
            .iter()
            .enumerate()
            .filter(|(_, v)| Self::is_valid(&v.choice, n))
            .map(|(i, _)| i)
            .collect()
    }

    /// Σ balance over valid votes.
    fn scores_total(p: &Proposal<Self::Selection>) -> f64 {
        ordered_sum(Self::valid_votes(p).iter().map(|v| v.balance))
    }

    /// One score per choice, in choice order.
    fn scores(p: &Proposal<Self::Selection>) -> Vec<f64>;

    /// `choice_count × strategy_count` matrix.
    fn scores_by_strategy(p: &Proposal<Self::Selection>) -> Vec<Vec<f64>>;
}

// ----------------------------- Outcome -----------------------------------------------

/// Everything a method reports for one proposal.
#[derive(Clone, Debug, PartialEq)]
pub struct TallyOutcome {
    pub method: MethodKind,
    pub valid_votes: Vec<usize>,
    pub scores_total: f64,
    pub scores: Vec<f64>,
    pub scores_by_strategy: Vec<Vec<f64>>,
}

/// Run every accessor of `M` over `p`.
pub fn tabulate<M: VotingMethod>(p: &Proposal<M::Selection>) -> TallyOutcome {
    TallyOutcome {
        method: M::KIND,
        valid_votes: M::valid_vote_positions(p),
        scores_total: M::scores_total(p),
        scores: M::scores(p),
        scores_by_strategy: M::scores_by_strategy(p),
    }
}

// ----------------------------- Tabulation (public surface) ---------------------------

pub mod tabulation {
    pub mod approval;
    pub mod quadratic;
    pub mod single_choice;
    pub mod weighted;

    mod weights;

    pub use approval::Approval;
    pub use quadratic::Quadratic;
    pub use single_choice::SingleChoice;
    pub use weighted::Weighted;

    use tally_core::ballot::ChoiceIndex;

    /// `1 <= choice <= choice_count`.
    #[inline]
    pub(crate) fn in_range(choice: ChoiceIndex, choice_count: usize) -> bool {
        choice >= 1 && usize::try_from(choice).map_or(false, |c| c <= choice_count)
    }

    /// 0-based accumulator slot for a 1-based choice, if in range.
    #[inline]
    pub(crate) fn slot(choice: ChoiceIndex, choice_count: usize) -> Option<usize> {
        in_range(choice, choice_count).then(|| (choice - 1) as usize)
    }
}

pub use tabulation::{Approval, Quadratic, SingleChoice, Weighted};

#[cfg(test)]
pub(crate) mod testutil {
    use tally_core::normalize::approx_eq;

    pub fn choices(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Choice {i}")).collect()
    }

    pub fn assert_close(got: &[f64], want: &[f64]) {
        assert_eq!(got.len(), want.len(), "length: got {got:?}, want {want:?}");
        for (i, (g, w)) in got.iter().zip(want).enumerate() {
            assert!(approx_eq(*g, *w), "index {i}: got {g}, want {w}");
        }
    }

    pub fn assert_close_matrix(got: &[Vec<f64>], want: &[Vec<f64>]) {
        assert_eq!(got.len(), want.len(), "rows: got {got:?}, want {want:?}");
        for (g, w) in got.iter().zip(want) {
            assert_close(g, w);
        }
    }
}
