//! Approval tally.
//!
//! Notes:
//! - Every approved choice receives the voter's **full** `balance` (no split),
//!   so Σ scores may exceed `scores_total`.
//! - Strict validity: one out-of-range or repeated entry invalidates the whole vote.
//! - An empty list is valid and approves nothing.

use std::collections::BTreeSet;

use tally_core::ballot::{ChoiceIndex, Proposal};
use tally_core::determinism::zero_matrix;
use tally_core::MethodKind;

use super::{in_range, slot};
use crate::{Rejection, VotingMethod};

pub struct Approval;

impl VotingMethod for Approval {
    type Selection = Vec<ChoiceIndex>;

    const KIND: MethodKind = MethodKind::Approval;

    fn check(selection: &Vec<ChoiceIndex>, choice_count: usize) -> Result<(), Rejection> {
        let mut seen = BTreeSet::new();
        for &choice in selection {
            if !in_range(choice, choice_count) {
                return Err(Rejection::OutOfRange(choice));
            }
            if !seen.insert(choice) {
                return Err(Rejection::DuplicateChoice(choice));
            }
        }
        Ok(())
    }

    fn scores(p: &Proposal<Vec<ChoiceIndex>>) -> Vec<f64> {
        let n = p.choice_count();
        let mut scores = vec![0.0; n];
        for vote in Self::valid_votes(p) {
            for &choice in &vote.choice {
                if let Some(i) = slot(choice, n) {
                    scores[i] += vote.balance;
                }
            }
        }
        scores
    }

    fn scores_by_strategy(p: &Proposal<Vec<ChoiceIndex>>) -> Vec<Vec<f64>> {
        let n = p.choice_count();
        let mut matrix = zero_matrix(n, p.strategy_count);
        for vote in Self::valid_votes(p) {
            for &choice in &vote.choice {
                if let Some(i) = slot(choice, n) {
                    for (s, cell) in matrix[i].iter_mut().enumerate() {
                        *cell += vote.strategy_score(s);
                    }
                }
            }
        }
        matrix
    }
}
