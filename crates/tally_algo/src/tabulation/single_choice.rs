//! Single-choice tally.
//!
//! - Each valid vote puts its whole `balance` on one choice, and each strategy
//!   score on that choice's strategy cell.
//! - Valid iff `1 <= choice <= choice_count`.
//! - `scores_total` sums `balance` over **all** cast votes, invalid ones
//!   included. The other methods total valid votes only.

use tally_core::ballot::{ChoiceIndex, Proposal};
use tally_core::determinism::{ordered_sum, zero_matrix};
use tally_core::MethodKind;

use super::{in_range, slot};
use crate::{Rejection, VotingMethod};

pub struct SingleChoice;

impl VotingMethod for SingleChoice {
    type Selection = ChoiceIndex;

    const KIND: MethodKind = MethodKind::SingleChoice;

    fn check(choice: &ChoiceIndex, choice_count: usize) -> Result<(), Rejection> {
        if in_range(*choice, choice_count) {
            Ok(())
        } else {
            Err(Rejection::OutOfRange(*choice))
        }
    }

    fn scores_total(p: &Proposal<ChoiceIndex>) -> f64 {
        ordered_sum(p.votes.iter().map(|v| v.balance))
    }

    fn scores(p: &Proposal<ChoiceIndex>) -> Vec<f64> {
        let n = p.choice_count();
        let mut scores = vec![0.0; n];
        for vote in Self::valid_votes(p) {
            if let Some(i) = slot(vote.choice, n) {
                scores[i] += vote.balance;
            }
        }
        scores
    }

    fn scores_by_strategy(p: &Proposal<ChoiceIndex>) -> Vec<Vec<f64>> {
        let n = p.choice_count();
        let mut matrix = zero_matrix(n, p.strategy_count);
        for vote in Self::valid_votes(p) {
            if let Some(i) = slot(vote.choice, n) {
                for (s, cell) in matrix[i].iter_mut().enumerate() {
                    *cell += vote.strategy_score(s);
                }
            }
        }
        matrix
    }
}
