//! Quadratic tally.
//!
//! Per valid vote, each choice gets `sqrt(share * balance)` added to its
//! accumulator (`share` from the vote's own weights). Accumulators are squared,
//! then rescaled so they sum to the grand total of valid balances. Strategy
//! scores follow the same path and pool over the flattened matrix.
//!
//! Precondition: `balance` and strategy scores are non-negative. A negative
//! value produces NaN here; callers reject such input before tallying.
//!
//! Weights are only required to be positive. There is no upper bound, so a
//! weight larger than the number of choices is accepted as-is.

use tally_core::ballot::{Proposal, WeightMap};
use tally_core::determinism::zero_matrix;
use tally_core::normalize::{percentage_of_sum, redistribute, redistribute_matrix};
use tally_core::MethodKind;

use super::weights::{check_weight_map, weighted_slots};
use crate::{Rejection, VotingMethod};

pub struct Quadratic;

impl VotingMethod for Quadratic {
    type Selection = WeightMap;

    const KIND: MethodKind = MethodKind::Quadratic;

    fn check(selection: &WeightMap, choice_count: usize) -> Result<(), Rejection> {
        check_weight_map(selection, choice_count, |w| w > 0, Rejection::NonPositiveWeight)
    }

    fn scores(p: &Proposal<WeightMap>) -> Vec<f64> {
        let n = p.choice_count();
        let mut roots = vec![0.0; n];
        let mut grand_total = 0.0;
        for vote in Self::valid_votes(p) {
            let weights = vote.choice.weight_pool();
            for (i, w) in weighted_slots(&vote.choice, n) {
                roots[i] += (percentage_of_sum(w, &weights) * vote.balance).sqrt();
            }
            grand_total += vote.balance;
        }
        let squared: Vec<f64> = roots.iter().map(|r| r * r).collect();
        redistribute(&squared, grand_total)
    }

    fn scores_by_strategy(p: &Proposal<WeightMap>) -> Vec<Vec<f64>> {
        let n = p.choice_count();
        let mut roots = zero_matrix(n, p.strategy_count);
        let mut grand_total = 0.0;
        for vote in Self::valid_votes(p) {
            let weights = vote.choice.weight_pool();
            for (i, w) in weighted_slots(&vote.choice, n) {
                let share = percentage_of_sum(w, &weights);
                for (s, cell) in roots[i].iter_mut().enumerate() {
                    *cell += (share * vote.strategy_score(s)).sqrt();
                }
            }
            grand_total += vote.balance;
        }
        let squared: Vec<Vec<f64>> = roots
            .iter()
            .map(|row| row.iter().map(|r| r * r).collect())
            .collect();
        redistribute_matrix(&squared, grand_total)
    }
}
