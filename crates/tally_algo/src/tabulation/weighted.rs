//! Weighted tally.
//!
//! Each valid vote splits its `balance` (and each strategy score) across the
//! selected choices in proportion to the weights. The accumulated pool is then
//! rescaled so it sums to the grand total of valid balances:
//! - per-choice scores against the per-choice pool;
//! - strategy scores against the flattened `choice × strategy` pool.
//!
//! A vote whose weights are all zero is valid and contributes nothing.

use tally_core::ballot::{Proposal, WeightMap};
use tally_core::determinism::zero_matrix;
use tally_core::normalize::{percentage_of_sum, redistribute, redistribute_matrix};
use tally_core::MethodKind;

use super::weights::{check_weight_map, weighted_slots};
use crate::{Rejection, VotingMethod};

pub struct Weighted;

impl VotingMethod for Weighted {
    type Selection = WeightMap;

    const KIND: MethodKind = MethodKind::Weighted;

    fn check(selection: &WeightMap, choice_count: usize) -> Result<(), Rejection> {
        check_weight_map(selection, choice_count, |w| w >= 0, Rejection::NegativeWeight)
    }

    fn scores(p: &Proposal<WeightMap>) -> Vec<f64> {
        let n = p.choice_count();
        let mut pool = vec![0.0; n];
        let mut grand_total = 0.0;
        for vote in Self::valid_votes(p) {
            let weights = vote.choice.weight_pool();
            for (i, w) in weighted_slots(&vote.choice, n) {
                pool[i] += percentage_of_sum(w, &weights) * vote.balance;
            }
            grand_total += vote.balance;
        }
        redistribute(&pool, grand_total)
    }

    fn scores_by_strategy(p: &Proposal<WeightMap>) -> Vec<Vec<f64>> {
        let n = p.choice_count();
        let mut pool = zero_matrix(n, p.strategy_count);
        let mut grand_total = 0.0;
        for vote in Self::valid_votes(p) {
            let weights = vote.choice.weight_pool();
            for (i, w) in weighted_slots(&vote.choice, n) {
                let share = percentage_of_sum(w, &weights);
                for (s, cell) in pool[i].iter_mut().enumerate() {
                    *cell += share * vote.strategy_score(s);
                }
            }
            grand_total += vote.balance;
        }
        redistribute_matrix(&pool, grand_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assert_close, assert_close_matrix, choices};
    use tally_core::ballot::Vote;
    use tally_core::normalize::approx_eq;

    fn wm(pairs: &[(i64, i64)]) -> WeightMap {
        WeightMap::from_pairs(pairs.iter().copied())
    }

    fn fixture() -> Proposal<WeightMap> {
        Proposal::new(
            choices(4),
            vec![
                Vote::new(
                    wm(&[(1, 3), (2, 1), (3, 5), (4, 4)]),
                    2.4946602468376033,
                    vec![0.4946602468376035, 2.0],
                ),
                Vote::new(
                    wm(&[(1, 2), (2, 3), (3, 6), (4, 1)]),
                    0.4946602468376033,
                    vec![2.4946602468376035, 13.0],
                ),
                Vote::new(
                    wm(&[(1, 5), (2, 5), (3, 1), (4, 8)]),
                    5.4946602468376033,
                    vec![8.4946602468376035, 22.0],
                ),
                Vote::new(
                    wm(&[(1, 9), (2, 2), (3, 4), (4, 5)]),
                    2.2723898,
                    vec![6.4946602468376035, 5.0],
                ),
            ],
            2,
        )
    }

    #[test]
    fn fixture_scores() {
        let p = fixture();
        assert!(approx_eq(Weighted::scores_total(&p), 10.756370540512808));
        assert_close(
            &Weighted::scores(&p),
            &[3.126672833518228, 1.9887642066258326, 1.9504854383113568, 3.690448062057392],
        );
        assert_close_matrix(
            &Weighted::scores_by_strategy(&p),
            &[
                vec![1.0200604351166154, 1.913106136194723],
                vec![0.6360388490574987, 1.738367829438331],
                vec![0.5709368916283946, 1.6906294208404111],
                vec![0.9971936682110845, 2.1900373100257506],
            ],
        );
    }

    #[test]
    fn results_conserve_valid_power() {
        let p = fixture();
        let total = Weighted::scores_total(&p);
        assert!(approx_eq(Weighted::scores(&p).iter().sum::<f64>(), total));
        let by_strategy: f64 = Weighted::scores_by_strategy(&p).iter().flatten().sum();
        assert!(approx_eq(by_strategy, total));
    }

    #[test]
    fn validity() {
        assert!(Weighted::is_valid(&wm(&[(1, 0), (2, 0)]), 2));
        assert_eq!(Weighted::check(&WeightMap::new(), 2), Err(Rejection::EmptySelection));
        assert_eq!(Weighted::check(&wm(&[(1, -1)]), 2), Err(Rejection::NegativeWeight(1)));
        assert_eq!(Weighted::check(&wm(&[(3, 1)]), 2), Err(Rejection::OutOfRange(3)));
        let mut bad = wm(&[(1, 1)]);
        bad.insert("first", 1);
        assert_eq!(Weighted::check(&bad, 2), Err(Rejection::BadKey("first".into())));
    }

    #[test]
    fn all_zero_vote_is_valid_but_contributes_nothing() {
        let p = Proposal::new(
            choices(2),
            vec![
                Vote::new(wm(&[(1, 0), (2, 0)]), 4.0, vec![4.0]),
                Vote::new(wm(&[(1, 1), (2, 3)]), 2.0, vec![2.0]),
            ],
            1,
        );
        assert_eq!(Weighted::valid_votes(&p).len(), 2);
        // Pool holds only the second vote (0.5, 1.5) and is rescaled to total 6.
        assert_close(&Weighted::scores(&p), &[1.5, 4.5]);
        assert_close_matrix(&Weighted::scores_by_strategy(&p), &[vec![1.5], vec![4.5]]);
    }

    #[test]
    fn invalid_votes_excluded_from_total() {
        let mut p = fixture();
        p.votes.push(Vote::new(wm(&[(1, -2)]), 50.0, vec![1.0, 1.0]));
        p.votes.push(Vote::new(WeightMap::new(), 25.0, vec![]));
        assert_eq!(Weighted::valid_vote_positions(&p), vec![0, 1, 2, 3]);
        assert!(approx_eq(Weighted::scores_total(&p), 10.756370540512808));
        assert_close(&Weighted::scores(&p), &Weighted::scores(&fixture()));
    }

    #[test]
    fn key_order_does_not_matter() {
        let a = Proposal::new(
            choices(3),
            vec![Vote::new(wm(&[(1, 2), (3, 1)]), 3.0, vec![1.0])],
            1,
        );
        let b = Proposal::new(
            choices(3),
            vec![Vote::new(wm(&[(3, 1), (1, 2)]), 3.0, vec![1.0])],
            1,
        );
        assert_eq!(Weighted::scores(&a), Weighted::scores(&b));
        assert_close(&Weighted::scores(&a), &[2.0, 0.0, 1.0]);
    }

    #[test]
    fn no_valid_votes_gives_zeros() {
        let p = Proposal::new(choices(2), vec![Vote::new(WeightMap::new(), 1.0, vec![])], 1);
        assert_eq!(Weighted::scores(&p), vec![0.0, 0.0]);
        assert_eq!(Weighted::scores_by_strategy(&p), vec![vec![0.0], vec![0.0]]);
        assert_eq!(Weighted::scores_total(&p), 0.0);
    }

    #[test]
    fn small_balance_is_conserved() {
        let p = Proposal::new(
            choices(4),
            vec![Vote::new(wm(&[(1, 1), (2, 1), (3, 1), (4, 1)]), 3e-7, vec![3e-7])],
            1,
        );
        let s = Weighted::scores(&p);
        assert!(s.iter().all(|&x| x > 0.0));
        assert!((s.iter().sum::<f64>() / 3e-7 - 1.0).abs() < 1e-9);
        let by_strategy: f64 = Weighted::scores_by_strategy(&p).iter().flatten().sum();
        assert!((by_strategy / 3e-7 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_choice_list_yields_empty_results() {
        let p = Proposal::new(Vec::new(), vec![Vote::new(wm(&[(1, 1)]), 2.0, vec![1.0])], 1);
        assert!(Weighted::valid_votes(&p).is_empty());
        assert!(Weighted::scores(&p).is_empty());
        assert!(Weighted::scores_by_strategy(&p).is_empty());
        assert_eq!(Weighted::scores_total(&p), 0.0);
    }
}
