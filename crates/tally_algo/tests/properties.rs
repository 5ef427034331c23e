//! Property tests for the four tally methods.

use proptest::collection::vec;
use proptest::sample::subsequence;
use proptest::prelude::*;

use tally_algo::{
    tabulate, Approval, Proposal, Quadratic, SingleChoice, Vote, VotingMethod, WeightMap, Weighted,
};
use tally_core::normalize::approx_eq;

fn choices(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("C{i}")).collect()
}

fn scores_vec(k: usize) -> impl Strategy<Value = Vec<f64>> {
    vec(0.0f64..50.0, k)
}

/// Weight maps with positive weights; keys may fall outside `[1, n]`.
fn weight_map(n: usize) -> impl Strategy<Value = WeightMap> {
    vec((-1i64..=(n as i64 + 1), 1i64..10), 0..5).prop_map(|pairs| WeightMap::from_pairs(pairs))
}

fn weighted_proposal() -> impl Strategy<Value = Proposal<WeightMap>> {
    (1usize..6, 0usize..4).prop_flat_map(|(n, k)| {
        vec((weight_map(n), 0.5f64..100.0, scores_vec(k)), 0..8).prop_map(move |vs| {
            Proposal::new(
                choices(n),
                vs.into_iter().map(|(w, b, s)| Vote::new(w, b, s)).collect(),
                k,
            )
        })
    })
}

fn single_proposal() -> impl Strategy<Value = Proposal<i64>> {
    (0usize..6, 0usize..3).prop_flat_map(|(n, k)| {
        vec((-2i64..8, 0.0f64..100.0, scores_vec(k)), 0..10).prop_map(move |vs| {
            Proposal::new(
                choices(n),
                vs.into_iter().map(|(c, b, s)| Vote::new(c, b, s)).collect(),
                k,
            )
        })
    })
}

fn approval_proposal() -> impl Strategy<Value = Proposal<Vec<i64>>> {
    (1usize..6, 0usize..3).prop_flat_map(|(n, k)| {
        vec((vec(0i64..8, 0..5), 0.0f64..100.0, scores_vec(k)), 0..10).prop_map(move |vs| {
            Proposal::new(
                choices(n),
                vs.into_iter().map(|(c, b, s)| Vote::new(c, b, s)).collect(),
                k,
            )
        })
    })
}

fn assert_partition<M: VotingMethod>(p: &Proposal<M::Selection>) {
    let valid = M::valid_vote_positions(p);
    for (i, v) in p.votes.iter().enumerate() {
        assert_eq!(valid.contains(&i), M::is_valid(&v.choice, p.choice_count()));
    }
    assert_eq!(valid.len(), M::valid_votes(p).len());
}

proptest! {
    #[test]
    fn validity_partitions_votes(
        s in single_proposal(),
        a in approval_proposal(),
        w in weighted_proposal(),
    ) {
        assert_partition::<SingleChoice>(&s);
        assert_partition::<Approval>(&a);
        assert_partition::<Weighted>(&w);
        assert_partition::<Quadratic>(&w);
    }

    #[test]
    fn weighted_and_quadratic_conserve_total(p in weighted_proposal()) {
        for out in [tabulate::<Weighted>(&p), tabulate::<Quadratic>(&p)] {
            let sum: f64 = out.scores.iter().sum();
            if out.valid_votes.is_empty() {
                prop_assert_eq!(sum, 0.0);
            } else {
                prop_assert!(approx_eq(sum, out.scores_total), "{} vs {}", sum, out.scores_total);
            }
            prop_assert_eq!(out.scores.len(), p.choice_count());
            prop_assert!(out.scores_by_strategy.iter().all(|r| r.len() == p.strategy_count));
        }
    }

    #[test]
    fn approval_gives_full_balance_to_each_selection(
        (n, picks) in (1usize..8).prop_flat_map(|n| (Just(n), subsequence((1..=n as i64).collect::<Vec<_>>(), 0..=n))),
        balance in 0.0f64..100.0,
    ) {
        let sel = picks.clone();
        let p = Proposal::new(choices(n), vec![Vote::new(sel, balance, vec![])], 0);
        let scores = Approval::scores(&p);
        for (i, s) in scores.iter().enumerate() {
            let want = if picks.contains(&(i as i64 + 1)) { balance } else { 0.0 };
            prop_assert_eq!(*s, want);
        }
    }

    #[test]
    fn quadratic_single_voter_is_linear(
        weights in vec(1i64..20, 1..6),
        balance in 0.5f64..100.0,
    ) {
        let n = weights.len();
        let sel = WeightMap::from_pairs(weights.iter().enumerate().map(|(i, w)| (i + 1, *w)));
        let p = Proposal::new(choices(n), vec![Vote::new(sel, balance, vec![])], 0);
        let total: i64 = weights.iter().sum();
        let scores = Quadratic::scores(&p);
        for (i, w) in weights.iter().enumerate() {
            let linear = *w as f64 / total as f64 * balance;
            prop_assert!(approx_eq(scores[i], linear), "{} vs {}", scores[i], linear);
        }
    }

    #[test]
    fn accessors_are_idempotent(
        s in single_proposal(),
        a in approval_proposal(),
        w in weighted_proposal(),
    ) {
        prop_assert_eq!(tabulate::<SingleChoice>(&s), tabulate::<SingleChoice>(&s));
        prop_assert_eq!(tabulate::<Approval>(&a), tabulate::<Approval>(&a));
        prop_assert_eq!(tabulate::<Weighted>(&w), tabulate::<Weighted>(&w));
        prop_assert_eq!(tabulate::<Quadratic>(&w), tabulate::<Quadratic>(&w));
    }
}
