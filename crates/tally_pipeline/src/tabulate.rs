//! crates/tally_pipeline/src/tabulate.rs
//! TABULATE stage: dispatch tagged ballots to their voting method.

use tally_algo::{tabulate, Approval, Quadratic, SingleChoice, TallyOutcome, Weighted};
use tally_core::ballot::Ballots;

/// Run the method matching the ballots' selection shape.
pub fn tabulate_ballots(ballots: &Ballots) -> TallyOutcome {
    let outcome = match ballots {
        Ballots::SingleChoice(p) => tabulate::<SingleChoice>(p),
        Ballots::Approval(p) => tabulate::<Approval>(p),
        Ballots::Weighted(p) => tabulate::<Weighted>(p),
        Ballots::Quadratic(p) => tabulate::<Quadratic>(p),
    };
    tracing::debug!(
        method = %outcome.method,
        votes = ballots.vote_count(),
        valid = outcome.valid_votes.len(),
        scores_total = outcome.scores_total,
        "tabulated"
    );
    outcome
}
