//! crates/tally_pipeline/src/validate.rs
//! Proposal validation before tabulation.
//!
//! Most findings are warnings: they describe votes the tally will ignore or
//! read partially, and never change the numbers. The one error is a negative
//! balance/strategy score on a valid quadratic vote, which has no square root.

use serde::Serialize;

use tally_algo::{Approval, Proposal, Quadratic, Rejection, SingleChoice, VotingMethod, Weighted};
use tally_core::ballot::Ballots;

/// Issue severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Where the issue occurred.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRef {
    Root,
    /// 0-based position in the input `votes` array.
    Vote(usize),
}

/// One validation finding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    #[serde(rename = "where")]
    pub where_: EntityRef,
}

/// Deterministic report: pass = (no Error); ordering of issues is stable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub pass: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// Top-level entry point.
pub fn validate(ballots: &Ballots) -> ValidationReport {
    let mut issues: Vec<ValidationIssue> = Vec::new();

    if ballots.choices().is_empty() {
        issues.push(ValidationIssue {
            severity: Severity::Warning,
            code: "Proposal.NoChoices",
            message: "proposal has no choices; every vote is invalid".to_string(),
            where_: EntityRef::Root,
        });
    }

    let rejected = match ballots {
        Ballots::SingleChoice(p) => rejections::<SingleChoice>(p),
        Ballots::Approval(p) => rejections::<Approval>(p),
        Ballots::Weighted(p) => rejections::<Weighted>(p),
        Ballots::Quadratic(p) => rejections::<Quadratic>(p),
    };
    for (i, why) in &rejected {
        issues.push(ValidationIssue {
            severity: Severity::Warning,
            code: "Vote.Rejected",
            message: format!("{}: {why}", why.code()),
            where_: EntityRef::Vote(*i),
        });
    }

    issues.extend(check_strategy_width(ballots));
    issues.extend(check_negative_power(ballots, &rejected));

    sort_issues_stably(&mut issues);

    ValidationReport {
        pass: !issues.iter().any(|i| i.severity == Severity::Error),
        issues,
    }
}

// ------------------------------------------------------------------------------------------------
// Checks
// ------------------------------------------------------------------------------------------------

/// `(position, reason)` for every vote the method rejects, in input order.
pub fn rejections<M: VotingMethod>(p: &Proposal<M::Selection>) -> Vec<(usize, Rejection)> {
    let n = p.choice_count();
    p.votes
        .iter()
        .enumerate()
        .filter_map(|(i, v)| M::check(&v.choice, n).err().map(|r| (i, r)))
        .collect()
}

/// Warnings:
/// - "Vote.StrategyWidth" when a vote's `scores` length differs from the strategy count.
fn check_strategy_width(ballots: &Ballots) -> Vec<ValidationIssue> {
    let k = ballots.strategy_count();
    ballots
        .vote_powers()
        .into_iter()
        .enumerate()
        .filter(|(_, (_, scores))| scores.len() != k)
        .map(|(i, (_, scores))| {
            let tail = if scores.len() > k { "extra entries are ignored" } else { "missing entries count as 0" };
            ValidationIssue {
                severity: Severity::Warning,
                code: "Vote.StrategyWidth",
                message: format!("{} strategy scores for {k} strategies; {tail}", scores.len()),
                where_: EntityRef::Vote(i),
            }
        })
        .collect()
}

/// "Vote.NegativePower": error on valid quadratic votes, warning otherwise.
fn check_negative_power(ballots: &Ballots, rejected: &[(usize, Rejection)]) -> Vec<ValidationIssue> {
    let quadratic = matches!(ballots, Ballots::Quadratic(_));
    let mut issues = Vec::new();
    for (i, (balance, scores)) in ballots.vote_powers().into_iter().enumerate() {
        let negative = balance < 0.0 || scores.iter().any(|s| *s < 0.0);
        if !negative {
            continue;
        }
        let counted = !rejected.iter().any(|(r, _)| *r == i);
        let severity = if quadratic && counted { Severity::Error } else { Severity::Warning };
        issues.push(ValidationIssue {
            severity,
            code: "Vote.NegativePower",
            message: format!("negative balance or strategy score (balance {balance})"),
            where_: EntityRef::Vote(i),
        });
    }
    issues
}

// ------------------------------------------------------------------------------------------------
// Utilities
// ------------------------------------------------------------------------------------------------

fn sort_issues_stably(issues: &mut [ValidationIssue]) {
    issues.sort_by(|a, b| {
        a.code
            .cmp(b.code)
            .then_with(|| cmp_where(&a.where_, &b.where_))
            .then_with(|| a.message.cmp(&b.message))
    });
}

fn cmp_where(a: &EntityRef, b: &EntityRef) -> core::cmp::Ordering {
    use core::cmp::Ordering::*;
    use EntityRef::*;
    match (a, b) {
        (Root, Root) => Equal,
        (Root, _) => Less,
        (_, Root) => Greater,
        (Vote(x), Vote(y)) => x.cmp(y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::ballot::{Vote, WeightMap};

    fn names(n: usize) -> Vec<String> {
        (1..=n).map(|i| i.to_string()).collect()
    }

    #[test]
    fn rejected_votes_are_warnings_with_reason() {
        let b = Ballots::Approval(Proposal::new(
            names(2),
            vec![
                Vote::new(vec![1, 1], 1.0, vec![]),
                Vote::new(vec![2], 1.0, vec![]),
                Vote::new(vec![3], 1.0, vec![]),
            ],
            0,
        ));
        let r = validate(&b);
        assert!(r.pass);
        let codes: Vec<_> = r.issues.iter().map(|i| (i.code, i.where_.clone())).collect();
        assert_eq!(
            codes,
            vec![("Vote.Rejected", EntityRef::Vote(0)), ("Vote.Rejected", EntityRef::Vote(2))]
        );
        assert!(r.issues[0].message.starts_with("duplicate_choice"));
        assert!(r.issues[1].message.starts_with("out_of_range"));
    }

    #[test]
    fn strategy_width_mismatch_warns() {
        let b = Ballots::SingleChoice(Proposal::new(
            names(1),
            vec![Vote::new(1, 1.0, vec![1.0]), Vote::new(1, 1.0, vec![1.0, 2.0, 3.0])],
            2,
        ));
        let r = validate(&b);
        assert_eq!(r.count(Severity::Warning), 2);
        assert!(r.issues.iter().all(|i| i.code == "Vote.StrategyWidth"));
        assert!(r.issues[0].message.contains("missing"));
        assert!(r.issues[1].message.contains("ignored"));
    }

    #[test]
    fn negative_quadratic_power_fails_only_when_counted() {
        let valid = WeightMap::from_pairs([(1, 1)]);
        let invalid = WeightMap::from_pairs([(1, 0)]);
        let b = Ballots::Quadratic(Proposal::new(
            names(1),
            vec![Vote::new(invalid, -1.0, vec![]), Vote::new(valid.clone(), 2.0, vec![])],
            0,
        ));
        assert!(validate(&b).pass);

        let b = Ballots::Quadratic(Proposal::new(
            names(1),
            vec![Vote::new(valid.clone(), -1.0, vec![])],
            0,
        ));
        let r = validate(&b);
        assert!(!r.pass);
        assert_eq!(r.issues[0].code, "Vote.NegativePower");

        let b = Ballots::Weighted(Proposal::new(names(1), vec![Vote::new(valid, -1.0, vec![])], 0));
        let r = validate(&b);
        assert!(r.pass);
        assert_eq!(r.count(Severity::Warning), 1);
    }

    #[test]
    fn empty_choice_list_warns_at_root_first() {
        let b = Ballots::SingleChoice(Proposal::new(Vec::new(), vec![Vote::new(1, 1.0, vec![])], 0));
        let r = validate(&b);
        assert!(r.pass);
        assert_eq!(r.issues[0].code, "Proposal.NoChoices");
        assert_eq!(r.issues[0].where_, EntityRef::Root);
        assert_eq!(r.issues[1].code, "Vote.Rejected");
    }

    #[test]
    fn report_serializes_with_where_key() {
        let b = Ballots::SingleChoice(Proposal::new(names(1), vec![Vote::new(5, 1.0, vec![])], 0));
        let v = serde_json::to_value(validate(&b)).unwrap();
        assert_eq!(v["issues"][0]["where"]["vote"], 0);
        assert_eq!(v["issues"][0]["severity"], "warning");
    }
}
