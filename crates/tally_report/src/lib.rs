//! tally_report/src/lib.rs — Pure offline report model + renderers (JSON/text).
//!
//! Determinism rules:
//! - No network, no I/O here. Callers supply the result artifact already in-memory.
//! - Percent strings use one-decimal, round-half-up formatting.
//! - Rows stay in choice order; rank is a separate column.
//!
//! Notes:
//! - Input is accepted as a JSON value (`serde_json::Value`) to avoid tight
//!   coupling with tally_pipeline concrete types.
//! - For approval results the model carries an explicit sentence about the
//!   denominator: every approved choice receives the full balance, so shares
//!   can sum above 100%.

#![deny(unsafe_code)]

use core::fmt;

use serde::Serialize;
use serde_json::Value;

use tally_core::normalize::approx_eq;

pub mod render_json;
pub mod render_text;

pub use render_json::render_json;
pub use render_text::render_text;

pub type ResultArtifact = Value;

// ===== Errors =====
#[derive(Debug)]
pub enum ReportError {
    MissingField(&'static str),
    Inconsistent(&'static str),
    Render(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::MissingField(p) => write!(f, "missing field {p}"),
            ReportError::Inconsistent(what) => write!(f, "inconsistent result: {what}"),
            ReportError::Render(m) => write!(f, "render failed: {m}"),
        }
    }
}

impl std::error::Error for ReportError {}

// ===== Model =====
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportModel {
    pub cover: SectionCover,
    pub totals: SectionTotals,
    pub choices: Vec<ChoiceRow>,
    pub integrity: SectionIntegrity,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SectionCover {
    pub title: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denominator_note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SectionTotals {
    pub votes_cast: u64,
    pub votes_valid: u64,
    pub votes_excluded: u64,
    pub scores_total: String,
    pub strategy_count: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChoiceRow {
    /// 1-based, as voters cast it.
    pub index: usize,
    pub label: String,
    /// Dense rank by score; equal scores (within 1e-7) share a rank.
    pub rank: usize,
    pub score: String,
    pub share: String,
    pub by_strategy: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SectionIntegrity {
    pub result_id: String,
    pub input_sha256: String,
    pub engine: String,
}

/// Helper: fetch string at JSON Pointer
#[inline]
pub fn j_str(v: &Value, ptr: &str) -> Option<String> {
    v.pointer(ptr).and_then(|x| x.as_str()).map(|s| s.to_string())
}

/// Helper: parse integer at JSON Pointer
#[inline]
pub fn j_u64(v: &Value, ptr: &str) -> Option<u64> {
    v.pointer(ptr).and_then(|x| x.as_u64())
}

/// Attempt to parse a JSON value into f64 robustly (number or numeric string).
#[inline]
pub fn json_number_to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

fn j_f64_array(v: &Value, ptr: &'static str) -> Result<Vec<f64>, ReportError> {
    v.pointer(ptr)
        .and_then(|x| x.as_array())
        .ok_or(ReportError::MissingField(ptr))?
        .iter()
        .map(|x| json_number_to_f64(x).ok_or(ReportError::Inconsistent("non-numeric score")))
        .collect()
}

/// Build the report model from a `result.json` value.
pub fn build_model(result: &ResultArtifact) -> Result<ReportModel, ReportError> {
    let method = j_str(result, "/method").ok_or(ReportError::MissingField("/method"))?;
    let labels: Vec<String> = result
        .pointer("/choices")
        .and_then(|x| x.as_array())
        .ok_or(ReportError::MissingField("/choices"))?
        .iter()
        .map(|x| x.as_str().map(str::to_string).ok_or(ReportError::Inconsistent("choice label")))
        .collect::<Result<_, _>>()?;
    let scores = j_f64_array(result, "/scores")?;
    if scores.len() != labels.len() {
        return Err(ReportError::Inconsistent("scores length differs from choices"));
    }
    let by_strategy: Vec<Vec<f64>> = match result.pointer("/scores_by_strategy").and_then(|x| x.as_array()) {
        Some(rows) => rows
            .iter()
            .map(|row| -> Result<Vec<f64>, ReportError> {
                row.as_array()
                    .ok_or(ReportError::Inconsistent("scores_by_strategy row"))?
                    .iter()
                    .map(|x| json_number_to_f64(x).ok_or(ReportError::Inconsistent("non-numeric score")))
                    .collect()
            })
            .collect::<Result<_, _>>()?,
        None => return Err(ReportError::MissingField("/scores_by_strategy")),
    };
    if by_strategy.len() != labels.len() {
        return Err(ReportError::Inconsistent("scores_by_strategy rows differ from choices"));
    }
    let total = result
        .pointer("/scores_total")
        .and_then(json_number_to_f64)
        .ok_or(ReportError::MissingField("/scores_total"))?;

    let votes_cast = j_u64(result, "/votes_cast").ok_or(ReportError::MissingField("/votes_cast"))?;
    let votes_valid = j_u64(result, "/votes_valid").ok_or(ReportError::MissingField("/votes_valid"))?;
    if votes_valid > votes_cast {
        return Err(ReportError::Inconsistent("more valid votes than cast"));
    }

    let ranks = dense_ranks(&scores);
    let choices = labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| ChoiceRow {
            index: i + 1,
            label,
            rank: ranks[i],
            score: fmt_score(scores[i]),
            share: share_1dp(scores[i], total),
            by_strategy: by_strategy[i].iter().map(|s| fmt_score(*s)).collect(),
        })
        .collect();

    let denominator_note = (method == "approval").then(|| {
        "Each approved choice receives the voter's full balance; shares are of total valid power and may sum above 100%."
            .to_string()
    });
    let engine = format!(
        "{} {}",
        j_str(result, "/engine/name").unwrap_or_default(),
        j_str(result, "/engine/version").unwrap_or_default()
    );

    Ok(ReportModel {
        cover: SectionCover {
            title: j_str(result, "/title").unwrap_or_else(|| "Proposal results".to_string()),
            method,
            denominator_note,
        },
        totals: SectionTotals {
            votes_cast,
            votes_valid,
            votes_excluded: votes_cast - votes_valid,
            scores_total: fmt_score(total),
            strategy_count: j_u64(result, "/strategy_count").unwrap_or(0),
        },
        choices,
        integrity: SectionIntegrity {
            result_id: j_str(result, "/id").ok_or(ReportError::MissingField("/id"))?,
            input_sha256: j_str(result, "/input_sha256").unwrap_or_default(),
            engine: engine.trim().to_string(),
        },
    })
}

/// Dense ranks (1 = highest); scores within epsilon tie.
pub fn dense_ranks(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));

    let mut ranks = vec![0; scores.len()];
    let mut rank = 0;
    let mut prev: Option<f64> = None;
    for i in order {
        if prev.map_or(true, |p| !approx_eq(p, scores[i])) {
            rank += 1;
            prev = Some(scores[i]);
        }
        ranks[i] = rank;
    }
    ranks
}

/// Fixed six decimals for display.
pub fn fmt_score(x: f64) -> String {
    format!("{x:.6}")
}

/// Format a fraction `x` (≥ 0) as a percentage with **one decimal place**,
/// round-half-up. Returns `"—"` if `x` is NaN/∞/negative.
pub fn percent_1dp(x: f64) -> String {
    if !x.is_finite() || x < 0.0 {
        return "—".to_string();
    }
    let v = x * 100.0;
    let scaled = (v * 10.0 + 0.5_f64).floor() / 10.0;
    format!("{scaled:.1}%")
}

/// `score / total` as a 1dp percentage; `"—"` when the total is (near) zero.
pub fn share_1dp(score: f64, total: f64) -> String {
    if approx_eq(total, 0.0) {
        return "—".to_string();
    }
    percent_1dp(score / total)
}

/* ------------------------------------- Tests -------------------------------------- */
