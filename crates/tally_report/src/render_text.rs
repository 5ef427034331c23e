//! render_text.rs
//! Plain-text report for terminals: header, totals, one row per choice in
//! choice order, then the integrity footer. Column widths adapt to the
//! longest label so output is stable for a given model.

use core::fmt::Write as _;

use crate::ReportModel;

const RULE: char = '-';

pub fn render_text(m: &ReportModel) -> String {
    let mut out = String::new();

    // header
    let _ = writeln!(out, "{}", m.cover.title);
    let _ = writeln!(out, "Method: {}", m.cover.method);
    if let Some(note) = &m.cover.denominator_note {
        let _ = writeln!(out, "Note: {note}");
    }
    out.push('\n');

    // totals
    let t = &m.totals;
    let _ = writeln!(
        out,
        "Votes: {} cast, {} valid, {} excluded",
        t.votes_cast, t.votes_valid, t.votes_excluded
    );
    let _ = writeln!(out, "Total score: {}", t.scores_total);
    let _ = writeln!(out, "Strategies: {}", t.strategy_count);
    out.push('\n');

    // choices
    let label_w = m
        .choices
        .iter()
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0)
        .max("Choice".len());
    let score_w = m
        .choices
        .iter()
        .map(|r| r.score.len())
        .max()
        .unwrap_or(0)
        .max("Score".len());

    let header = format!(
        "{:>4}  {:>3}  {:<label_w$}  {:>score_w$}  {:>7}  By strategy",
        "Rank", "#", "Choice", "Score", "Share"
    );
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "{}", RULE.to_string().repeat(header.len()));
    for r in &m.choices {
        let _ = writeln!(
            out,
            "{:>4}  {:>3}  {:<label_w$}  {:>score_w$}  {:>7}  {}",
            r.rank,
            r.index,
            r.label,
            r.score,
            r.share,
            r.by_strategy.join(" ")
        );
    }
    out.push('\n');

    // integrity
    let i = &m.integrity;
    let _ = writeln!(out, "Result: {}", i.result_id);
    if !i.input_sha256.is_empty() {
        let _ = writeln!(out, "Input sha256: {}", i.input_sha256);
    }
    if !i.engine.is_empty() {
        let _ = writeln!(out, "Engine: {}", i.engine);
    }
    out
}
