//! render_json.rs
//! Report JSON renderer (cover → totals → choices → integrity).
//!
//! Numbers arrive preformatted from the model so the JSON and text renderers
//! never disagree on rounding.

use serde_json::{Map as JsonMap, Value};

use crate::{ChoiceRow, ReportError, ReportModel, SectionCover, SectionIntegrity, SectionTotals};

/// Build the report object section by section.
pub fn render_report_json(m: &ReportModel) -> Value {
    let mut root = obj();
    root.insert("cover".into(), cover_json(&m.cover));
    root.insert("totals".into(), totals_json(&m.totals));
    root.insert(
        "choices".into(),
        Value::Array(m.choices.iter().map(choice_json).collect()),
    );
    root.insert("integrity".into(), integrity_json(&m.integrity));
    Value::Object(root)
}

/// Pretty-printed report JSON with a trailing newline.
pub fn render_json(m: &ReportModel) -> Result<String, ReportError> {
    let mut s = serde_json::to_string_pretty(&render_report_json(m))
        .map_err(|e| ReportError::Render(e.to_string()))?;
    s.push('\n');
    Ok(s)
}

/* ----------------------- sections ----------------------- */

fn cover_json(c: &SectionCover) -> Value {
    let mut o = obj();
    o.insert("title".into(), Value::String(c.title.clone()));
    o.insert("method".into(), Value::String(c.method.clone()));
    // only approval results carry the note
    if let Some(n) = c.denominator_note.as_ref().filter(|s| !s.is_empty()) {
        o.insert("denominator_note".into(), Value::String(n.clone()));
    }
    Value::Object(o)
}

fn totals_json(t: &SectionTotals) -> Value {
    let mut o = obj();
    o.insert("votes_cast".into(), Value::from(t.votes_cast));
    o.insert("votes_valid".into(), Value::from(t.votes_valid));
    o.insert("votes_excluded".into(), Value::from(t.votes_excluded));
    o.insert("scores_total".into(), Value::String(t.scores_total.clone()));
    o.insert("strategy_count".into(), Value::from(t.strategy_count));
    Value::Object(o)
}

fn choice_json(r: &ChoiceRow) -> Value {
    let mut o = obj();
    o.insert("index".into(), Value::from(r.index));
    o.insert("label".into(), Value::String(r.label.clone()));
    o.insert("rank".into(), Value::from(r.rank));
    o.insert("score".into(), Value::String(r.score.clone()));
    o.insert("share".into(), Value::String(r.share.clone()));
    o.insert(
        "by_strategy".into(),
        Value::Array(r.by_strategy.iter().cloned().map(Value::String).collect()),
    );
    Value::Object(o)
}

fn integrity_json(i: &SectionIntegrity) -> Value {
    let mut o = obj();
    o.insert("result_id".into(), Value::String(i.result_id.clone()));
    o.insert("input_sha256".into(), Value::String(i.input_sha256.clone()));
    o.insert("engine".into(), Value::String(i.engine.clone()));
    Value::Object(o)
}

#[inline]
fn obj() -> JsonMap<String, Value> {
    JsonMap::new()
}
