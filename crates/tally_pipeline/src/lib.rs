//! tally_pipeline — deterministic pipeline surface (load → validate → tabulate → build result).
//! This crate delegates JSON/hashing to `tally_io` and the math to `tally_algo`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tally_core::MethodKind;
use tally_io::loader::{self, LoadedProposal};
use tally_io::IoError;

pub mod build_result;
pub mod tabulate;
pub mod validate;

pub use build_result::ResultDoc;
pub use validate::{Severity, ValidationIssue, ValidationReport};

/// Engine identifiers echoed into every result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMeta {
    pub name: String,
    pub version: String,
}

/// Top-level pipeline outputs.
#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    pub result: ResultDoc,
    pub validation: ValidationReport,
}

/// Single error surface for the pipeline orchestration.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("io: {0}")]
    Io(String),
    #[error("input: {0}")]
    Input(String),
    #[error("validation failed: {0}")]
    Validate(String),
    #[error("build: {0}")]
    Build(String),
}

impl From<IoError> for PipelineError {
    fn from(e: IoError) -> Self {
        use PipelineError::*;
        match e {
            IoError::Path(m) => Io(format!("path: {m}")),
            IoError::Limit(m) => Io(format!("limit: {m}")),
            IoError::Json { pointer, msg } => Input(format!("json {pointer}: {msg}")),
            IoError::Shape { pointer, msg } => Input(format!("{pointer}: {msg}")),
            IoError::Hash(m) => Build(format!("hash: {m}")),
        }
    }
}

impl From<build_result::BuildResultError> for PipelineError {
    fn from(e: build_result::BuildResultError) -> Self {
        PipelineError::Build(e.to_string())
    }
}

// -------------------------------------- Public API --------------------------------------

/// Validate, tabulate, and build the result for an already-loaded proposal.
pub fn run_with_loaded(
    loaded: &LoadedProposal,
    engine: EngineMeta,
) -> Result<PipelineOutputs, PipelineError> {
    let span = tracing::info_span!("tally", method = %loaded.method());
    let _guard = span.enter();

    let validation = validate_loaded(loaded);
    if !validation.pass {
        return Err(PipelineError::Validate(summarize_errors(&validation)));
    }

    let outcome = tabulate::tabulate_ballots(&loaded.ballots);
    let result = build_result::build_result(loaded, &outcome, engine)?;
    tracing::debug!(id = %result.id, "result built");

    Ok(PipelineOutputs { result, validation })
}

/// Load a proposal file and run the whole pipeline.
pub fn run_from_path(
    path: &Path,
    method_override: Option<MethodKind>,
) -> Result<PipelineOutputs, PipelineError> {
    let loaded = loader::load_proposal(path, method_override)?;
    tracing::debug!(path = %path.display(), input_sha256 = %loaded.input_sha256, "loaded");
    run_with_loaded(&loaded, engine_identifiers())
}

/// Validation only; logs each issue at its severity.
pub fn validate_loaded(loaded: &LoadedProposal) -> ValidationReport {
    let report = validate::validate(&loaded.ballots);
    for issue in &report.issues {
        match issue.severity {
            Severity::Error => {
                tracing::error!(code = issue.code, at = ?issue.where_, "{}", issue.message)
            }
            Severity::Warning => {
                tracing::warn!(code = issue.code, at = ?issue.where_, "{}", issue.message)
            }
        }
    }
    report
}

/// Engine identifiers for use in results.
pub fn engine_identifiers() -> EngineMeta {
    EngineMeta {
        name: "tally_engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

fn summarize_errors(report: &ValidationReport) -> String {
    report
        .issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .map(|i| format!("{} at {:?}: {}", i.code, i.where_, i.message))
        .collect::<Vec<_>>()
        .join("; ")
}
