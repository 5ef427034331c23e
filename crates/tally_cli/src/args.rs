// crates/tally_cli/src/args.rs
//
// Deterministic, offline CLI argument surface.
// - Local paths only (any scheme:// is rejected, including file://)
// - --method overrides the proposal's own `type`
// - --render needs --out; without --out the text report goes to stdout
// - --validate-only loads and validates without tallying

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use clap::Parser;

use tally_core::MethodKind;
use tally_io::looks_like_url_strict;

/// Parsed CLI arguments.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "tally",
    version,
    disable_help_subcommand = true,
    about = "Offline, deterministic tally of proposal votes"
)]
pub struct Args {
    /// Proposal JSON path.
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    /// Voting method; overrides the proposal's `type` field.
    #[arg(long, short = 'm', value_parser = parse_method)]
    pub method: Option<MethodKind>,

    /// Output directory for result.json and rendered reports.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Report(s) to write into --out. Choose up to 2 (json, text).
    #[arg(long, value_parser = ["json", "text"], num_args = 1..=2)]
    pub render: Vec<String>,

    /// Validate the proposal only; print issues and do not tally.
    #[arg(long)]
    pub validate_only: bool,

    /// Suppress the status line on stderr.
    #[arg(long)]
    pub quiet: bool,

    /// Log filter (e.g. `debug`, `tally_pipeline=debug`).
    #[arg(long, env = "TALLY_LOG", default_value = "warn")]
    pub log_level: String,
}

/// Errors surfaced by argument validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    BadCombo(&'static str),
    NonLocalPath(String),
    NotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            BadCombo(s) => write!(f, "invalid flag combination: {s}"),
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
        }
    }
}
impl std::error::Error for CliError {}

pub fn parse_method(s: &str) -> Result<MethodKind, String> {
    s.trim().parse::<MethodKind>().map_err(|e| e.to_string())
}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Args, CliError> {
    validate(Args::parse())
}

/// Flag-combination and filesystem checks, then path normalization.
pub fn validate(mut args: Args) -> Result<Args, CliError> {
    ensure_local_path(&args.input)?;
    if let Some(out) = &args.out {
        ensure_local_path(out)?;
    }
    if !args.render.is_empty() && args.out.is_none() {
        return Err(CliError::BadCombo("--render requires --out"));
    }
    if args.validate_only && (args.out.is_some() || !args.render.is_empty()) {
        return Err(CliError::BadCombo("--validate-only writes no artifacts"));
    }
    ensure_local_exists(&args.input, "--input")?;

    args.render.sort();
    args.render.dedup();
    args.input = normalize_path(&args.input);
    args.out = args.out.take().map(|p| normalize_path(&p));
    Ok(args)
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if looks_like_url_strict(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

/// Ensure a path exists as a regular file.
fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}

/// Best-effort normalization to an absolute path.
/// If canonicalize fails (e.g., path doesn't exist yet), join onto the CWD.
fn normalize_path(p: &Path) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}
