// crates/tally_cli/src/main.rs
//
// Exit codes, typed error mapping, logging setup, and the two run paths:
// validate-only (load + validate, print issues) and the full tally
// (pipeline → result.json → optional reports).

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    pub const VALIDATION: i32 = 2;
    pub const SELF_VERIFY: i32 = 3;
    pub const IO: i32 = 4;
    pub const RENDER: i32 = 5;
}

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use args::{parse_and_validate as parse_cli, Args};

use tally_io::{canonical_json, loader};
use tally_pipeline::{PipelineError, PipelineOutputs, Severity, ValidationReport};
use tally_report::{build_model, render_json, render_text, ReportError, ReportModel};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Malformed proposal or failed validation
    Validation(String),
    /// Result assembly failed its own shape/hash checks
    SelfVerify(String),
    /// Read/write/path/limit errors
    Io(String),
    /// Report model or rendering errors
    Render(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "validation: {m}"),
            MainError::SelfVerify(m) => write!(f, "self-verify: {m}"),
            MainError::Io(m) => write!(f, "io: {m}"),
            MainError::Render(m) => write!(f, "render: {m}"),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("tally: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };
    init_logging(&args.log_level);

    let res = if args.validate_only { validate_only(&args) } else { run_once(&args) };
    let rc = match res {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            tracing::debug!(error = ?e, "run failed");
            eprintln!("tally: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// stderr subscriber; an unparsable filter falls back to `warn`.
fn init_logging(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Map our typed errors to the exit-code table.
fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::SelfVerify(_) => SELF_VERIFY,
        MainError::Io(_) => IO,
        MainError::Render(_) => RENDER,
    }
}

fn map_io_err(e: tally_io::IoError) -> MainError {
    map_pipeline_err(e.into())
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    use PipelineError::*;
    match e {
        Input(m) | Validate(m) => MainError::Validation(m),
        Io(m) => MainError::Io(m),
        Build(m) => MainError::SelfVerify(m),
    }
}

fn map_report_err(e: ReportError) -> MainError {
    MainError::Render(e.to_string())
}

/// Load + validate only; issues go to stdout one per line.
fn validate_only(args: &Args) -> Result<(), MainError> {
    let loaded = loader::load_proposal(&args.input, args.method).map_err(map_io_err)?;
    let report = tally_pipeline::validate_loaded(&loaded);
    print_issues(&report).map_err(|e| MainError::Io(format!("stdout: {e}")))?;

    if !report.pass {
        return Err(MainError::Validation(format!(
            "{} error(s) in {}",
            report.count(Severity::Error),
            args.input.display()
        )));
    }
    if !args.quiet {
        eprintln!(
            "validate-only: {} OK ({} warning(s))",
            loaded.method(),
            report.count(Severity::Warning)
        );
    }
    Ok(())
}

fn print_issues(report: &ValidationReport) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut w = stdout.lock();
    for i in &report.issues {
        let sev = match i.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        let at = match i.where_ {
            tally_pipeline::validate::EntityRef::Root => "proposal".to_string(),
            tally_pipeline::validate::EntityRef::Vote(n) => format!("vote {n}"),
        };
        writeln!(w, "{sev} {} {at}: {}", i.code, i.message)?;
    }
    Ok(())
}

fn run_once(args: &Args) -> Result<(), MainError> {
    let outs = tally_pipeline::run_from_path(&args.input, args.method).map_err(map_pipeline_err)?;
    let model = report_model(&outs)?;

    match &args.out {
        Some(out_dir) => {
            write_artifacts(out_dir, &outs)?;
            render_reports(args, &model, out_dir)?;
            if !args.quiet {
                eprintln!("run: {} written to {}", outs.result.id, out_dir.display());
            }
        }
        None => {
            let text = render_text(&model);
            std::io::stdout()
                .write_all(text.as_bytes())
                .map_err(|e| MainError::Io(format!("stdout: {e}")))?;
        }
    }
    Ok(())
}

fn report_model(outs: &PipelineOutputs) -> Result<ReportModel, MainError> {
    let result_val = serde_json::to_value(&outs.result)
        .map_err(|e| MainError::Render(format!("result to JSON: {e}")))?;
    build_model(&result_val).map_err(map_report_err)
}

fn write_artifacts(out_dir: &Path, outs: &PipelineOutputs) -> Result<(), MainError> {
    fs::create_dir_all(out_dir)
        .map_err(|e| MainError::Io(format!("mkdir {}: {e}", out_dir.display())))?;

    let res_path = out_dir.join("result.json");
    canonical_json::write_canonical_file(&outs.result, &res_path)
        .map_err(|e| MainError::Io(format!("write result.json: {e}")))
}

fn render_reports(args: &Args, model: &ReportModel, out_dir: &Path) -> Result<(), MainError> {
    for fmt in &args.render {
        let (name, body) = match fmt.as_str() {
            "json" => ("report.json", render_json(model).map_err(map_report_err)?),
            "text" => ("report.txt", render_text(model)),
            other => return Err(MainError::Render(format!("unknown renderer: {other}"))),
        };
        canonical_json::write_atomic(&out_dir.join(name), body.as_bytes())
            .map_err(|e| MainError::Io(format!("write {name}: {e}")))?;
    }
    Ok(())
}
