//! # Validate Subcommand
//!
//! Loads one specification document, validates it, and prints either a
//! plain-text summary or the full report as JSON.
//!
//! Text output starts with `OK:` or `FAIL:` followed by the path, then one
//! line per error and per warning.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use envspec_core::ValidationReport;
use envspec_validator::{ProgressEvent, SpecificationValidator, ValidatorConfig};

/// Arguments for the `envspec validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Specification document (JSON or YAML).
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Print download progress for every source to stderr.
    #[arg(long)]
    pub progress: bool,

    /// Maximum number of artifacts checked at once (overrides ENVSPEC_MAX_WORKERS).
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// HTTP connect timeout in seconds (overrides ENVSPEC_HTTP_TIMEOUT_SECS).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when the specification is valid, 1 when it is not.
/// Load, configuration and contract failures are returned as errors.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let config = build_config(args)?;
    let document = envspec_schema::load_document(&args.path)
        .with_context(|| format!("failed to load {}", args.path.display()))?;

    let validator =
        SpecificationValidator::new(config).context("failed to initialise validator")?;

    let report = if args.progress {
        let observer = |event: &ProgressEvent<'_>| {
            eprintln!("{}", progress_line(event));
        };
        validator.validate_with_progress(&document, &observer)
    } else {
        validator.validate(&document)
    }
    .with_context(|| format!("cannot validate {}", args.path.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        write_json(&mut out, &args.path, &report)?;
    } else {
        write_text(&mut out, &args.path, &report)?;
    }

    Ok(if report.is_valid() { 0 } else { 1 })
}

fn build_config(args: &ValidateArgs) -> Result<ValidatorConfig> {
    let mut config = ValidatorConfig::from_env().context("invalid environment configuration")?;
    if let Some(workers) = args.workers {
        config.max_workers = workers;
    }
    if let Some(timeout) = args.timeout {
        config.http_timeout_secs = timeout;
    }
    config.validate().context("invalid command-line configuration")?;
    Ok(config)
}

fn progress_line(event: &ProgressEvent<'_>) -> String {
    let status = if event.percent < 0 {
        "size unknown".to_string()
    } else {
        format!("{}%", event.percent)
    };
    format!(
        "  {}/{} [{}] {status}",
        event.component_name, event.file_name, event.source
    )
}

fn write_text(out: &mut impl Write, path: &Path, report: &ValidationReport) -> Result<()> {
    if report.is_valid() {
        writeln!(
            out,
            "OK: {} ({} warning(s))",
            path.display(),
            report.warnings.len()
        )?;
    } else {
        writeln!(
            out,
            "FAIL: {} ({} error(s), {} warning(s))",
            path.display(),
            report.errors.len(),
            report.warnings.len()
        )?;
    }
    for error in &report.errors {
        writeln!(out, "  ERROR {error}")?;
    }
    for warning in &report.warnings {
        writeln!(out, "  WARN  {warning}")?;
    }
    Ok(())
}

fn write_json(out: &mut impl Write, path: &Path, report: &ValidationReport) -> Result<()> {
    let value = json!({
        "path": path.display().to_string(),
        "valid": report.is_valid(),
        "errors": report.errors,
        "warnings": report.warnings,
    });
    serde_json::to_writer_pretty(&mut *out, &value)?;
    writeln!(out)?;
    Ok(())
}
