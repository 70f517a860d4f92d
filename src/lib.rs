//! dupemark - per-directory duplicate file marker
//!
//! Walks a directory tree and, inside each directory, finds files with
//! identical content (size grouping, then SHA-256). One copy per group is
//! kept; the others are renamed with a marker suffix so later runs skip
//! them. Nothing is ever deleted.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use crate::actions::{apply_marks, plan_marks, BatchMarkResult, MarkProgressCallback};
use crate::cli::{Cli, Commands, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use crate::error::ExitCode;
use crate::output::{text, JsonOutput, TextOutput};
use crate::progress::{Progress, ProgressCallback, PHASE_MARK};

/// Run the application with parsed arguments.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the root cannot be
/// scanned, the scan is interrupted, or the report cannot be written.
/// Skipped directories and failed renames are not errors; they only
/// affect the exit code with `--strict`.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet, cli.no_color);

    let Cli {
        quiet,
        config,
        command,
        ..
    } = cli;

    match command {
        Commands::Scan(args) => run_scan(&args, config.as_deref(), quiet),
    }
}

fn run_scan(args: &ScanArgs, config_path: Option<&Path>, quiet: bool) -> Result<ExitCode> {
    let shutdown = signal::install_handler().context("Failed to install Ctrl+C handler")?;

    let mut config = Config::load_from_path(config_path)?;
    args.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;
    log::debug!("Effective configuration: {:?}", config);

    let json = args.output == OutputFormat::Json;
    let progress = Arc::new(Progress::new(quiet || json));

    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_walker_config(config.walker_config())
            .with_jobs(config.jobs)
            .with_shutdown_flag(shutdown.get_flag())
            .with_progress_callback(progress.clone()),
    );
    let walker = finder
        .walker(&args.root)
        .with_context(|| format!("Failed to scan {}", args.root.display()))?;
    let root = walker.root().to_path_buf();

    let (sets, summary) = finder
        .find_duplicates_in(&walker)
        .with_context(|| format!("Failed to scan {}", root.display()))?;

    let plans = plan_marks(&sets, &config.mark_config());
    let show_text = !json && !quiet;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if show_text {
        TextOutput::new(&root, &sets).write_to(&mut out)?;
        if args.dry_run {
            text::write_plan(&mut out, &plans)?;
        } else {
            text::write_marking(&mut out, plans.len())?;
        }
        out.flush()?;
    }

    if shutdown.is_shutdown_requested() {
        return Err(FinderError::Interrupted.into());
    }

    let marked: Option<BatchMarkResult> = if args.dry_run {
        log::info!("Dry run: {} rename(s) planned, none applied", plans.len());
        None
    } else {
        if !plans.is_empty() {
            progress.on_phase_start(PHASE_MARK, plans.len());
        }
        let callback: &dyn MarkProgressCallback = progress.as_ref();
        Some(apply_marks(&plans, Some(callback)))
    };

    let partial = summary.has_errors() || marked.as_ref().is_some_and(|r| !r.all_succeeded());
    let exit_code = if args.strict && partial {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    };

    if json {
        JsonOutput::new(&root, &sets, &plans, &summary, marked.as_ref(), exit_code)
            .write_to(&mut out, true)?;
    } else if show_text {
        text::write_totals(&mut out, &summary, marked.as_ref())?;
    }
    out.flush()?;

    Ok(exit_code)
}
