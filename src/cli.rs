//! Command-line interface definitions for dupemark.
//!
//! Global options (verbosity, color, error format, config file) apply to
//! every subcommand.
//!
//! # Example
//!
//! ```bash
//! # Find duplicates under ~/Music and mark them
//! dupemark scan ~/Music
//!
//! # Show what would be renamed without touching anything
//! dupemark scan ~/Music --dry-run
//!
//! # Machine-readable report, four directories at a time
//! dupemark scan ~/Music --output json --jobs 4
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Config;

/// Find identical files within each directory and mark the extra copies.
///
/// In every directory, files of equal size are digested with SHA-256. For
/// each group of identical files one copy is kept as is and the others are
/// renamed with a marker suffix (".dupe" by default). Nothing is deleted.
#[derive(Debug, Parser)]
#[command(name = "dupemark")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (default: config.toml in the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory tree and mark duplicate files
    Scan(ScanArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Root directory to scan
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Suffix appended to marked duplicates
    #[arg(long, value_name = "SUFFIX")]
    pub suffix: Option<String>,

    /// Do not embed the digest fragment in marked names
    #[arg(long)]
    pub no_digest_tag: bool,

    /// Number of directories processed concurrently
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Follow symbolic links during scan
    ///
    /// Symlink loops are detected and reported.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Report planned renames without applying them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Exit with code 3 if any directory was skipped or any rename failed
    #[arg(long)]
    pub strict: bool,
}

impl ScanArgs {
    /// Apply flags given on the command line on top of `config`.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ref suffix) = self.suffix {
            config.marker_suffix.clone_from(suffix);
        }
        if self.no_digest_tag {
            config.tag_digest = false;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        if self.follow_symlinks {
            config.follow_symlinks = true;
        }
        if self.skip_hidden {
            config.skip_hidden = true;
        }
    }
}

/// Report format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines on stdout
    Text,
    /// A single JSON document on stdout
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
