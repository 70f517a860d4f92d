//! JSON output formatter for scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "root": "/srv/music",
//!   "sets": [
//!     {
//!       "canonical": "/srv/music/a.mp3",
//!       "size": 4096,
//!       "digest": "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
//!       "dupes": ["/srv/music/a (1).mp3"]
//!     }
//!   ],
//!   "renames": [
//!     {
//!       "from": "/srv/music/a (1).mp3",
//!       "to": "/srv/music/a (1).mp3.9f86d081884c7d65.dupe",
//!       "size": 4096,
//!       "status": "marked"
//!     }
//!   ],
//!   "summary": {
//!     "dirs_scanned": 12,
//!     "duplicate_sets": 1,
//!     "files_marked": 1,
//!     "dry_run": false,
//!     "exit_code": 0,
//!     "exit_code_name": "DM000"
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::actions::{BatchMarkResult, RenamePlan};
use crate::duplicates::{DupeSet, ScanSummary, SkippedDirectory};
use crate::error::ExitCode;

/// What happened to a planned rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameStatus {
    /// Not applied (dry run)
    Planned,
    /// Applied
    Marked,
    /// Attempted and failed
    Failed,
}

/// A single rename in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRename {
    /// Current path of the duplicate
    pub from: PathBuf,
    /// Marked path
    pub to: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Outcome
    pub status: RenameStatus,
    /// Failure message, for failed renames
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Directories listed and resolved
    pub dirs_scanned: usize,
    /// Directories skipped because of errors
    pub dirs_skipped: usize,
    /// Regular files seen
    pub total_files: usize,
    /// Total size of all seen files in bytes
    pub total_size: u64,
    /// Files read and digested
    pub files_digested: usize,
    /// Duplicate sets found
    pub duplicate_sets: usize,
    /// Redundant copies found
    pub duplicate_files: usize,
    /// Bytes held by redundant copies
    pub reclaimable_space: u64,
    /// Files renamed in this run
    pub files_marked: usize,
    /// Renames that failed
    pub mark_failures: usize,
    /// Whether renames were only planned
    pub dry_run: bool,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DM000")
    pub exit_code_name: String,
    /// Directories skipped, with causes
    pub skipped: Vec<SkippedDirectory>,
}

impl JsonSummary {
    /// Build the summary from scan results and the rename outcome.
    #[must_use]
    pub fn new(
        summary: &ScanSummary,
        marked: Option<&BatchMarkResult>,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            dirs_scanned: summary.dirs_scanned,
            dirs_skipped: summary.dirs_skipped,
            total_files: summary.total_files,
            total_size: summary.total_size,
            files_digested: summary.files_digested,
            duplicate_sets: summary.duplicate_sets,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            files_marked: marked.map_or(0, BatchMarkResult::success_count),
            mark_failures: marked.map_or(0, BatchMarkResult::failure_count),
            dry_run: marked.is_none(),
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
            skipped: summary.skipped.clone(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Root directory that was scanned
    pub root: PathBuf,
    /// Duplicate sets in traversal order
    pub sets: Vec<DupeSet>,
    /// Renames, planned or applied
    pub renames: Vec<JsonRename>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Assemble the report.
    ///
    /// `marked` is `None` for a dry run; every plan is then reported as
    /// planned. Otherwise each plan is matched with its outcome.
    #[must_use]
    pub fn new(
        root: &Path,
        sets: &[DupeSet],
        plans: &[RenamePlan],
        summary: &ScanSummary,
        marked: Option<&BatchMarkResult>,
        exit_code: ExitCode,
    ) -> Self {
        let failures: HashMap<&Path, &str> = marked
            .map(|r| {
                r.failures
                    .iter()
                    .map(|(path, err)| (path.as_path(), err.as_str()))
                    .collect()
            })
            .unwrap_or_default();

        let renames = plans
            .iter()
            .map(|plan| {
                let (status, error) = match (marked, failures.get(plan.from.as_path())) {
                    (None, _) => (RenameStatus::Planned, None),
                    (Some(_), Some(err)) => (RenameStatus::Failed, Some((*err).to_string())),
                    (Some(_), None) => (RenameStatus::Marked, None),
                };
                JsonRename {
                    from: plan.from.clone(),
                    to: plan.to.clone(),
                    size: plan.size,
                    status,
                    error,
                }
            })
            .collect();

        Self {
            root: root.to_path_buf(),
            sets: sets.to_vec(),
            renames,
            summary: JsonSummary::new(summary, marked, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
