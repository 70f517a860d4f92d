//! Marking duplicates by renaming them.
//!
//! # Overview
//!
//! Duplicates are never deleted. Each redundant copy is renamed in place by
//! appending an optional digest fragment and the marker suffix:
//!
//! ```text
//! song (1).mp3  ->  song (1).mp3.ba7816bf8f01cfea.dupe
//! ```
//!
//! Files ending in the suffix are skipped by later scans, so a second run
//! over the same tree finds nothing new. Canonical files are never touched.
//!
//! Renames run one after another once detection has finished. A failed
//! rename is logged and recorded; the remaining renames still run and the
//! file stays unmarked until the next run.
//!
//! # Example
//!
//! ```no_run
//! use dupemark::actions::{apply_marks, plan_marks, MarkConfig};
//! use dupemark::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (sets, _) = finder.find_duplicates(Path::new("/srv/music")).unwrap();
//!
//! let plans = plan_marks(&sets, &MarkConfig::default());
//! let result = apply_marks(&plans, None);
//! println!("{}", result.summary());
//! ```

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::DupeSet;
use crate::scanner::DEFAULT_MARKER_SUFFIX;

/// Error type for mark operations.
#[derive(Debug, Error)]
pub enum MarkError {
    /// Source file was not found (may have been moved since the scan).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// The destination name is already taken; it is never overwritten.
    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),

    /// Permission denied when attempting to rename.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MarkError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::DestinationExists(p) | Self::PermissionDenied(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}

/// How marked names are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkConfig {
    /// Suffix appended to every marked file.
    pub marker_suffix: String,
    /// Insert `.<first 8 digest bytes in hex>` before the suffix.
    pub tag_digest: bool,
}

impl Default for MarkConfig {
    fn default() -> Self {
        Self {
            marker_suffix: DEFAULT_MARKER_SUFFIX.to_string(),
            tag_digest: true,
        }
    }
}

impl MarkConfig {
    /// Set the marker suffix.
    #[must_use]
    pub fn with_marker_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.marker_suffix = suffix.into();
        self
    }

    /// Enable/disable the digest fragment.
    #[must_use]
    pub fn with_tag_digest(mut self, tag: bool) -> Self {
        self.tag_digest = tag;
        self
    }
}

/// One planned rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamePlan {
    /// Current path of the duplicate.
    pub from: PathBuf,
    /// Path it will be renamed to.
    pub to: PathBuf,
    /// Size of the file in bytes.
    pub size: u64,
}

/// Build the marked destination path for one duplicate.
#[must_use]
pub fn marked_path(path: &Path, fragment: Option<&str>, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    if let Some(fragment) = fragment {
        name.push(".");
        name.push(fragment);
    }
    name.push(suffix);
    PathBuf::from(name)
}

/// Turn duplicate sets into an ordered list of renames.
///
/// Every dupe of every set becomes one plan, in set order then dupe order.
/// Canonical files never appear.
#[must_use]
pub fn plan_marks(sets: &[DupeSet], config: &MarkConfig) -> Vec<RenamePlan> {
    let mut plans = Vec::with_capacity(sets.iter().map(DupeSet::duplicate_count).sum());
    for set in sets {
        let fragment = if config.tag_digest {
            set.digest.map(|d| d.fragment())
        } else {
            None
        };
        for dupe in &set.dupes {
            plans.push(RenamePlan {
                from: dupe.clone(),
                to: marked_path(dupe, fragment.as_deref(), &config.marker_suffix),
                size: set.size_bytes,
            });
        }
    }
    plans
}

/// Result of a successful rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkResult {
    /// Original path.
    pub from: PathBuf,
    /// New path.
    pub to: PathBuf,
    /// Size of the renamed file in bytes.
    pub size: u64,
}

/// Results of a batch mark operation.
#[derive(Debug, Clone, Default)]
pub struct BatchMarkResult {
    /// Successfully marked files.
    pub successes: Vec<MarkResult>,
    /// Failed renames with their errors.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes held by the marked files.
    pub bytes_marked: u64,
}

impl BatchMarkResult {
    /// Number of successful renames.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed renames.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if all renames succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.all_succeeded() {
            format!("Marked {} file(s)", self.success_count())
        } else {
            format!(
                "Marked {} file(s), {} failed",
                self.success_count(),
                self.failure_count()
            )
        }
    }
}

/// Callback trait for mark progress reporting.
pub trait MarkProgressCallback: Send + Sync {
    /// Called before each rename.
    fn on_before_mark(&self, path: &Path, index: usize, total: usize);

    /// Called after a successful rename.
    fn on_mark_success(&self, _from: &Path, _to: &Path) {}

    /// Called after a failed rename.
    fn on_mark_failure(&self, path: &Path, error: &str);

    /// Called when the batch completes.
    fn on_complete(&self, result: &BatchMarkResult);
}

/// Rename a single file according to its plan.
///
/// # Errors
///
/// - `DestinationExists` if something already sits at `plan.to`
/// - `NotFound` if the source has disappeared
/// - `PermissionDenied` / `Io` if the rename itself fails
pub fn mark_file(plan: &RenamePlan) -> Result<MarkResult, MarkError> {
    if fs::symlink_metadata(&plan.to).is_ok() {
        return Err(MarkError::DestinationExists(plan.to.clone()));
    }
    fs::rename(&plan.from, &plan.to).map_err(|e| MarkError::from_io(&plan.from, e))?;
    log::debug!("Marked {} -> {}", plan.from.display(), plan.to.display());
    Ok(MarkResult {
        from: plan.from.clone(),
        to: plan.to.clone(),
        size: plan.size,
    })
}

/// Apply every plan in order, continuing past failures.
pub fn apply_marks(
    plans: &[RenamePlan],
    callback: Option<&dyn MarkProgressCallback>,
) -> BatchMarkResult {
    let mut result = BatchMarkResult::default();
    let total = plans.len();

    for (index, plan) in plans.iter().enumerate() {
        if let Some(cb) = callback {
            cb.on_before_mark(&plan.from, index, total);
        }

        match mark_file(plan) {
            Ok(marked) => {
                if let Some(cb) = callback {
                    cb.on_mark_success(&marked.from, &marked.to);
                }
                result.bytes_marked += marked.size;
                result.successes.push(marked);
            }
            Err(e) => {
                log::warn!("Failed to mark {}: {}", plan.from.display(), e);
                let message = e.to_string();
                if let Some(cb) = callback {
                    cb.on_mark_failure(&plan.from, &message);
                }
                result.failures.push((plan.from.clone(), message));
            }
        }
    }

    if let Some(cb) = callback {
        cb.on_complete(&result);
    }

    log::info!("{}", result.summary());
    result
}
