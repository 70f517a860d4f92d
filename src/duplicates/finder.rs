//! Duplicate finder orchestrating the per-directory pipeline.
//!
//! # Overview
//!
//! For every directory under the root, in traversal order:
//! 1. **Listing**: map file names to sizes (see [`crate::scanner::Walker`])
//! 2. **Size grouping**: keep sizes shared by 2+ files (see [`group_by_size`])
//! 3. **Digest resolution**: split size groups by SHA-256 (see [`resolve_digests`])
//!
//! Directories are independent of each other. A directory that cannot be
//! listed, or holds a file that cannot be read, is skipped for this run and
//! recorded in the [`ScanSummary`]; the rest of the tree is still processed.
//!
//! With `jobs > 1` the directories are listed first and then processed on
//! a rayon pool. Results are merged back in traversal order, so output is
//! identical to a sequential run.
//!
//! # Example
//!
//! ```no_run
//! use dupemark::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_jobs(4));
//! let (sets, summary) = finder.find_duplicates(Path::new("/srv/music")).unwrap();
//! println!("{} sets, {} reclaimable", sets.len(), summary.reclaimable_display());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;
use serde::Serialize;

use super::{group_by_size, resolve_digests, DigestStats, DupeSet, GroupingStats};
use crate::progress::{ProgressCallback, PHASE_SCAN};
use crate::scanner::{DirListing, Hasher, ScanError, Walker, WalkerConfig};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Number of directories processed concurrently. 1 means sequential.
    pub jobs: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field("jobs", &self.jobs)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            walker_config: WalkerConfig::default(),
            jobs: 1,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the number of concurrent directory jobs (minimum 1).
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Set the shutdown flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Duplicate sets found in one directory.
#[derive(Debug, Clone)]
pub struct DirectoryBatch {
    /// Directory the sets belong to
    pub dir: PathBuf,
    /// Sets in creation order
    pub sets: Vec<DupeSet>,
    /// Size grouping statistics for this directory
    pub grouping: GroupingStats,
    /// Digest statistics for this directory
    pub digests: DigestStats,
}

/// A directory left out of this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDirectory {
    /// Directory that was skipped
    pub dir: PathBuf,
    /// File or directory that caused the failure
    pub path: PathBuf,
    /// Human-readable cause
    pub reason: String,
}

impl SkippedDirectory {
    fn from_scan_error(error: &ScanError) -> Self {
        let path = error.path().to_path_buf();
        Self {
            dir: path.clone(),
            path,
            reason: error.to_string(),
        }
    }
}

/// Outcome of processing a single directory.
pub type BatchResult = Result<DirectoryBatch, SkippedDirectory>;

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSummary {
    /// Directories listed and resolved
    pub dirs_scanned: usize,
    /// Directories skipped because of errors
    pub dirs_skipped: usize,
    /// Regular files seen
    pub total_files: usize,
    /// Total size of all seen files in bytes
    pub total_size: u64,
    /// Files sharing a size with a sibling
    pub candidates: usize,
    /// Files read and digested
    pub files_digested: usize,
    /// Bytes read while digesting
    pub bytes_digested: u64,
    /// Duplicate sets found
    pub duplicate_sets: usize,
    /// Redundant copies found (excluding canonicals)
    pub duplicate_files: usize,
    /// Bytes held by the redundant copies
    pub reclaimable_space: u64,
    /// Wall-clock duration of the scan
    #[serde(skip)]
    pub scan_duration: Duration,
    /// Directories skipped, in traversal order
    pub skipped: Vec<SkippedDirectory>,
}

impl ScanSummary {
    fn record(&mut self, result: BatchResult, sets: &mut Vec<DupeSet>) {
        match result {
            Ok(batch) => {
                self.dirs_scanned += 1;
                self.total_files += batch.grouping.total_files;
                self.total_size += batch.grouping.total_size;
                self.candidates += batch.grouping.potential_duplicates;
                self.files_digested += batch.digests.files_digested;
                self.bytes_digested += batch.digests.bytes_digested;
                for set in &batch.sets {
                    self.duplicate_sets += 1;
                    self.duplicate_files += set.duplicate_count();
                    self.reclaimable_space += set.wasted_space();
                }
                sets.extend(batch.sets);
            }
            Err(skipped) => {
                self.dirs_skipped += 1;
                self.skipped.push(skipped);
            }
        }
    }

    /// Whether any directory was skipped.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.skipped.is_empty()
    }

    /// Percentage of total size held by redundant copies.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The root could not be resolved.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Main duplicate finder.
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self {
            config,
            hasher: Hasher::new(),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Resolve `root` to an absolute directory and build a walker for it.
    ///
    /// # Errors
    ///
    /// `PathNotFound` if `root` does not exist, `NotADirectory` if it is a
    /// file, `Io` if it cannot be resolved for another reason.
    pub fn walker(&self, root: &Path) -> Result<Walker, FinderError> {
        let resolved = fs::canonicalize(root).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FinderError::PathNotFound(root.to_path_buf()),
            _ => FinderError::Io {
                path: root.to_path_buf(),
                source: e,
            },
        })?;
        if !resolved.is_dir() {
            return Err(FinderError::NotADirectory(root.to_path_buf()));
        }

        let mut walker = Walker::new(&resolved, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }
        Ok(walker)
    }

    /// Group and digest one directory listing.
    ///
    /// # Errors
    ///
    /// Returns the skipped directory if any candidate file cannot be read.
    pub fn process_listing(&self, listing: DirListing) -> BatchResult {
        let (groups, grouping) = group_by_size(&listing.files);
        log::debug!(
            "{}: {} files, {} candidates ({:.1}% eliminated by size)",
            listing.dir.display(),
            grouping.total_files,
            grouping.potential_duplicates,
            grouping.elimination_rate()
        );
        match resolve_digests(&listing.dir, &groups, &self.hasher) {
            Ok((sets, digests)) => Ok(DirectoryBatch {
                dir: listing.dir,
                sets,
                grouping,
                digests,
            }),
            Err(e) => {
                log::warn!("Skipping {}: {}", listing.dir.display(), e);
                Err(SkippedDirectory {
                    path: e.path().to_path_buf(),
                    dir: listing.dir,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Lazily process each directory of `walker` in traversal order.
    ///
    /// Nothing is buffered: each `next()` lists, groups and digests exactly
    /// one directory.
    pub fn scan_batches<'a>(
        &'a self,
        walker: &'a Walker,
    ) -> impl Iterator<Item = BatchResult> + 'a {
        walker.walk().map(move |item| match item {
            Ok(listing) => self.process_listing(listing),
            Err(e) => Err(SkippedDirectory::from_scan_error(&e)),
        })
    }

    /// Find all duplicate sets under `root`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist or is not a directory
    /// - The scan is interrupted by shutdown signal
    ///
    /// Per-directory failures are not errors; they are listed in
    /// [`ScanSummary::skipped`].
    pub fn find_duplicates(&self, root: &Path) -> Result<(Vec<DupeSet>, ScanSummary), FinderError> {
        let walker = self.walker(root)?;
        self.find_duplicates_in(&walker)
    }

    /// Find all duplicate sets under an already resolved walker.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::Interrupted` if the shutdown flag is set before
    /// or during the scan.
    pub fn find_duplicates_in(
        &self,
        walker: &Walker,
    ) -> Result<(Vec<DupeSet>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        log::info!("Starting duplicate scan of {}", walker.root().display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_SCAN, 0);
        }

        let results = if self.config.jobs > 1 {
            self.run_parallel(walker)
        } else {
            self.scan_batches(walker)
                .enumerate()
                .map(|(i, result)| {
                    self.report_progress(i + 1, &result);
                    result
                })
                .collect()
        };

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_SCAN);
        }

        if self.config.is_shutdown_requested() {
            log::info!("Scan interrupted after {} directories", results.len());
            return Err(FinderError::Interrupted);
        }

        let mut sets = Vec::new();
        let mut summary = ScanSummary::default();
        for result in results {
            summary.record(result, &mut sets);
        }
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} directories, {} files, {} duplicate set(s), {} duplicate file(s)",
            summary.dirs_scanned,
            summary.total_files,
            summary.duplicate_sets,
            summary.duplicate_files
        );
        log::debug!(
            "Reclaimable: {} of {} ({:.1}%)",
            summary.reclaimable_display(),
            summary.total_size_display(),
            summary.wasted_percentage()
        );
        if summary.has_errors() {
            log::warn!("{} directories skipped due to errors", summary.dirs_skipped);
        }

        Ok((sets, summary))
    }

    fn run_parallel(&self, walker: &Walker) -> Vec<BatchResult> {
        let listings: Vec<Result<DirListing, ScanError>> = walker.walk().collect();
        log::debug!(
            "Processing {} directories on {} threads",
            listings.len(),
            self.config.jobs
        );

        let process = |listings: Vec<Result<DirListing, ScanError>>| -> Vec<BatchResult> {
            listings
                .into_par_iter()
                .map(|item| {
                    // Placeholder only; an interrupted run discards all results.
                    if self.config.is_shutdown_requested() {
                        return Err(SkippedDirectory {
                            dir: PathBuf::new(),
                            path: PathBuf::new(),
                            reason: "interrupted".to_string(),
                        });
                    }
                    match item {
                        Ok(listing) => self.process_listing(listing),
                        Err(e) => Err(SkippedDirectory::from_scan_error(&e)),
                    }
                })
                .collect()
        };

        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs)
            .build()
        {
            Ok(pool) => pool.install(|| process(listings)),
            Err(e) => {
                log::warn!(
                    "Failed to create thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                process(listings)
            }
        };

        for (i, result) in results.iter().enumerate() {
            self.report_progress(i + 1, result);
        }
        results
    }

    fn report_progress(&self, count: usize, result: &BatchResult) {
        if let Some(ref callback) = self.config.progress_callback {
            let dir = match result {
                Ok(batch) => &batch.dir,
                Err(skipped) => &skipped.dir,
            };
            callback.on_progress(count, dir.to_string_lossy().as_ref());
        }
    }
}
