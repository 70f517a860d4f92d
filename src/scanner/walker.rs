//! Directory walker producing one listing per directory.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct, which traverses a directory
//! tree with [`walkdir`] and yields a [`DirListing`] for every directory it
//! visits. Each listing maps file names to sizes for the regular files that
//! sit directly in that directory.
//!
//! # Features
//!
//! - Sorted, deterministic traversal order
//! - Lazy: one directory is listed per `next()` call
//! - Files carrying the marker suffix are filtered out
//! - Optional symlink following with loop detection
//! - Hidden file filtering
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupemark::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/srv/music"), WalkerConfig::default());
//! let listings: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Visited {} directories", listings.len());
//! ```

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::{DirListing, FileEntry, ScanError, WalkerConfig};

/// Directory walker yielding per-directory file listings.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set, the walk ends after the current directory.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Root directory of this walk.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the directory tree, yielding one listing per directory.
    ///
    /// The root directory itself is listed first, followed by its
    /// subdirectories depth-first in file name order. Errors are yielded
    /// as [`ScanError`] values rather than stopping iteration; a directory
    /// that cannot be listed is reported once and its subtree is skipped.
    pub fn walk(&self) -> impl Iterator<Item = Result<DirListing, ScanError>> + '_ {
        let skip_hidden = self.config.skip_hidden;
        let mut reported: HashSet<PathBuf> = HashSet::new();

        WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| e.depth() == 0 || !(skip_hidden && is_hidden(e.file_name())))
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    if !entry.file_type().is_dir() {
                        return None;
                    }
                    let dir = entry.into_path();
                    match self.list_directory(&dir) {
                        Ok(listing) => Some(Ok(listing)),
                        Err(e) => {
                            log::warn!("Cannot list {}: {}", dir.display(), e);
                            reported.insert(dir);
                            Some(Err(e))
                        }
                    }
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf);
                    if reported.contains(&path) {
                        // Already surfaced when listing the directory.
                        return None;
                    }
                    Some(Err(self.handle_walkdir_error(path, e)))
                }
            })
    }

    /// List the regular files directly inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the directory or one of its entries cannot
    /// be read. Entries that vanish mid-listing are skipped.
    pub fn list_directory(&self, dir: &Path) -> Result<DirListing, ScanError> {
        let mut listing = DirListing::new(dir);
        let read_dir = fs::read_dir(dir).map_err(|e| ScanError::from_io(dir, e))?;

        for child in read_dir {
            let child = child.map_err(|e| ScanError::from_io(dir, e))?;
            let file_name = child.file_name();
            let Some(name) = file_name.to_str() else {
                log::warn!(
                    "Skipping non-UTF-8 file name in {}: {:?}",
                    dir.display(),
                    file_name
                );
                continue;
            };

            if self.config.skip_hidden && is_hidden(&file_name) {
                continue;
            }
            if self.config.is_marked(name) {
                log::trace!("Skipping marked file: {}", name);
                continue;
            }

            let path = child.path();
            let metadata = if self.config.follow_symlinks {
                fs::metadata(&path)
            } else {
                child.metadata()
            };
            let metadata = match metadata {
                Ok(m) => m,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::debug!("File not found (may have been moved): {}", path.display());
                    continue;
                }
                Err(e) => return Err(ScanError::from_io(&path, e)),
            };

            if !metadata.is_file() {
                continue;
            }
            listing.insert(FileEntry::new(name, metadata.len()));
        }

        log::debug!("Listed {}: {} files", dir.display(), listing.len());
        Ok(listing)
    }

    fn handle_walkdir_error(&self, path: PathBuf, error: walkdir::Error) -> ScanError {
        log::warn!("Walker error for {}: {}", path.display(), error);
        if error.loop_ancestor().is_some() {
            return ScanError::SymlinkLoop(path);
        }
        let message = error.to_string();
        match error.into_io_error() {
            Some(io_err) => ScanError::from_io(&path, io_err),
            None => ScanError::Io {
                path,
                source: io::Error::other(message),
            },
        }
    }
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}
