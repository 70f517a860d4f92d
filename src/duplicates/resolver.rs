//! Digest-based resolution of size groups into duplicate sets.
//!
//! # Overview
//!
//! Equal size is only a hint. For every size group of one directory this
//! stage reads each member in full, computes its SHA-256 digest and
//! re-partitions the files by digest. The first file seen for a digest
//! becomes the canonical copy; later files with the same digest are listed
//! as its dupes. Digest groups that end up with no dupes (same size,
//! different content) are dropped.
//!
//! Any read failure aborts the whole directory: a partial answer could
//! promote the wrong file to canonical, so the caller skips the directory
//! for this run instead.
//!
//! # Example
//!
//! ```no_run
//! use dupemark::duplicates::{group_by_size, resolve_digests};
//! use dupemark::scanner::{Hasher, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let dir = Path::new("/srv/music/album");
//! let walker = Walker::new(dir, WalkerConfig::default());
//! let listing = walker.list_directory(dir).unwrap();
//!
//! let (groups, _) = group_by_size(&listing.files);
//! let (sets, _) = resolve_digests(dir, &groups, &Hasher::new()).unwrap();
//! for set in &sets {
//!     println!("{} has {} dupes", set.canonical.display(), set.dupes.len());
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::SizeGroup;
use crate::scanner::{Digest, HashError, Hasher};

/// A canonical file and the files found to be identical to it.
///
/// `dupes` never contains `canonical`, and is non-empty for every set
/// handed back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DupeSet {
    /// The copy that is kept unmarked
    pub canonical: PathBuf,
    /// Size in bytes shared by every member
    #[serde(rename = "size")]
    pub size_bytes: u64,
    /// Content digest shared by every member
    pub digest: Option<Digest>,
    /// Redundant copies, in discovery order
    pub dupes: Vec<PathBuf>,
}

impl DupeSet {
    /// Start a set with its canonical file and no dupes yet.
    #[must_use]
    pub fn new(canonical: PathBuf, size_bytes: u64, digest: Option<Digest>) -> Self {
        Self {
            canonical,
            size_bytes,
            digest,
            dupes: Vec::new(),
        }
    }

    /// Record another copy of the canonical file.
    pub fn push_dupe(&mut self, path: PathBuf) {
        debug_assert_ne!(path, self.canonical, "canonical file listed as its own dupe");
        self.dupes.push(path);
    }

    /// Whether at least one dupe was found.
    #[must_use]
    pub fn has_dupes(&self) -> bool {
        !self.dupes.is_empty()
    }

    /// Number of redundant copies.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.dupes.len()
    }

    /// Bytes taken up by the redundant copies.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size_bytes * self.dupes.len() as u64
    }

    /// Canonical file followed by every dupe.
    pub fn members(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.canonical.as_path()).chain(self.dupes.iter().map(PathBuf::as_path))
    }
}

/// Statistics from the digest stage of one or more directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestStats {
    /// Files read and digested
    pub files_digested: usize,
    /// Bytes read while digesting
    pub bytes_digested: u64,
    /// Digest groups dropped because they had a single member
    pub unique_digests: usize,
    /// Duplicate sets produced
    pub sets: usize,
}

impl DigestStats {
    /// Add another directory's statistics to this one.
    pub fn merge(&mut self, other: &DigestStats) {
        self.files_digested += other.files_digested;
        self.bytes_digested += other.bytes_digested;
        self.unique_digests += other.unique_digests;
        self.sets += other.sets;
    }
}

/// Resolve one directory's size groups into duplicate sets.
///
/// Groups are visited in the order given and names within a group in
/// their stored order, so canonical selection follows the size grouper's
/// shortest-name-first ordering. Returned sets are in creation order.
///
/// # Errors
///
/// Returns the first [`HashError`] encountered; no sets are returned for
/// the directory in that case.
pub fn resolve_digests(
    dir: &Path,
    groups: &[SizeGroup],
    hasher: &Hasher,
) -> Result<(Vec<DupeSet>, DigestStats), HashError> {
    let mut stats = DigestStats::default();
    let mut sets: Vec<DupeSet> = Vec::new();
    let mut by_digest: HashMap<Digest, usize> = HashMap::new();

    for group in groups.iter().filter(|g| g.has_duplicates()) {
        for name in &group.names {
            let path = dir.join(name);
            let digest = hasher.digest_file(&path)?;
            stats.files_digested += 1;
            stats.bytes_digested += group.size;

            match by_digest.get(&digest) {
                Some(&idx) => {
                    log::trace!(
                        "{} duplicates {}",
                        path.display(),
                        sets[idx].canonical.display()
                    );
                    sets[idx].push_dupe(path);
                }
                None => {
                    by_digest.insert(digest, sets.len());
                    sets.push(DupeSet::new(path, group.size, Some(digest)));
                }
            }
        }
    }

    let before = sets.len();
    sets.retain(DupeSet::has_dupes);
    stats.unique_digests = before - sets.len();
    stats.sets = sets.len();

    if !sets.is_empty() {
        log::debug!(
            "{}: {} duplicate set(s) from {} digested file(s)",
            dir.display(),
            sets.len(),
            stats.files_digested
        );
    }

    Ok((sets, stats))
}
