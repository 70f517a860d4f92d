//! Plain text report.
//!
//! ```text
//! Finding file dupes in /srv/music
//! Suspect file /srv/music/a.mp3 (size 4096, digest 9f86d0...) has 2 dupes:
//!   -- dupe 0: /srv/music/a (1).mp3
//!   -- dupe 1: /srv/music/copy of a.mp3
//! Marking 2 duplicated files.
//! Found 1 duplicate set(s); marked 2 file(s)
//! ```

use std::io::{self, Write};
use std::path::Path;

use crate::actions::{BatchMarkResult, RenamePlan};
use crate::duplicates::{DupeSet, ScanSummary};

/// Text report of the duplicate sets found under one root.
#[derive(Debug)]
pub struct TextOutput<'a> {
    root: &'a Path,
    sets: &'a [DupeSet],
}

impl<'a> TextOutput<'a> {
    /// Create a report for `sets` found under `root`.
    #[must_use]
    pub fn new(root: &'a Path, sets: &'a [DupeSet]) -> Self {
        Self { root, sets }
    }

    /// Write the header and one block per duplicate set.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "Finding file dupes in {}", self.root.display())?;
        for set in self.sets {
            let digest = set.digest.map(|d| d.to_hex()).unwrap_or_default();
            writeln!(
                writer,
                "Suspect file {} (size {}, digest {}) has {} dupes:",
                set.canonical.display(),
                set.size_bytes,
                digest,
                set.dupes.len()
            )?;
            for (i, dupe) in set.dupes.iter().enumerate() {
                writeln!(writer, "  -- dupe {}: {}", i, dupe.display())?;
            }
        }
        Ok(())
    }
}

/// Announce the renames about to be applied.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_marking<W: Write>(writer: &mut W, count: usize) -> io::Result<()> {
    writeln!(writer, "Marking {} duplicated files.", count)
}

/// List the renames a dry run would apply.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_plan<W: Write>(writer: &mut W, plans: &[RenamePlan]) -> io::Result<()> {
    writeln!(writer, "Would mark {} duplicated files (dry run):", plans.len())?;
    for plan in plans {
        writeln!(writer, "  {} -> {}", plan.from.display(), plan.to.display())?;
    }
    Ok(())
}

/// Closing line with set and mark counts, plus any skipped directories.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_totals<W: Write>(
    writer: &mut W,
    summary: &ScanSummary,
    marked: Option<&BatchMarkResult>,
) -> io::Result<()> {
    match marked {
        Some(result) if result.all_succeeded() => writeln!(
            writer,
            "Found {} duplicate set(s); marked {} file(s), {} reclaimable",
            summary.duplicate_sets,
            result.success_count(),
            summary.reclaimable_display()
        )?,
        Some(result) => writeln!(
            writer,
            "Found {} duplicate set(s); marked {} file(s), {} failed",
            summary.duplicate_sets,
            result.success_count(),
            result.failure_count()
        )?,
        None => writeln!(
            writer,
            "Found {} duplicate set(s); marked 0 file(s)",
            summary.duplicate_sets
        )?,
    }
    if summary.has_errors() {
        writeln!(writer, "Skipped {} directories:", summary.dirs_skipped)?;
        for skipped in &summary.skipped {
            writeln!(writer, "  {}: {}", skipped.dir.display(), skipped.reason)?;
        }
    }
    Ok(())
}
