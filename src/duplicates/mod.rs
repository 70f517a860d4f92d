//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based grouping of one directory's files
//! - Digest-based resolution of size groups into duplicate sets
//! - Orchestration over a whole directory tree
//!
//! Detection never crosses directory boundaries: identical files in two
//! different directories are not duplicates of each other.

pub mod finder;
pub mod groups;
pub mod resolver;

pub use finder::{
    BatchResult, DirectoryBatch, DuplicateFinder, FinderConfig, FinderError, ScanSummary,
    SkippedDirectory,
};
pub use groups::{group_by_size, GroupingStats, SizeGroup};
pub use resolver::{resolve_digests, DigestStats, DupeSet};
