//! File actions module.
//!
//! Duplicates are marked by renaming, never deleted. See [`mark`] for how
//! the new names are built and how failures are handled.
//!
//! ```no_run
//! use dupemark::actions::{mark_file, RenamePlan};
//! use std::path::PathBuf;
//!
//! let plan = RenamePlan {
//!     from: PathBuf::from("/srv/music/b.mp3"),
//!     to: PathBuf::from("/srv/music/b.mp3.dupe"),
//!     size: 4096,
//! };
//! let result = mark_file(&plan);
//! ```

pub mod mark;

pub use mark::{
    apply_marks, mark_file, marked_path, plan_marks, BatchMarkResult, MarkConfig, MarkError,
    MarkProgressCallback, MarkResult, RenamePlan,
};
