//! Report formatters for scan results.
//!
//! - [`text`]: line-oriented report for terminals and logs
//! - [`json`]: a single JSON document for scripting
//!
//! # Example
//!
//! ```no_run
//! use dupemark::duplicates::DuplicateFinder;
//! use dupemark::output::TextOutput;
//! use std::path::Path;
//!
//! let root = Path::new("/srv/music");
//! let finder = DuplicateFinder::with_defaults();
//! let (sets, _) = finder.find_duplicates(root).unwrap();
//!
//! TextOutput::new(root, &sets)
//!     .write_to(&mut std::io::stdout())
//!     .unwrap();
//! ```

pub mod json;
pub mod text;

pub use json::{JsonOutput, JsonOutputError, JsonRename, RenameStatus};
pub use text::TextOutput;
