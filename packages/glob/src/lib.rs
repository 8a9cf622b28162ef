//! Glob and extension filtering for stream-watcher.
//!
//! This crate decides which file system events are worth tracking and
//! enumerates the files under a watched root:
//!
//! * Case-insensitive include/exclude glob matching against file names
//! * Extension allow-lists
//! * Parallel directory enumeration using `jwalk`
//!
//! # Example
//!
//! ```rust,ignore
//! use stream_watcher_glob::{FileFilter, FilterOptions, list_files};
//!
//! let filter = FileFilter::new(&FilterOptions {
//!     extensions: vec!["mp3".to_string()],
//!     include_globs: vec![],
//!     exclude_globs: vec!["*.tmp".to_string()],
//! })?;
//!
//! for path in list_files(source, false)? {
//!     if filter.should_track(&path) {
//!         println!("{}", path.display());
//!     }
//! }
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod filter;
mod scan;

pub use error::GlobError;
pub use filter::{FileFilter, FilterOptions, normalize_extensions};
pub use scan::list_files;
