//! Folder watching for stream-watcher.
//!
//! This crate turns raw file system notifications into "file is ready"
//! callbacks:
//!
//! * OS notifications via `notify`, handed to a dispatch thread over a channel
//! * Name filtering with include/exclude globs and extension allow-lists
//! * Stability tracking: a file is ready once its size stops changing
//!
//! # Example
//!
//! ```rust,ignore
//! use stream_watcher_watch::{FolderWatcher, WatchOptions};
//!
//! let watcher = FolderWatcher::new(WatchOptions::new("/recordings"), |path| {
//!     println!("ready: {}", path.display());
//! })?;
//! watcher.start()?;
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod handler;
mod tracker;
mod watcher;

pub use error::WatchError;
pub use handler::EventHandler;
pub use tracker::{DEFAULT_POLL_INTERVAL, StabilityTracker};
pub use watcher::{FolderWatcher, WatchOptions};
