//! Error types for watch operations.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while setting up a watch.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The watched folder does not exist or is not a directory.
    #[error("Source folder does not exist: {}", path.display())]
    SourceNotFound {
        /// The configured source root.
        path: PathBuf,
    },

    /// Failed to subscribe to file system notifications.
    #[error("Failed to watch {}: {source}", path.display())]
    NotifyError {
        /// The path being watched.
        path: PathBuf,
        /// The underlying notify error.
        #[source]
        source: notify::Error,
    },

    /// Failed to start a background thread.
    #[error("Failed to spawn {name} thread: {source}")]
    SpawnError {
        /// Thread name.
        name: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// An include or exclude pattern is invalid.
    #[error(transparent)]
    FilterError(#[from] stream_watcher_glob::GlobError),
}
