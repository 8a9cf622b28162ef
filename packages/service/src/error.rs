//! Error types for the sync service.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error;

/// Errors that can occur while starting sync.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Source or destination folder is not set.
    #[error("Stream Watcher is not configured: set both source_root and destination_root")]
    NotConfigured,

    /// The folder watcher could not start.
    #[error(transparent)]
    WatchError(#[from] stream_watcher_watch::WatchError),
}
