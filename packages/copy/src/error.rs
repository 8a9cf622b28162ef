//! Error types for copy operations.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

/// Errors that can occur during copy operations.
///
/// Per-file errors end up as the error text of a
/// [`CopyRecord`](crate::CopyRecord) rather than being returned.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    /// The source disappeared before it could be copied.
    #[error("Source file no longer exists: {}", path.display())]
    SourceVanished {
        /// The source path.
        path: PathBuf,
    },

    /// Failed to get file metadata.
    #[error("Failed to get metadata for {}: {io_error}", path.display())]
    MetadataError {
        /// The file path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to create target directory.
    #[error("Failed to create directory {}: {io_error}", path.display())]
    CreateDirError {
        /// The directory path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to copy a file.
    #[error("Failed to copy {} to {}: {io_error}", source_path.display(), target_path.display())]
    FileCopyError {
        /// Source file path.
        source_path: PathBuf,
        /// Target file path.
        target_path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to carry the modification time over to the copy.
    #[error("Failed to preserve modification time on {}: {io_error}", path.display())]
    PreserveTimesError {
        /// The target path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to read a file while hashing it.
    #[error("Failed to hash {}: {io_error}", path.display())]
    HashError {
        /// The file path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Source and destination digests differ.
    #[error("Verification failed: SHA-256 mismatch (src={source_digest}… dst={target_digest}…)")]
    ChecksumMismatch {
        /// First 12 hex characters of the source digest.
        source_digest: String,
        /// First 12 hex characters of the destination digest.
        target_digest: String,
    },

    /// Destination is missing or has the wrong size after copying.
    #[error("Post-copy size mismatch for {}: expected {expected} bytes, found {}", path.display(), describe_size(*actual))]
    SizeMismatch {
        /// The destination path.
        path: PathBuf,
        /// Size of the source.
        expected: u64,
        /// Size of the destination, if it exists.
        actual: Option<u64>,
    },

    /// Failed to start a copy worker.
    #[error("Failed to spawn copy worker for {}: {io_error}", path.display())]
    SpawnError {
        /// The source path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Source enumeration failed.
    #[error(transparent)]
    EnumerationError(#[from] stream_watcher_glob::GlobError),
}

fn describe_size(size: Option<u64>) -> String {
    size.map_or_else(|| "nothing".to_string(), |n| format!("{n} bytes"))
}
