//! Moving bytes from source to destination.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs;
use std::path::Path;

use crate::error::CopyError;

/// One copy attempt of a single file.
///
/// The engine validates the result afterwards, so an implementation only
/// has to report I/O failures.
pub trait Transfer: Send + Sync {
    /// Copy `source` to `target`, replacing `target` if it exists.
    ///
    /// # Errors
    ///
    /// * If the bytes cannot be copied
    fn transfer(&self, source: &Path, target: &Path) -> Result<(), CopyError>;
}

/// Local file system transfer: reflink when possible, then a regular copy,
/// keeping permissions and modification time.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTransfer;

impl Transfer for FsTransfer {
    fn transfer(&self, source: &Path, target: &Path) -> Result<(), CopyError> {
        copy_file_with_reflink(source, target)?;
        preserve_modified(source, target)
    }
}

/// Copy a single file, trying reflink first then falling back to regular copy.
fn copy_file_with_reflink(source: &Path, target: &Path) -> Result<(), CopyError> {
    // Reflink only creates new files; overwrites go through fs::copy
    if !target.exists() {
        match reflink_copy::reflink(source, target) {
            Ok(()) => {
                log::trace!("Reflinked {} -> {}", source.display(), target.display());
                return Ok(());
            }
            Err(e) => {
                log::trace!("Reflink unavailable for {}: {e}", target.display());
            }
        }
    }

    fs::copy(source, target).map_err(|e| CopyError::FileCopyError {
        source_path: source.to_path_buf(),
        target_path: target.to_path_buf(),
        io_error: e,
    })?;
    log::trace!("Copied {} -> {}", source.display(), target.display());
    Ok(())
}

/// Carry the source's modification time over to the target.
fn preserve_modified(source: &Path, target: &Path) -> Result<(), CopyError> {
    let modified = fs::metadata(source)
        .and_then(|m| m.modified())
        .map_err(|e| CopyError::MetadataError {
            path: source.to_path_buf(),
            io_error: e,
        })?;

    // Setting times on Windows needs a handle with write access
    #[cfg(windows)]
    let file = fs::OpenOptions::new().write(true).open(target);
    #[cfg(not(windows))]
    let file = fs::File::open(target);

    file.and_then(|f| f.set_modified(modified))
        .map_err(|e| CopyError::PreserveTimesError {
            path: target.to_path_buf(),
            io_error: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_transfer_creates_new() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.txt");
        let target = dir.path().join("target.txt");
        fs::write(&source, "hello world").unwrap();

        FsTransfer.transfer(&source, &target).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "hello world");
    }

    #[test]
    fn test_transfer_overwrites_existing() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.txt");
        let target = dir.path().join("target.txt");
        fs::write(&source, "new content").unwrap();
        fs::write(&target, "old content that is longer").unwrap();

        FsTransfer.transfer(&source, &target).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new content");
    }

    #[test]
    fn test_transfer_preserves_modified_time() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.txt");
        let target = dir.path().join("target.txt");
        fs::write(&source, "content").unwrap();

        let past = SystemTime::now() - Duration::from_secs(3 * 24 * 60 * 60);
        fs::File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(past)
            .unwrap();

        FsTransfer.transfer(&source, &target).unwrap();

        let src_mtime = fs::metadata(&source).unwrap().modified().unwrap();
        let dst_mtime = fs::metadata(&target).unwrap().modified().unwrap();
        assert_eq!(src_mtime, dst_mtime);
    }

    #[test]
    fn test_transfer_missing_source() {
        let dir = TempDir::new().unwrap();
        let result = FsTransfer.transfer(&dir.path().join("nope"), &dir.path().join("target"));
        assert!(matches!(result, Err(CopyError::FileCopyError { .. })));
    }
}
