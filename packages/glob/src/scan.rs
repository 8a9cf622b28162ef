//! Fast file enumeration using jwalk.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};

use crate::error::GlobError;

/// List the regular files under `root`.
///
/// - If `recursive` is false only direct children are returned
/// - Hidden files are included
/// - Symlinks are returned when they resolve to a regular file
///
/// The result is sorted for stable ordering.
///
/// # Errors
///
/// * If `root` cannot be read
pub fn list_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, GlobError> {
    log::debug!(
        "Listing files in {} (recursive={recursive})",
        root.display()
    );

    let mut walk = jwalk::WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .sort(false);
    if !recursive {
        walk = walk.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walk {
        let entry = entry.map_err(|e| GlobError::EnumerationError {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;

        let path = entry.path();

        // Skip the root directory itself
        if path == root {
            continue;
        }

        let file_type = entry.file_type();
        if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
            files.push(path);
        }
    }

    files.sort();
    log::debug!("Found {} files", files.len());

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn populate(dir: &Path) {
        fs::write(dir.join("a.mp3"), "a").unwrap();
        fs::write(dir.join(".hidden"), "h").unwrap();
        fs::create_dir_all(dir.join("nested/deeper")).unwrap();
        fs::write(dir.join("nested/b.mp3"), "b").unwrap();
        fs::write(dir.join("nested/deeper/c.mp3"), "c").unwrap();
    }

    #[test]
    fn test_list_files_flat() {
        let dir = TempDir::new().unwrap();
        populate(dir.path());

        let files = list_files(dir.path(), false).unwrap();

        assert_eq!(
            files,
            vec![dir.path().join(".hidden"), dir.path().join("a.mp3")]
        );
    }

    #[test]
    fn test_list_files_recursive() {
        let dir = TempDir::new().unwrap();
        populate(dir.path());

        let files = list_files(dir.path(), true).unwrap();

        assert_eq!(files.len(), 4);
        assert!(files.contains(&dir.path().join("nested/deeper/c.mp3")));
        assert!(files.iter().all(|p| p.is_file()));
    }

    #[test]
    fn test_list_files_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert!(list_files(dir.path(), true).unwrap().is_empty());
    }
}
