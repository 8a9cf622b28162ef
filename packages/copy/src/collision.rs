//! Destination collision handling.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::options::CollisionMode;

/// Highest counter tried before falling back to a timestamp suffix.
pub const MAX_RENAME_COUNTER: u32 = 9_999;

/// Outcome of collision resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Copy to this path.
    Proceed(PathBuf),
    /// Destination exists and the mode says to leave it alone.
    Skip,
}

/// Expand a rename template.
///
/// Supported tokens:
///
/// * `{name}` - file name without extension
/// * `{ext}` - extension without the leading dot
/// * `{n}` - collision counter (1, 2, 3, ...)
/// * `{date}` - `YYYY-MM-DD`
/// * `{time}` - `HH-MM-SS`
/// * `{datetime}` - `YYYY-MM-DD_HH-MM-SS`
/// * `{ts}` - Unix timestamp in seconds
///
/// Unknown tokens are left as they are. When `ext` is empty a trailing dot
/// is dropped, so `{name}_{n}.{ext}` turns `README` into `README_1`.
#[must_use]
pub fn expand_rename_pattern(
    pattern: &str,
    name: &str,
    ext: &str,
    counter: u32,
    now: &DateTime<Local>,
) -> String {
    let mut expanded = String::with_capacity(pattern.len() + name.len());
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        let (literal, tail) = rest.split_at(open);
        expanded.push_str(literal);

        let Some(close) = tail.find('}') else {
            rest = tail;
            break;
        };

        match &tail[1..close] {
            "name" => expanded.push_str(name),
            "ext" => expanded.push_str(ext),
            "n" => expanded.push_str(&counter.to_string()),
            "date" => expanded.push_str(&now.format("%Y-%m-%d").to_string()),
            "time" => expanded.push_str(&now.format("%H-%M-%S").to_string()),
            "datetime" => expanded.push_str(&now.format("%Y-%m-%d_%H-%M-%S").to_string()),
            "ts" => expanded.push_str(&now.timestamp().to_string()),
            _ => expanded.push_str(&tail[..=close]),
        }
        rest = &tail[close + 1..];
    }
    expanded.push_str(rest);

    if ext.is_empty() {
        if let Some(stripped) = expanded.strip_suffix('.') {
            return stripped.to_string();
        }
    }
    expanded
}

/// Apply `mode` to `dest`, consulting the real file system.
#[must_use]
pub fn resolve_collision(dest: &Path, mode: CollisionMode, pattern: &str) -> Resolution {
    resolve_collision_with(dest, mode, pattern, &Local::now(), Path::exists)
}

/// Apply `mode` to `dest` using `exists` to check candidate paths.
pub(crate) fn resolve_collision_with<F>(
    dest: &Path,
    mode: CollisionMode,
    pattern: &str,
    now: &DateTime<Local>,
    exists: F,
) -> Resolution
where
    F: Fn(&Path) -> bool,
{
    if !exists(dest) {
        return Resolution::Proceed(dest.to_path_buf());
    }

    match mode {
        CollisionMode::Overwrite => Resolution::Proceed(dest.to_path_buf()),
        CollisionMode::Skip => Resolution::Skip,
        CollisionMode::Rename => {
            let stem = dest
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let ext = dest
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();
            let parent = dest.parent().unwrap_or_else(|| Path::new(""));

            for n in 1..=MAX_RENAME_COUNTER {
                let candidate =
                    parent.join(expand_rename_pattern(pattern, &stem, &ext, n, now));
                if !exists(&candidate) {
                    log::debug!(
                        "Collision on {}, using {}",
                        dest.display(),
                        candidate.display()
                    );
                    return Resolution::Proceed(candidate);
                }
            }

            let fallback = if ext.is_empty() {
                format!("{stem}_{}", now.timestamp())
            } else {
                format!("{stem}_{}.{ext}", now.timestamp())
            };
            log::warn!(
                "Rename counter exhausted for {}, falling back to {fallback}",
                dest.display()
            );
            Resolution::Proceed(parent.join(fallback))
        }
    }
}
