//! Copy engine configuration.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default rename template used when a destination already exists.
pub const DEFAULT_RENAME_PATTERN: &str = "{name}_{n}.{ext}";

/// What to do when the destination path already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionMode {
    /// Replace the existing file.
    Overwrite,
    /// Pick a fresh name from the rename template.
    #[default]
    Rename,
    /// Leave the existing file alone and record the copy as skipped.
    Skip,
}

impl CollisionMode {
    /// All modes, in display order.
    pub const ALL: [Self; 3] = [Self::Overwrite, Self::Rename, Self::Skip];
}

impl fmt::Display for CollisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overwrite => write!(f, "overwrite"),
            Self::Rename => write!(f, "rename"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for CollisionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "rename" => Ok(Self::Rename),
            "skip" => Ok(Self::Skip),
            other => Err(format!(
                "unknown collision mode {other:?} (expected overwrite, rename or skip)"
            )),
        }
    }
}

/// Options for a [`Copier`](crate::Copier). Fixed for the copier's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOptions {
    /// Mirror the sub-folder layout of the source root under the destination.
    pub preserve_structure: bool,
    /// Collision strategy.
    pub collision_mode: CollisionMode,
    /// Template for renamed files, see [`expand_rename_pattern`](crate::expand_rename_pattern).
    pub rename_pattern: String,
    /// Compare SHA-256 digests after copying.
    pub verify: bool,
    /// Skip files smaller than this many bytes. 0 disables the bound.
    pub min_size: u64,
    /// Skip files larger than this many bytes. 0 disables the bound.
    pub max_size: u64,
    /// Extra attempts after the first failed one.
    pub retry_count: u32,
    /// Pause between attempts.
    pub retry_delay: Duration,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            preserve_structure: false,
            collision_mode: CollisionMode::default(),
            rename_pattern: DEFAULT_RENAME_PATTERN.to_string(),
            verify: true,
            min_size: 0,
            max_size: 0,
            retry_count: 2,
            retry_delay: Duration::from_secs(5),
        }
    }
}

impl CopyOptions {
    /// Total number of attempts a file gets.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.retry_count.saturating_add(1)
    }

    /// Check `size` against the configured bounds.
    ///
    /// Returns the reason for rejection, or `None` if the size is allowed.
    /// Both bounds are inclusive.
    #[must_use]
    pub fn size_gate(&self, size: u64) -> Option<String> {
        if self.min_size > 0 && size < self.min_size {
            return Some(format!(
                "File too small ({size} < {} bytes)",
                self.min_size
            ));
        }
        if self.max_size > 0 && size > self.max_size {
            return Some(format!(
                "File too large ({size} > {} bytes)",
                self.max_size
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_bounds_admit_everything() {
        let options = CopyOptions::default();
        assert_eq!(options.size_gate(0), None);
        assert_eq!(options.size_gate(u64::MAX), None);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let options = CopyOptions {
            min_size: 10,
            max_size: 20,
            ..CopyOptions::default()
        };
        assert_eq!(options.size_gate(10), None);
        assert_eq!(options.size_gate(20), None);
        assert_eq!(
            options.size_gate(9).as_deref(),
            Some("File too small (9 < 10 bytes)")
        );
        assert_eq!(
            options.size_gate(21).as_deref(),
            Some("File too large (21 > 20 bytes)")
        );
    }

    #[test]
    fn test_collision_mode_parsing() {
        assert_eq!("Skip".parse::<CollisionMode>(), Ok(CollisionMode::Skip));
        assert_eq!(
            " overwrite ".parse::<CollisionMode>(),
            Ok(CollisionMode::Overwrite)
        );
        assert!("merge".parse::<CollisionMode>().is_err());
        assert_eq!(CollisionMode::Rename.to_string(), "rename");
    }

    #[test]
    fn test_max_attempts() {
        let options = CopyOptions {
            retry_count: 3,
            ..CopyOptions::default()
        };
        assert_eq!(options.max_attempts(), 4);
    }
}
