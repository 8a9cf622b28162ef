//! Per-file copy outcome.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;

/// Record of one file's copy, covering every attempt made for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyRecord {
    /// The file that was copied.
    pub source: PathBuf,
    /// Where it was (or would have been) copied to.
    pub destination: Option<PathBuf>,
    /// Source size at the start of the copy.
    pub size_bytes: u64,
    /// When work on this file began.
    pub started: Option<DateTime<Local>>,
    /// When the record was finalized.
    pub finished: Option<DateTime<Local>>,
    /// The copy landed and passed validation.
    pub success: bool,
    /// Validation used matching content digests.
    pub verified: bool,
    /// The file was intentionally not copied.
    pub skipped: bool,
    /// Why the copy failed or was skipped.
    pub error: Option<String>,
    /// Number of copy attempts made.
    pub attempts: u32,
}

/// Coarse classification of a [`CopyRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Copied and validated.
    Copied,
    /// Deliberately not copied.
    Skipped,
    /// Gave up.
    Failed,
}

impl CopyRecord {
    /// Start a new record for `source`.
    #[must_use]
    pub fn new(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: None,
            size_bytes: 0,
            started: None,
            finished: None,
            success: false,
            verified: false,
            skipped: false,
            error: None,
            attempts: 0,
        }
    }

    /// Classify the record.
    #[must_use]
    pub const fn outcome(&self) -> CopyOutcome {
        if self.skipped {
            CopyOutcome::Skipped
        } else if self.success {
            CopyOutcome::Copied
        } else {
            CopyOutcome::Failed
        }
    }

    /// Time between start and finish, zero if either is missing.
    #[must_use]
    pub fn duration(&self) -> Duration {
        match (self.started, self.finished) {
            (Some(started), Some(finished)) => (finished - started).to_std().unwrap_or_default(),
            _ => Duration::ZERO,
        }
    }

    /// Completion time as `YYYY-MM-DD HH:MM:SS`, empty if unfinished.
    #[must_use]
    pub fn timestamp_str(&self) -> String {
        self.finished
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }

    /// File name to show users: the destination's if known, else the source's.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.destination
            .as_deref()
            .and_then(Path::file_name)
            .or_else(|| self.source.file_name())
            .map_or_else(|| "unknown".to_string(), |n| n.to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_outcome() {
        let mut rec = CopyRecord::new(Path::new("/src/a.mp3"));
        assert_eq!(rec.outcome(), CopyOutcome::Failed);
        rec.success = true;
        assert_eq!(rec.outcome(), CopyOutcome::Copied);
        rec.skipped = true;
        assert_eq!(rec.outcome(), CopyOutcome::Skipped);
    }

    #[test]
    fn test_duration_and_timestamp() {
        let mut rec = CopyRecord::new(Path::new("/src/a.mp3"));
        assert_eq!(rec.duration(), Duration::ZERO);
        assert_eq!(rec.timestamp_str(), "");

        let started = Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        rec.started = Some(started);
        rec.finished = Some(started + chrono::Duration::milliseconds(2500));

        assert_eq!(rec.duration(), Duration::from_millis(2500));
        assert_eq!(rec.timestamp_str(), "2024-05-01 12:00:02");
    }

    #[test]
    fn test_display_name_prefers_destination() {
        let mut rec = CopyRecord::new(Path::new("/src/a.mp3"));
        assert_eq!(rec.display_name(), "a.mp3");
        rec.destination = Some(PathBuf::from("/dst/a_1.mp3"));
        assert_eq!(rec.display_name(), "a_1.mp3");
    }
}
