//! Point-in-time service status.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use stream_watcher_copy::{CopyRecord, StatsSnapshot};

/// Coarse service state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Source or destination folder missing.
    NotConfigured,
    /// Configured but not watching.
    Paused,
    /// Watching and copying.
    Active,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "Not configured"),
            Self::Paused => write!(f, "Paused"),
            Self::Active => write!(f, "Active"),
        }
    }
}

/// Snapshot of everything a status display needs.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Service state.
    pub state: SyncState,
    /// Aggregate copy counters.
    pub totals: StatsSnapshot,
    /// Copies in flight.
    pub active_copies: usize,
    /// Files waiting to become stable.
    pub pending_count: usize,
    /// The waiting files.
    pub pending_files: Vec<PathBuf>,
    /// Most recent copy records, oldest first.
    pub recent: Vec<CopyRecord>,
}

impl StatusReport {
    /// One-line summary, e.g. `Active — 3 copied, 0 failed`.
    #[must_use]
    pub fn summary(&self) -> String {
        match self.state {
            SyncState::Active => format!(
                "Active \u{2014} {} copied, {} failed",
                self.totals.total_copied, self.totals.total_failed
            ),
            state => state.to_string(),
        }
    }
}
