//! Aggregate copy statistics.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::record::{CopyOutcome, CopyRecord};

/// Maximum number of records kept in the history.
pub const HISTORY_LIMIT: usize = 1000;

/// Point-in-time copy of the aggregate counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Files copied successfully.
    pub total_copied: u64,
    /// Files that failed after all attempts.
    pub total_failed: u64,
    /// Files skipped by gating or collision rules.
    pub total_skipped: u64,
    /// Bytes copied successfully.
    pub total_bytes: u64,
    /// Successful copies that were digest-verified.
    pub total_verified: u64,
    /// Destination of the most recent successful copy.
    pub last_copied_path: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct StatsInner {
    totals: StatsSnapshot,
    history: VecDeque<CopyRecord>,
}

/// Thread-safe copy statistics with a bounded history.
///
/// History is kept in completion order; once it holds [`HISTORY_LIMIT`]
/// records the oldest is evicted for each new one. Counters cover every
/// record ever added.
#[derive(Debug, Default)]
pub struct CopyStats {
    inner: Mutex<StatsInner>,
}

impl CopyStats {
    /// Create empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StatsInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a finalized record.
    pub fn record(&self, rec: CopyRecord) {
        let mut inner = self.lock();

        match rec.outcome() {
            CopyOutcome::Skipped => inner.totals.total_skipped += 1,
            CopyOutcome::Copied => {
                inner.totals.total_copied += 1;
                inner.totals.total_bytes += rec.size_bytes;
                if rec.verified {
                    inner.totals.total_verified += 1;
                }
                inner.totals.last_copied_path.clone_from(&rec.destination);
            }
            CopyOutcome::Failed => inner.totals.total_failed += 1,
        }

        if inner.history.len() == HISTORY_LIMIT {
            inner.history.pop_front();
        }
        inner.history.push_back(rec);
    }

    /// Current counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        self.lock().totals.clone()
    }

    /// Number of records currently held in the history.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.lock().history.len()
    }

    /// The full history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<CopyRecord> {
        self.lock().history.iter().cloned().collect()
    }

    /// Up to `limit` most recent records, oldest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<CopyRecord> {
        let inner = self.lock();
        let skip = inner.history.len().saturating_sub(limit);
        inner.history.iter().skip(skip).cloned().collect()
    }
}
