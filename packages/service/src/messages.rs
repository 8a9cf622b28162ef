//! Announcement texts.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use stream_watcher_copy::{CopyOutcome, CopyRecord};

/// Sent when the watcher starts from a stopped state.
pub const SYNC_STARTED: &str = "Sync started.";
/// Sent on every stop request, including one while already stopped.
pub const SYNC_STOPPED: &str = "Sync stopped.";
/// Sent when a toggle pauses a running watcher.
pub const SYNC_PAUSED: &str = "Sync paused.";
/// Sent when a toggle resumes a paused watcher.
pub const SYNC_RESUMED: &str = "Sync resumed.";
/// Sent after new settings were saved and applied.
pub const SYNC_RESTARTED: &str = "Settings saved. Sync restarted.";
/// Sent when a manual sweep is requested while stopped.
pub const NOT_RUNNING: &str = "Sync is not running. Cannot copy.";
/// Sent before a manual sweep enqueues the source folder.
pub const COPYING_NOW: &str = "Copying all pending files now.";

/// Longest error excerpt included in a failure announcement.
const ERROR_EXCERPT_CHARS: usize = 60;

/// Announcement for a manual sweep that spawned `count` copies.
#[must_use]
pub fn queued(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("Queued {count} file{plural} for copy.")
}

/// Announcement for a finalized copy.
#[must_use]
pub fn completion(rec: &CopyRecord) -> String {
    let name = rec.display_name();
    match rec.outcome() {
        CopyOutcome::Skipped => format!("Skipped {name}."),
        CopyOutcome::Copied if rec.verified => format!("Copied {name} (verified)."),
        CopyOutcome::Copied => format!("Copied {name}."),
        CopyOutcome::Failed => {
            let error: String = rec
                .error
                .as_deref()
                .unwrap_or("unknown error")
                .chars()
                .take(ERROR_EXCERPT_CHARS)
                .collect();
            format!("Copy failed: {error}.")
        }
    }
}
