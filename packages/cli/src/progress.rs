//! Progress bar utilities for the CLI.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::io::Write;
use std::sync::Arc;

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use stream_watcher_copy::{CopyOutcome, CopyRecord};

use crate::output::format_bytes;

/// Progress bar manager for copy sweeps.
pub struct ProgressManager {
    multi: Arc<MultiProgress>,
    enabled: bool,
}

impl ProgressManager {
    /// Create a new progress manager.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            multi: Arc::new(MultiProgress::new()),
            enabled,
        }
    }

    /// Create a progress bar counting finished copies.
    ///
    /// If progress is disabled, returns a hidden progress bar.
    #[must_use]
    pub fn create_file_bar(&self, label: &str, total: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::default_bar()
            .template("  {prefix:<12} [{bar:25.green/dim}] {pos}/{len} files")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━━─");

        let pb = self.multi.add(ProgressBar::new(total));
        pb.set_style(style);
        pb.set_prefix(label.to_string());
        pb
    }

    /// Print the result line for one copy above any active bars.
    pub fn print_record(&self, rec: &CopyRecord) {
        let line = describe_record(rec);
        self.multi.suspend(|| println!("{line}"));
        let _ = std::io::stdout().flush();
    }

    /// Clear any active progress bars (for clean output after completion).
    pub fn clear(&self) {
        self.multi.clear().ok();
    }
}

/// One result line: a marker, the file name, and what happened.
fn describe_record(rec: &CopyRecord) -> String {
    let name = rec.display_name();
    let error = rec.error.as_deref().unwrap_or("unknown error");

    match rec.outcome() {
        CopyOutcome::Copied => format!(
            "{} {:<30} {}",
            "✓".green(),
            name,
            format!(
                "{}{}",
                format_bytes(rec.size_bytes),
                if rec.verified { ", verified" } else { "" }
            )
            .dimmed()
        ),
        CopyOutcome::Skipped => format!("{} {:<30} {}", "•".dimmed(), name, error.dimmed()),
        CopyOutcome::Failed => format!("{} {:<30} {}", "✗".red(), name, error.red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_describe_record() {
        colored::control::set_override(false);

        let mut rec = CopyRecord::new(Path::new("/in/show.mp4"));
        rec.destination = Some(PathBuf::from("/out/show_1.mp4"));
        rec.size_bytes = 2048;
        rec.success = true;
        rec.verified = true;
        assert!(describe_record(&rec).ends_with("2.0 KiB, verified"));
        assert!(describe_record(&rec).contains("show_1.mp4"));

        rec.success = false;
        rec.error = Some("Verification failed".to_string());
        assert!(describe_record(&rec).starts_with("✗ show_1.mp4"));
        assert!(describe_record(&rec).ends_with("Verification failed"));
    }
}
