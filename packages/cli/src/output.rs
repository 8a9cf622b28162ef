//! Terminal output formatting.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::Path;

use colored::Colorize;
use stream_watcher_config::Settings;
use stream_watcher_service::StatusReport;

/// Print a header message.
pub fn print_header(message: &str) {
    println!("\n{} {}\n", "📼", message.bold());
}

/// Print the folders and the main copy settings.
pub fn print_settings(config_path: &Path, settings: &Settings) {
    println!("Config:      {}", config_path.display().to_string().dimmed());
    println!(
        "Source:      {}",
        settings.source_root.display().to_string().cyan()
    );
    println!(
        "Destination: {}",
        settings.destination_root.display().to_string().cyan()
    );
    println!(
        "Stable after {}s, collisions: {}, verify: {}",
        settings.stable_seconds,
        settings.collision_mode.to_string().yellow(),
        if settings.verify { "yes" } else { "no" }
    );
    println!();
}

/// Print a status line.
pub fn print_status(report: &StatusReport) {
    println!(
        "{} {} ({} pending, {} in flight, {} skipped, {})",
        "•".dimmed(),
        report.summary(),
        report.pending_count,
        report.active_copies,
        report.totals.total_skipped,
        format_bytes(report.totals.total_bytes)
    );
}

/// Print success message.
pub fn print_success(message: &str) {
    println!("{} {}", "✅", message);
}

/// Print error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", "Warning:".yellow().bold(), message);
}

/// Human-readable byte count, e.g. `1.5 MiB`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
