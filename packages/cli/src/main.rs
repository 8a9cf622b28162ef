//! stream-watcher CLI entry point.
//!
//! Watches a folder and copies each new file to a destination once its size
//! has stopped changing.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod args;
mod interactive;
mod logging;
mod output;
mod progress;
mod signals;

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

use args::{Args, Command};
use progress::ProgressManager;
use stream_watcher_config::{
    Settings, default_config_path, default_log_path, load_or_init, load_settings, save_settings,
};
use stream_watcher_copy::{CopyOutcome, Copier};
use stream_watcher_service::{LogNotifier, SyncService};

/// How often the run loop checks for a shutdown signal.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

fn main() {
    let args = Args::parse();

    let config_path = match args.config.clone().map_or_else(default_config_path, Ok) {
        Ok(path) => path,
        Err(e) => {
            output::print_error(&e.to_string());
            std::process::exit(1);
        }
    };

    // Only the long-running commands keep a log file
    let log_path = matches!(args.command, Command::Run { .. } | Command::CopyNow)
        .then(default_log_path)
        .and_then(Result::ok);
    let settings = load_settings(&config_path).unwrap_or_default();
    logging::init(args.verbose, &settings, log_path.as_deref());

    if let Err(e) = run(&args, &config_path) {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Main application logic.
fn run(args: &Args, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        Command::Run { status_interval } => run_watch(config_path, status_interval),
        Command::CopyNow => run_copy_now(config_path, args.should_show_progress()),
        Command::Init => run_init(config_path),
        Command::Config => run_show_config(config_path),
    }
}

/// Load settings that must name both folders.
fn load_configured(config_path: &Path) -> Result<Settings, Box<dyn std::error::Error>> {
    let settings = load_or_init(config_path)?;
    if !settings.is_configured() {
        return Err(format!(
            "Source and destination folders are not set. Run `stream-watcher init` or edit {}",
            config_path.display()
        )
        .into());
    }
    Ok(settings)
}

fn run_watch(config_path: &Path, status_interval: u64) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_configured(config_path)?;

    output::print_header("Stream Watcher");
    output::print_settings(config_path, &settings);

    signals::install();

    let mut service = SyncService::new(settings, LogNotifier);
    service.start()?;
    println!("Watching for new files. Press Ctrl-C to stop.\n");

    let interval = Duration::from_secs(status_interval);
    let mut last_status = Instant::now();

    while !signals::shutdown_requested() {
        thread::sleep(SHUTDOWN_POLL);

        if status_interval > 0 && last_status.elapsed() >= interval {
            output::print_status(&service.status(0));
            last_status = Instant::now();
        }
    }

    println!();
    service.stop();

    let in_flight = service.status(0).active_copies;
    if in_flight > 0 {
        println!("Waiting for {in_flight} copies in progress...");
        while !service.wait_idle(Duration::from_secs(1)) {}
    }

    output::print_status(&service.status(0));
    output::print_success("Stream Watcher stopped.");
    Ok(())
}

fn run_copy_now(config_path: &Path, show_progress: bool) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_configured(config_path)?;

    output::print_header("Copy Now");
    output::print_settings(config_path, &settings);

    let copier = Arc::new(Copier::new(
        settings.source_root.clone(),
        settings.destination_root.clone(),
        settings.copy_options(),
    ));

    let handles = copier.spawn_all()?;
    if handles.is_empty() {
        println!(
            "No files to copy in {}.",
            settings.source_root.display()
        );
        return Ok(());
    }

    let progress_mgr = ProgressManager::new(show_progress);
    let bar = progress_mgr.create_file_bar("Copying", handles.len() as u64);

    let mut failed = 0usize;
    for handle in handles {
        match handle.join() {
            Ok(rec) => {
                if rec.outcome() == CopyOutcome::Failed {
                    failed += 1;
                }
                progress_mgr.print_record(&rec);
            }
            Err(_) => {
                failed += 1;
                output::print_warning("A copy worker panicked");
            }
        }
        bar.inc(1);
    }

    bar.finish_and_clear();
    progress_mgr.clear();

    println!();
    let totals = copier.stats().snapshot();
    println!(
        "{} copied, {} skipped, {} failed ({})",
        totals.total_copied,
        totals.total_skipped,
        failed,
        output::format_bytes(totals.total_bytes)
    );

    if failed > 0 {
        return Err(format!("{failed} file(s) could not be copied").into());
    }

    output::print_success("All files copied.");
    Ok(())
}

fn run_init(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    output::print_header("Stream Watcher Setup");

    let current = if config_path.exists() {
        load_settings(config_path)?
    } else {
        Settings::default()
    };

    let cwd = env::current_dir()?;
    let settings = interactive::prompt_settings(&current, &cwd)?;
    save_settings(config_path, &settings)?;

    println!();
    output::print_settings(config_path, &settings);
    output::print_success(&format!("Settings saved to {}", config_path.display()));
    Ok(())
}

fn run_show_config(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let settings: Settings = if config_path.exists() {
        load_settings(config_path)?
    } else {
        output::print_warning(&format!(
            "{} does not exist yet; showing defaults",
            config_path.display()
        ));
        Settings::default()
    };

    println!("{}", display_path(config_path).display());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

/// Absolute form of `path` for display.
fn display_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| path_clean::clean(cwd.join(path)))
}
