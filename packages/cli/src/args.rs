//! CLI argument definitions.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CLI arguments for stream-watcher.
#[derive(Debug, Parser)]
#[command(
    name = "stream-watcher",
    about = "Watch a folder and copy new files once they stop changing",
    version
)]
pub struct Args {
    /// Settings file to use instead of the platform default.
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Disable progress bars (useful for CI environments).
    #[arg(long = "no-progress", global = true)]
    pub no_progress: bool,

    /// Enable verbose output.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Watch the source folder and copy files as they become stable.
    Run {
        /// Seconds between status lines. 0 disables them.
        #[arg(long, default_value_t = 60)]
        status_interval: u64,
    },

    /// Copy every file in the source folder once, then exit.
    CopyNow,

    /// Create or update the settings file interactively.
    Init,

    /// Print the settings file location and its effective contents.
    Config,
}

impl Args {
    /// Determine if we should show progress bars.
    #[must_use]
    pub const fn should_show_progress(&self) -> bool {
        !self.no_progress
    }
}
