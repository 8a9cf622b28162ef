//! Collision-safe, verified file copying for stream-watcher.
//!
//! This crate provides the copy side of the watcher:
//!
//! * One worker thread per file, with an in-flight counter and [`Copier::wait_idle`]
//! * Size gating and collision handling (overwrite, rename, skip)
//! * Copy-on-write support via `reflink-copy`, falling back to a byte copy
//! * SHA-256 verification, hashing source and destination in parallel
//! * Bounded retries with a fixed delay
//! * Aggregate statistics with a bounded history of [`CopyRecord`]s
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stream_watcher_copy::{Copier, CopyOptions};
//!
//! let copier = Arc::new(
//!     Copier::new("/recordings", "/archive", CopyOptions::default())
//!         .with_completion(|rec| println!("{}: {:?}", rec.display_name(), rec.outcome())),
//! );
//!
//! let queued = copier.copy_all_now();
//! copier.wait_idle(std::time::Duration::from_secs(600));
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod active;
mod collision;
mod engine;
mod error;
mod options;
mod record;
mod stats;
mod transfer;
mod verify;

pub use collision::{MAX_RENAME_COUNTER, Resolution, expand_rename_pattern, resolve_collision};
pub use engine::Copier;
pub use error::CopyError;
pub use options::{CollisionMode, CopyOptions, DEFAULT_RENAME_PATTERN};
pub use record::{CopyOutcome, CopyRecord};
pub use stats::{CopyStats, HISTORY_LIMIT, StatsSnapshot};
pub use transfer::{FsTransfer, Transfer};
pub use verify::sha256_file;
