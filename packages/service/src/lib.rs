//! Sync service for stream-watcher.
//!
//! This crate wires [`Settings`](stream_watcher_config::Settings) to a folder
//! watcher and a copy engine, and reports what happens:
//!
//! * Start, stop, pause/resume and restart with new settings
//! * "Copy now" sweeps that bypass stability tracking
//! * Announcements through an injected [`Notifier`]
//! * Status snapshots for display or JSON output
//!
//! # Example
//!
//! ```rust,ignore
//! use stream_watcher_service::{LogNotifier, SyncService};
//!
//! let mut service = SyncService::new(settings, LogNotifier);
//! service.start()?;
//! println!("{}", service.status_summary());
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod messages;
mod notifier;
mod status;
mod sync;

pub use error::ServiceError;
pub use notifier::{ChannelNotifier, LogNotifier, Notifier, NullNotifier};
pub use status::{StatusReport, SyncState};
pub use sync::SyncService;
