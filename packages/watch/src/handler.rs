//! Routing raw file system events into the stability tracker.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::Path;
use std::sync::{PoisonError, RwLock};

use notify::{Event, EventKind};
use stream_watcher_glob::FileFilter;

use crate::tracker::StabilityTracker;

/// Applies a [`FileFilter`] to create and modify events.
#[derive(Debug)]
pub struct EventHandler {
    filter: RwLock<FileFilter>,
}

impl EventHandler {
    /// Create a handler around a compiled filter.
    #[must_use]
    pub const fn new(filter: FileFilter) -> Self {
        Self {
            filter: RwLock::new(filter),
        }
    }

    /// Replace the extension allow-list.
    pub fn set_extensions(&self, extensions: &[String]) {
        self.filter
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_extensions(extensions);
    }

    /// Whether a path passes the filter.
    #[must_use]
    pub fn should_track(&self, path: &Path) -> bool {
        self.filter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .should_track(path)
    }

    /// Feed the qualifying paths of `event` to `tracker`.
    ///
    /// Only create and modify events are considered; directories are ignored.
    /// Returns the number of paths tracked.
    pub fn handle(&self, event: &Event, tracker: &StabilityTracker) -> usize {
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            return 0;
        }

        event
            .paths
            .iter()
            .filter(|path| !path.is_dir())
            .filter(|path| self.should_track(path))
            .filter(|path| tracker.track(path))
            .count()
    }
}
