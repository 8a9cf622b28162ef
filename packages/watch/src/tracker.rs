//! File stability tracking.
//!
//! A file is "stable" once its size has stopped changing for a configured
//! number of seconds. Candidates are re-checked by a background poll loop and
//! handed to a callback when they are promoted.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::WatchError;

/// How often tracked files are re-checked unless configured otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

type StableCallback = dyn Fn(&Path) + Send + Sync;

/// Last observed state of a candidate.
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    seen: Instant,
    size: u64,
}

struct Shared {
    pending: Mutex<BTreeMap<PathBuf, Snapshot>>,
    stable_secs: AtomicU64,
    on_stable: Box<StableCallback>,
}

impl Shared {
    fn lock_pending(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Snapshot>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn poll(&self, now: Instant) -> usize {
        let stable_after = Duration::from_secs(self.stable_secs.load(Ordering::Relaxed));
        let mut ready = Vec::new();

        self.lock_pending().retain(|path, snapshot| match fs::metadata(path) {
            Err(e) => {
                log::debug!("Dropping {} ({e})", path.display());
                false
            }
            Ok(metadata) if metadata.len() != snapshot.size => {
                *snapshot = Snapshot {
                    seen: now,
                    size: metadata.len(),
                };
                true
            }
            Ok(_) => {
                if now.saturating_duration_since(snapshot.seen) >= stable_after {
                    ready.push(path.clone());
                    false
                } else {
                    true
                }
            }
        });

        // Callbacks run without the lock held
        for path in &ready {
            log::info!("File stable: {}", path.display());
            if panic::catch_unwind(AssertUnwindSafe(|| (self.on_stable)(path))).is_err() {
                log::error!("Stable callback panicked for {}", path.display());
            }
        }

        ready.len()
    }
}

/// Stop flag for one run of the poll loop.
#[derive(Debug, Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    fn stop(&self) {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.wake.notify_all();
    }

    /// Wait up to `timeout` for a stop request. Returns `true` if stopped.
    fn wait(&self, timeout: Duration) -> bool {
        let stopped = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        let (stopped, _) = self
            .wake
            .wait_timeout_while(stopped, timeout, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *stopped
    }
}

struct Worker {
    handle: JoinHandle<()>,
    signal: Arc<StopSignal>,
}

/// Tracks candidate files until their size has been stable long enough.
pub struct StabilityTracker {
    shared: Arc<Shared>,
    poll_interval: Duration,
    worker: Mutex<Option<Worker>>,
}

impl fmt::Debug for StabilityTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StabilityTracker")
            .field("stable_seconds", &self.stable_seconds())
            .field("poll_interval", &self.poll_interval)
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

impl StabilityTracker {
    /// Create a stopped tracker that calls `on_stable` for each promoted file.
    #[must_use]
    pub fn new<F>(stable_seconds: u64, on_stable: F) -> Self
    where
        F: Fn(&Path) + Send + Sync + 'static,
    {
        Self {
            shared: Arc::new(Shared {
                pending: Mutex::new(BTreeMap::new()),
                stable_secs: AtomicU64::new(stable_seconds),
                on_stable: Box::new(on_stable),
            }),
            poll_interval: DEFAULT_POLL_INTERVAL,
            worker: Mutex::new(None),
        }
    }

    /// Use a different poll interval. Takes effect on the next [`Self::start`].
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn lock_worker(&self) -> MutexGuard<'_, Option<Worker>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current stability threshold in seconds.
    #[must_use]
    pub fn stable_seconds(&self) -> u64 {
        self.shared.stable_secs.load(Ordering::Relaxed)
    }

    /// Change the stability threshold. Negative values clamp to zero.
    pub fn set_stable_seconds(&self, seconds: i64) {
        let seconds = u64::try_from(seconds).unwrap_or(0);
        self.shared.stable_secs.store(seconds, Ordering::Relaxed);
        log::debug!("Stability threshold set to {seconds}s");
    }

    /// The poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Register `path`, or refresh it if already tracked.
    ///
    /// Returns `false` (and tracks nothing) unless `path` is a regular file.
    pub fn track(&self, path: &Path) -> bool {
        let Ok(metadata) = fs::metadata(path) else {
            return false;
        };
        if !metadata.is_file() {
            return false;
        }

        self.shared.lock_pending().insert(
            path.to_path_buf(),
            Snapshot {
                seen: Instant::now(),
                size: metadata.len(),
            },
        );
        log::debug!("Tracking {} (size={})", path.display(), metadata.len());
        true
    }

    /// Number of files awaiting stability.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared.lock_pending().len()
    }

    /// Files awaiting stability, sorted by path.
    #[must_use]
    pub fn pending_files(&self) -> Vec<PathBuf> {
        self.shared.lock_pending().keys().cloned().collect()
    }

    /// Run one poll cycle as of `now` and return the number of files promoted.
    pub fn poll_at(&self, now: Instant) -> usize {
        self.shared.poll(now)
    }

    /// Whether the background poll loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock_worker()
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }

    /// Start the background poll loop. Does nothing if already running.
    ///
    /// # Errors
    ///
    /// * If the poll thread cannot be spawned
    pub fn start(&self) -> Result<(), WatchError> {
        let mut worker = self.lock_worker();
        if worker.as_ref().is_some_and(|w| !w.handle.is_finished()) {
            return Ok(());
        }

        let signal = Arc::new(StopSignal::default());
        let shared = Arc::clone(&self.shared);
        let thread_signal = Arc::clone(&signal);
        let interval = self.poll_interval;

        let handle = thread::Builder::new()
            .name("stability-tracker".to_string())
            .spawn(move || {
                log::debug!("Stability tracker started (poll every {interval:?})");
                loop {
                    shared.poll(Instant::now());
                    if thread_signal.wait(interval) {
                        break;
                    }
                }
                log::debug!("Stability tracker stopped");
            })
            .map_err(|e| WatchError::SpawnError {
                name: "stability-tracker".to_string(),
                source: e,
            })?;

        *worker = Some(Worker { handle, signal });
        Ok(())
    }

    /// Stop the background poll loop. Does nothing if not running.
    ///
    /// Pending candidates are kept. When called from the stable callback the
    /// loop exits after the callback returns.
    pub fn stop(&self) {
        let Some(worker) = self.lock_worker().take() else {
            return;
        };
        worker.signal.stop();

        if worker.handle.thread().id() == thread::current().id() {
            return;
        }
        if worker.handle.join().is_err() {
            log::error!("Stability tracker thread panicked");
        }
    }
}

impl Drop for StabilityTracker {
    fn drop(&mut self) {
        self.stop();
    }
}
