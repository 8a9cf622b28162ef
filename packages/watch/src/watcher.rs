//! OS-level folder watching.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use stream_watcher_glob::{FileFilter, FilterOptions};

use crate::error::WatchError;
use crate::handler::EventHandler;
use crate::tracker::{DEFAULT_POLL_INTERVAL, StabilityTracker};

/// How long [`FolderWatcher::stop`] waits for the dispatch thread.
const DISPATCH_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Options for a [`FolderWatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    /// Folder to watch.
    pub source_root: PathBuf,
    /// Also watch sub-folders.
    pub recursive: bool,
    /// Seconds a file's size must stay unchanged before it is ready.
    pub stable_seconds: u64,
    /// How often pending files are re-checked.
    pub poll_interval: Duration,
    /// Which files to track.
    pub filter: FilterOptions,
}

impl WatchOptions {
    /// Options for `source_root` with default timing and no filtering.
    #[must_use]
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            recursive: false,
            stable_seconds: 60,
            poll_interval: DEFAULT_POLL_INTERVAL,
            filter: FilterOptions::default(),
        }
    }
}

struct Running {
    watcher: RecommendedWatcher,
    dispatch: JoinHandle<()>,
}

/// Watches a folder and reports each file once it has become stable.
pub struct FolderWatcher {
    source_root: PathBuf,
    recursive: bool,
    tracker: Arc<StabilityTracker>,
    handler: Arc<EventHandler>,
    running: Mutex<Option<Running>>,
}

impl fmt::Debug for FolderWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FolderWatcher")
            .field("source_root", &self.source_root)
            .field("recursive", &self.recursive)
            .field("tracker", &self.tracker)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl FolderWatcher {
    /// Create a stopped watcher that calls `on_ready` once per stable file.
    ///
    /// # Errors
    ///
    /// * If an include or exclude pattern is invalid
    pub fn new<F>(options: WatchOptions, on_ready: F) -> Result<Self, WatchError>
    where
        F: Fn(&Path) + Send + Sync + 'static,
    {
        let filter = FileFilter::new(&options.filter)?;
        let tracker = StabilityTracker::new(options.stable_seconds, on_ready)
            .with_poll_interval(options.poll_interval);

        Ok(Self {
            source_root: options.source_root,
            recursive: options.recursive,
            tracker: Arc::new(tracker),
            handler: Arc::new(EventHandler::new(filter)),
            running: Mutex::new(None),
        })
    }

    fn lock_running(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The watched folder.
    #[must_use]
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Subscribe to file system events and start stability tracking.
    ///
    /// Does nothing if already running.
    ///
    /// # Errors
    ///
    /// * If the source folder does not exist
    /// * If the OS watch cannot be set up
    /// * If a background thread cannot be spawned
    pub fn start(&self) -> Result<(), WatchError> {
        let mut running = self.lock_running();
        if running.is_some() {
            return Ok(());
        }

        if !self.source_root.is_dir() {
            log::error!(
                "Source folder does not exist: {}",
                self.source_root.display()
            );
            return Err(WatchError::SourceNotFound {
                path: self.source_root.clone(),
            });
        }

        let (tx, rx) = mpsc::channel::<notify::Result<notify::Event>>();
        let notify_error = |e| WatchError::NotifyError {
            path: self.source_root.clone(),
            source: e,
        };

        let mut watcher = RecommendedWatcher::new(tx, Config::default()).map_err(notify_error)?;
        let mode = if self.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(&self.source_root, mode).map_err(notify_error)?;

        let handler = Arc::clone(&self.handler);
        let tracker = Arc::clone(&self.tracker);
        let dispatch = thread::Builder::new()
            .name("watch-dispatch".to_string())
            .spawn(move || {
                // Ends once the watcher (and with it the sender) is dropped
                for result in rx {
                    match result {
                        Ok(event) => {
                            handler.handle(&event, &tracker);
                        }
                        Err(e) => log::warn!("Watch error: {e}"),
                    }
                }
            })
            .map_err(|e| WatchError::SpawnError {
                name: "watch-dispatch".to_string(),
                source: e,
            })?;

        if let Err(e) = self.tracker.start() {
            drop(watcher);
            join_with_timeout(dispatch, DISPATCH_JOIN_TIMEOUT);
            return Err(e);
        }

        *running = Some(Running { watcher, dispatch });
        log::info!(
            "Watching '{}' (recursive={}, stable={}s)",
            self.source_root.display(),
            self.recursive,
            self.tracker.stable_seconds()
        );
        Ok(())
    }

    /// Unsubscribe and stop stability tracking. Safe to call when stopped.
    ///
    /// Files still pending stay tracked and are picked up again on the next
    /// [`Self::start`].
    pub fn stop(&self) {
        let running = self.lock_running().take();
        if let Some(Running { watcher, dispatch }) = running {
            drop(watcher);
            join_with_timeout(dispatch, DISPATCH_JOIN_TIMEOUT);
        }
        self.tracker.stop();
        log::info!("Watcher stopped.");
    }

    /// Whether the watcher is subscribed and the dispatch thread is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock_running()
            .as_ref()
            .is_some_and(|running| !running.dispatch.is_finished())
    }

    /// Change the stability threshold without restarting.
    pub fn update_stable_time(&self, seconds: i64) {
        self.tracker.set_stable_seconds(seconds);
    }

    /// Change the extension allow-list without restarting.
    pub fn update_extensions(&self, extensions: &[String]) {
        self.handler.set_extensions(extensions);
    }

    /// Number of files awaiting stability.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.tracker.pending_count()
    }

    /// Files awaiting stability.
    #[must_use]
    pub fn pending_files(&self) -> Vec<PathBuf> {
        self.tracker.pending_files()
    }
}

impl Drop for FolderWatcher {
    fn drop(&mut self) {
        if self.lock_running().is_some() {
            self.stop();
        }
    }
}

fn join_with_timeout(handle: JoinHandle<()>, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            log::warn!("Dispatch thread did not stop within {timeout:?}, detaching");
            return;
        }
        thread::sleep(Duration::from_millis(10));
    }
    if handle.join().is_err() {
        log::error!("Dispatch thread panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fast_options(root: &Path) -> WatchOptions {
        WatchOptions {
            stable_seconds: 0,
            poll_interval: Duration::from_millis(50),
            ..WatchOptions::new(root)
        }
    }

    #[test]
    fn test_start_missing_root() {
        let dir = TempDir::new().unwrap();
        let watcher =
            FolderWatcher::new(WatchOptions::new(dir.path().join("missing")), |_| {}).unwrap();

        let result = watcher.start();
        assert!(matches!(result, Err(WatchError::SourceNotFound { .. })));
        assert!(!watcher.is_running());
        assert!(!watcher.tracker.is_running());
    }

    #[test]
    fn test_invalid_pattern() {
        let dir = TempDir::new().unwrap();
        let mut options = WatchOptions::new(dir.path());
        options.filter.exclude_globs = vec!["[unclosed".to_string()];

        assert!(matches!(
            FolderWatcher::new(options, |_| {}),
            Err(WatchError::FilterError(_))
        ));
    }

    #[test]
    fn test_start_stop() {
        let dir = TempDir::new().unwrap();
        let watcher = FolderWatcher::new(WatchOptions::new(dir.path()), |_| {}).unwrap();

        watcher.stop();
        watcher.start().unwrap();
        watcher.start().unwrap();
        assert!(watcher.is_running());

        watcher.stop();
        assert!(!watcher.is_running());
        watcher.stop();
    }

    #[test]
    fn test_new_file_reported_once_stable() {
        let dir = TempDir::new().unwrap();
        let (tx, rx) = mpsc::channel();
        let watcher = FolderWatcher::new(fast_options(dir.path()), move |path| {
            tx.send(path.to_path_buf()).unwrap();
        })
        .unwrap();
        watcher.start().unwrap();

        let file = dir.path().join("clip.mp4");
        fs::write(&file, "recording").unwrap();

        let ready = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(ready.file_name(), file.file_name());
        watcher.stop();
    }

    #[test]
    fn test_filtered_file_not_reported() {
        let dir = TempDir::new().unwrap();
        let (tx, rx) = mpsc::channel();
        let mut options = fast_options(dir.path());
        options.filter.extensions = vec!["mp4".to_string()];

        let watcher = FolderWatcher::new(options, move |path| {
            tx.send(path.to_path_buf()).unwrap();
        })
        .unwrap();
        watcher.start().unwrap();

        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
        fs::write(dir.path().join("clip.mp4"), "recording").unwrap();

        let ready = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(ready.file_name().unwrap(), "clip.mp4");

        thread::sleep(Duration::from_millis(200));
        watcher.stop();
        assert!(rx.try_iter().all(|path| path.file_name().unwrap() == "clip.mp4"));
    }

    #[test]
    fn test_hot_updates() {
        let dir = TempDir::new().unwrap();
        let mut options = WatchOptions::new(dir.path());
        options.filter.extensions = vec!["mp4".to_string()];
        let watcher = FolderWatcher::new(options, |_| {}).unwrap();

        watcher.update_stable_time(5);
        assert_eq!(watcher.tracker.stable_seconds(), 5);

        let wav = dir.path().join("a.wav");
        assert!(!watcher.handler.should_track(&wav));
        watcher.update_extensions(&["wav".to_string()]);
        assert!(watcher.handler.should_track(&wav));
    }

    #[test]
    fn test_recursive_reports_nested_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let (tx, rx) = mpsc::channel();
        let options = WatchOptions {
            recursive: true,
            ..fast_options(dir.path())
        };
        let watcher = FolderWatcher::new(options, move |path| {
            tx.send(path.to_path_buf()).unwrap();
        })
        .unwrap();
        watcher.start().unwrap();

        fs::write(dir.path().join("sub").join("clip.mp4"), "recording").unwrap();

        let ready = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(ready.ends_with("sub/clip.mp4"), "got {}", ready.display());
        watcher.stop();
    }

    #[test]
    fn test_non_recursive_ignores_nested_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let (tx, rx) = mpsc::channel();
        let watcher = FolderWatcher::new(fast_options(dir.path()), move |path| {
            tx.send(path.to_path_buf()).unwrap();
        })
        .unwrap();
        watcher.start().unwrap();

        fs::write(dir.path().join("sub").join("clip.mp4"), "recording").unwrap();
        fs::write(dir.path().join("top.mp4"), "recording").unwrap();

        let ready = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(ready.file_name().unwrap(), "top.mp4");

        thread::sleep(Duration::from_millis(500));
        watcher.stop();
        assert!(rx.try_iter().all(|path| !path.ends_with("sub/clip.mp4")));
    }
}
