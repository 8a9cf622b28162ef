//! The sync service: settings in, watcher and copy engine out.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use stream_watcher_config::{Settings, save_settings};
use stream_watcher_copy::{Copier, CopyStats};
use stream_watcher_watch::FolderWatcher;

use crate::error::ServiceError;
use crate::messages;
use crate::notifier::Notifier;
use crate::status::{StatusReport, SyncState};

/// Owns the folder watcher and copy engine built from [`Settings`].
///
/// Statistics are kept across restarts. Stopping only stops the watcher;
/// copies already running finish on their own.
pub struct SyncService {
    settings: Settings,
    settings_path: Option<PathBuf>,
    notifier: Arc<dyn Notifier>,
    stats: Arc<CopyStats>,
    copier: Option<Arc<Copier>>,
    watcher: Option<FolderWatcher>,
}

impl fmt::Debug for SyncService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncService")
            .field("settings", &self.settings)
            .field("settings_path", &self.settings_path)
            .field("copier", &self.copier)
            .field("watcher", &self.watcher)
            .finish_non_exhaustive()
    }
}

impl SyncService {
    /// Create a stopped service.
    #[must_use]
    pub fn new<N: Notifier + 'static>(settings: Settings, notifier: N) -> Self {
        Self {
            settings,
            settings_path: None,
            notifier: Arc::new(notifier),
            stats: Arc::new(CopyStats::new()),
            copier: None,
            watcher: None,
        }
    }

    /// Save settings to `path` whenever sync is enabled, disabled or restarted.
    #[must_use]
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    /// Current settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Statistics shared by every copy engine this service builds.
    #[must_use]
    pub const fn stats(&self) -> &Arc<CopyStats> {
        &self.stats
    }

    /// The most recently built copy engine.
    #[must_use]
    pub const fn copier(&self) -> Option<&Arc<Copier>> {
        self.copier.as_ref()
    }

    /// Whether the watcher is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.watcher.as_ref().is_some_and(FolderWatcher::is_running)
    }

    /// Start watching and copying.
    ///
    /// # Errors
    ///
    /// * If source or destination is not configured
    /// * If the source folder does not exist or cannot be watched
    pub fn start(&mut self) -> Result<(), ServiceError> {
        self.start_sync()?;
        self.notifier.notify(messages::SYNC_STARTED);
        Ok(())
    }

    /// Stop watching. Safe to call when stopped.
    pub fn stop(&mut self) {
        self.stop_sync();
        self.notifier.notify(messages::SYNC_STOPPED);
    }

    /// Pause if running, resume otherwise.
    ///
    /// # Errors
    ///
    /// * If resuming fails, see [`Self::start`]
    pub fn toggle(&mut self) -> Result<(), ServiceError> {
        if self.watcher.is_some() {
            self.stop_sync();
            self.notifier.notify(messages::SYNC_PAUSED);
        } else {
            self.start_sync()?;
            self.notifier.notify(messages::SYNC_RESUMED);
        }
        Ok(())
    }

    /// Replace the settings and start again if they are complete.
    ///
    /// # Errors
    ///
    /// * If the new settings cannot be started, see [`Self::start`]
    pub fn restart(&mut self, mut settings: Settings) -> Result<(), ServiceError> {
        self.stop_sync();
        settings.normalize();
        self.settings = settings;

        let result = if self.settings.is_configured() {
            self.start_sync()
        } else {
            self.persist();
            Ok(())
        };
        self.notifier.notify(messages::SYNC_RESTARTED);
        result
    }

    /// Queue every file in the source folder, skipping stability checks.
    ///
    /// Returns `None` if no copy engine has been built yet.
    pub fn copy_now(&self) -> Option<usize> {
        let Some(copier) = &self.copier else {
            self.notifier.notify(messages::NOT_RUNNING);
            return None;
        };

        self.notifier.notify(messages::COPYING_NOW);
        let count = copier.copy_all_now();
        self.notifier.notify(&messages::queued(count));
        Some(count)
    }

    /// Block until the current copy engine has no copies in flight.
    ///
    /// Returns `false` on timeout.
    #[must_use]
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.copier
            .as_ref()
            .is_none_or(|copier| copier.wait_idle(timeout))
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        if !self.settings.is_configured() {
            SyncState::NotConfigured
        } else if self.is_running() {
            SyncState::Active
        } else {
            SyncState::Paused
        }
    }

    /// Status snapshot including up to `recent` history records.
    #[must_use]
    pub fn status(&self, recent: usize) -> StatusReport {
        StatusReport {
            state: self.state(),
            totals: self.stats.snapshot(),
            active_copies: self.copier.as_ref().map_or(0, |c| c.active_copies()),
            pending_count: self.watcher.as_ref().map_or(0, FolderWatcher::pending_count),
            pending_files: self
                .watcher
                .as_ref()
                .map_or_else(Vec::new, FolderWatcher::pending_files),
            recent: self.stats.recent(recent),
        }
    }

    /// One-line status, e.g. `Paused`.
    #[must_use]
    pub fn status_summary(&self) -> String {
        self.status(0).summary()
    }

    fn start_sync(&mut self) -> Result<(), ServiceError> {
        if self.watcher.is_some() {
            return Ok(());
        }
        if !self.settings.is_configured() {
            log::warn!("Cannot start sync: not configured.");
            return Err(ServiceError::NotConfigured);
        }

        let notifier = Arc::clone(&self.notifier);
        let copier = Arc::new(
            Copier::new(
                &self.settings.source_root,
                &self.settings.destination_root,
                self.settings.copy_options(),
            )
            .with_stats(Arc::clone(&self.stats))
            .with_completion(move |rec| notifier.notify(&messages::completion(rec))),
        );
        self.copier = Some(Arc::clone(&copier));

        let started = FolderWatcher::new(self.settings.watch_options(), move |path| {
            if let Err(e) = copier.copy_file(path.to_path_buf()) {
                log::error!("{e}");
            }
        })
        .and_then(|watcher| watcher.start().map(|()| watcher));

        match started {
            Ok(watcher) => {
                self.watcher = Some(watcher);
                self.set_sync_enabled(true);
                log::info!("Sync started.");
                Ok(())
            }
            Err(e) => {
                log::error!("Cannot start sync: {e}");
                self.set_sync_enabled(false);
                Err(e.into())
            }
        }
    }

    fn stop_sync(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.stop();
        }
        self.set_sync_enabled(false);
        log::info!("Sync stopped.");
    }

    fn set_sync_enabled(&mut self, enabled: bool) {
        self.settings.sync_enabled = enabled;
        self.persist();
    }

    fn persist(&self) {
        if let Some(path) = &self.settings_path {
            if let Err(e) = save_settings(path, &self.settings) {
                log::warn!("{e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::{ChannelNotifier, NullNotifier};
    use std::fs;
    use std::path::Path;
    use std::sync::mpsc::Receiver;
    use stream_watcher_config::load_settings;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        src: PathBuf,
        dst: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("incoming");
        let dst = dir.path().join("archive");
        fs::create_dir_all(&src).unwrap();
        Fixture { dir, src, dst }
    }

    fn settings(src: &Path, dst: &Path) -> Settings {
        Settings {
            source_root: src.to_path_buf(),
            destination_root: dst.to_path_buf(),
            stable_seconds: 0,
            poll_interval_seconds: 1,
            retry_delay_seconds: 0,
            ..Settings::default()
        }
    }

    fn drain(rx: &Receiver<String>) -> Vec<String> {
        rx.try_iter().collect()
    }

    #[test]
    fn test_start_requires_configuration() {
        let (notifier, rx) = ChannelNotifier::new();
        let mut service = SyncService::new(Settings::default(), notifier);

        assert!(matches!(service.start(), Err(ServiceError::NotConfigured)));
        assert!(!service.is_running());
        assert_eq!(service.state(), SyncState::NotConfigured);
        assert_eq!(service.status_summary(), "Not configured");
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn test_start_missing_source() {
        let fx = fixture();
        let mut service = SyncService::new(
            settings(&fx.src.join("missing"), &fx.dst),
            NullNotifier,
        );

        assert!(matches!(service.start(), Err(ServiceError::WatchError(_))));
        assert!(!service.is_running());
        assert!(!service.settings().sync_enabled);
        assert_eq!(service.state(), SyncState::Paused);
    }

    #[test]
    fn test_lifecycle_messages() {
        let fx = fixture();
        let (notifier, rx) = ChannelNotifier::new();
        let mut service = SyncService::new(settings(&fx.src, &fx.dst), notifier);

        service.start().unwrap();
        assert!(service.is_running());
        assert_eq!(service.status_summary(), "Active \u{2014} 0 copied, 0 failed");

        service.toggle().unwrap();
        assert!(!service.is_running());
        assert_eq!(service.status_summary(), "Paused");

        service.toggle().unwrap();
        assert!(service.is_running());

        service.stop();
        service.stop();

        assert_eq!(
            drain(&rx),
            vec![
                "Sync started.",
                "Sync paused.",
                "Sync resumed.",
                "Sync stopped.",
                "Sync stopped.",
            ]
        );
    }

    #[test]
    fn test_copy_now_before_start() {
        let (notifier, rx) = ChannelNotifier::new();
        let service = SyncService::new(Settings::default(), notifier);

        assert_eq!(service.copy_now(), None);
        assert_eq!(drain(&rx), vec!["Sync is not running. Cannot copy."]);
    }

    #[test]
    fn test_copy_now_sweeps_source() {
        let fx = fixture();
        fs::write(fx.src.join("a.mp4"), "first").unwrap();
        fs::write(fx.src.join("b.mp4"), "second").unwrap();

        let (notifier, rx) = ChannelNotifier::new();
        let mut service = SyncService::new(
            Settings {
                stable_seconds: 3600,
                ..settings(&fx.src, &fx.dst)
            },
            notifier,
        );
        service.start().unwrap();

        assert_eq!(service.copy_now(), Some(2));
        assert!(service.wait_idle(Duration::from_secs(30)));

        let messages = drain(&rx);
        assert_eq!(messages[0], "Sync started.");
        assert_eq!(messages[1], "Copying all pending files now.");
        assert_eq!(messages[2], "Queued 2 files for copy.");
        let mut completions = messages[3..].to_vec();
        completions.sort();
        assert_eq!(
            completions,
            vec!["Copied a.mp4 (verified).", "Copied b.mp4 (verified)."]
        );

        let status = service.status(10);
        assert_eq!(status.totals.total_copied, 2);
        assert_eq!(status.totals.total_bytes, 11);
        assert_eq!(status.recent.len(), 2);
        assert_eq!(fs::read_to_string(fx.dst.join("b.mp4")).unwrap(), "second");
        service.stop();
    }

    #[test]
    fn test_stable_file_copied_end_to_end() {
        let fx = fixture();
        let (notifier, rx) = ChannelNotifier::new();
        let mut service = SyncService::new(settings(&fx.src, &fx.dst), notifier);
        service.start().unwrap();
        assert_eq!(rx.recv().unwrap(), "Sync started.");

        fs::write(fx.src.join("stream.mkv"), "finished recording").unwrap();

        let message = rx.recv_timeout(Duration::from_secs(15)).unwrap();
        assert_eq!(message, "Copied stream.mkv (verified).");
        assert_eq!(
            fs::read_to_string(fx.dst.join("stream.mkv")).unwrap(),
            "finished recording"
        );
        service.stop();
    }

    #[test]
    fn test_nested_file_keeps_structure() {
        let fx = fixture();
        fs::create_dir_all(fx.src.join("sub")).unwrap();
        let (notifier, rx) = ChannelNotifier::new();
        let mut service = SyncService::new(
            Settings {
                preserve_structure: true,
                ..settings(&fx.src, &fx.dst)
            },
            notifier,
        );
        service.start().unwrap();
        assert_eq!(rx.recv().unwrap(), "Sync started.");

        fs::write(fx.src.join("sub").join("clip.mp4"), "nested recording").unwrap();

        let message = rx.recv_timeout(Duration::from_secs(15)).unwrap();
        assert_eq!(message, "Copied clip.mp4 (verified).");
        assert_eq!(
            fs::read_to_string(fx.dst.join("sub").join("clip.mp4")).unwrap(),
            "nested recording"
        );
        assert!(!fx.dst.join("clip.mp4").exists());
        service.stop();
    }

    #[test]
    fn test_restart_persists_settings() {
        let fx = fixture();
        let path = fx.dir.path().join("config.json");
        let (notifier, rx) = ChannelNotifier::new();
        let mut service =
            SyncService::new(settings(&fx.src, &fx.dst), notifier).with_settings_path(&path);

        service.start().unwrap();
        assert!(load_settings(&path).unwrap().sync_enabled);

        let mut changed = settings(&fx.src, &fx.dir.path().join("elsewhere"));
        changed.extensions = vec![".MKV".to_string()];
        service.restart(changed).unwrap();

        assert!(service.is_running());
        assert_eq!(service.settings().extensions, vec!["mkv"]);
        let saved = load_settings(&path).unwrap();
        assert!(saved.sync_enabled);
        assert_eq!(saved.destination_root, fx.dir.path().join("elsewhere"));

        service.stop();
        assert!(!load_settings(&path).unwrap().sync_enabled);

        assert_eq!(
            drain(&rx),
            vec![
                "Sync started.",
                "Settings saved. Sync restarted.",
                "Sync stopped."
            ]
        );
    }

    #[test]
    fn test_restart_unconfigured() {
        let fx = fixture();
        let (notifier, rx) = ChannelNotifier::new();
        let mut service = SyncService::new(settings(&fx.src, &fx.dst), notifier);
        service.start().unwrap();

        service.restart(Settings::default()).unwrap();

        assert!(!service.is_running());
        assert_eq!(service.state(), SyncState::NotConfigured);
        assert_eq!(drain(&rx).last().unwrap(), "Settings saved. Sync restarted.");
    }
}
