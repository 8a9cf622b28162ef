//! The copy engine.
//!
//! Every file is copied by its own worker thread. A worker runs the whole
//! per-file pipeline (existence check, size gate, collision resolution, the
//! retried transfer and its validation), then finalizes a [`CopyRecord`]
//! into the shared [`CopyStats`] and hands it to the completion callback.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fmt;
use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Local;
use stream_watcher_glob::list_files;

use crate::active::ActiveCopies;
use crate::collision::{Resolution, resolve_collision};
use crate::error::CopyError;
use crate::options::CopyOptions;
use crate::record::CopyRecord;
use crate::stats::CopyStats;
use crate::transfer::{FsTransfer, Transfer};
use crate::verify::{verify_digests, verify_size};

type CompletionCallback = dyn Fn(&CopyRecord) + Send + Sync;

/// Copies files from a source root into a destination root.
pub struct Copier {
    source_root: PathBuf,
    destination_root: PathBuf,
    options: CopyOptions,
    stats: Arc<CopyStats>,
    transfer: Box<dyn Transfer>,
    on_complete: Option<Box<CompletionCallback>>,
    active: ActiveCopies,
}

impl fmt::Debug for Copier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Copier")
            .field("source_root", &self.source_root)
            .field("destination_root", &self.destination_root)
            .field("options", &self.options)
            .field("active", &self.active.get())
            .finish_non_exhaustive()
    }
}

impl Copier {
    /// Create a copier with the file system transfer and fresh statistics.
    #[must_use]
    pub fn new(
        source_root: impl Into<PathBuf>,
        destination_root: impl Into<PathBuf>,
        options: CopyOptions,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            destination_root: destination_root.into(),
            options,
            stats: Arc::new(CopyStats::new()),
            transfer: Box::new(FsTransfer),
            on_complete: None,
            active: ActiveCopies::default(),
        }
    }

    /// Record into `stats` instead of a private instance.
    #[must_use]
    pub fn with_stats(mut self, stats: Arc<CopyStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Replace the transfer used for each attempt.
    #[must_use]
    pub fn with_transfer<T: Transfer + 'static>(mut self, transfer: T) -> Self {
        self.transfer = Box::new(transfer);
        self
    }

    /// Call `callback` with every finalized record.
    ///
    /// The callback runs on the worker thread. Panics are caught and logged.
    #[must_use]
    pub fn with_completion<F>(mut self, callback: F) -> Self
    where
        F: Fn(&CopyRecord) + Send + Sync + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// The watched source root.
    #[must_use]
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// The destination root.
    #[must_use]
    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    /// The options this copier was built with.
    #[must_use]
    pub const fn options(&self) -> &CopyOptions {
        &self.options
    }

    /// Shared statistics.
    #[must_use]
    pub const fn stats(&self) -> &Arc<CopyStats> {
        &self.stats
    }

    /// Number of copies currently in flight.
    #[must_use]
    pub fn active_copies(&self) -> usize {
        self.active.get()
    }

    /// Block until no copy is in flight.
    ///
    /// Returns `false` if copies were still running when `timeout` elapsed.
    #[must_use]
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.active.wait_idle(timeout)
    }

    /// Copy `source` on a new worker thread.
    ///
    /// # Errors
    ///
    /// * If the worker thread cannot be spawned
    pub fn copy_file(
        self: &Arc<Self>,
        source: PathBuf,
    ) -> Result<JoinHandle<CopyRecord>, CopyError> {
        let name = source
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().to_string());
        let error_path = source.clone();

        self.active.increment();
        let copier = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name(format!("copy-{name}"))
            .spawn(move || {
                let _guard = copier.active.adopt();
                copier.run(&source)
            });

        spawned.map_err(|e| {
            self.active.decrement();
            CopyError::SpawnError {
                path: error_path,
                io_error: e,
            }
        })
    }

    /// Copy `source` on the calling thread and return its record.
    pub fn copy_file_now(&self, source: &Path) -> CopyRecord {
        let _guard = self.active.enter();
        self.run(source)
    }

    /// Queue every file under the source root, bypassing stability tracking.
    ///
    /// Sub-folders are included only when structure preservation is on. A
    /// file whose worker cannot be spawned is logged and left out; workers
    /// that did start are always returned.
    ///
    /// # Errors
    ///
    /// * If the source root cannot be enumerated
    pub fn spawn_all(self: &Arc<Self>) -> Result<Vec<JoinHandle<CopyRecord>>, CopyError> {
        if !self.source_root.is_dir() {
            log::warn!(
                "Source root is not a directory: {}",
                self.source_root.display()
            );
            return Ok(Vec::new());
        }

        let files = list_files(&self.source_root, self.options.preserve_structure)?;
        log::info!(
            "Queueing {} file(s) from {}",
            files.len(),
            self.source_root.display()
        );

        Ok(spawn_each(files, |path| self.copy_file(path)))
    }

    /// Queue every file under the source root and return how many were queued.
    pub fn copy_all_now(self: &Arc<Self>) -> usize {
        match self.spawn_all() {
            Ok(handles) => handles.len(),
            Err(e) => {
                log::error!("Copy sweep of {} failed: {e}", self.source_root.display());
                0
            }
        }
    }

    fn run(&self, source: &Path) -> CopyRecord {
        let mut rec = CopyRecord::new(source);
        rec.started = Some(Local::now());
        self.process(source, &mut rec);
        self.finalize(rec)
    }

    fn process(&self, source: &Path, rec: &mut CopyRecord) {
        let size = match fs::metadata(source) {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                rec.error = Some(
                    CopyError::SourceVanished {
                        path: source.to_path_buf(),
                    }
                    .to_string(),
                );
                return;
            }
            Err(e) => {
                rec.error = Some(
                    CopyError::MetadataError {
                        path: source.to_path_buf(),
                        io_error: e,
                    }
                    .to_string(),
                );
                return;
            }
        };
        rec.size_bytes = size;

        if let Some(reason) = self.options.size_gate(size) {
            rec.skipped = true;
            rec.error = Some(reason);
            return;
        }

        let dest = self.base_destination(source);
        if let Some(parent) = dest.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                rec.destination = Some(dest.clone());
                rec.error = Some(
                    CopyError::CreateDirError {
                        path: parent.to_path_buf(),
                        io_error: e,
                    }
                    .to_string(),
                );
                return;
            }
        }

        let target = match resolve_collision(
            &dest,
            self.options.collision_mode,
            &self.options.rename_pattern,
        ) {
            Resolution::Proceed(target) => target,
            Resolution::Skip => {
                rec.skipped = true;
                rec.error = Some(format!(
                    "Destination already exists (collision): {}",
                    dest.display()
                ));
                rec.destination = Some(dest);
                return;
            }
        };
        rec.destination = Some(target.clone());

        let max_attempts = self.options.max_attempts();
        for attempt in 1..=max_attempts {
            rec.attempts = attempt;
            match self.attempt(source, &target, size) {
                Ok(verified) => {
                    rec.success = true;
                    rec.verified = verified;
                    rec.error = None;
                    return;
                }
                Err(e) => {
                    log::warn!(
                        "Copy attempt {attempt}/{max_attempts} failed for {}: {e}",
                        source.display()
                    );
                    rec.error = Some(e.to_string());
                    if attempt < max_attempts {
                        thread::sleep(self.options.retry_delay);
                    }
                }
            }
        }
    }

    /// One transfer plus validation. Returns whether digests were compared.
    fn attempt(&self, source: &Path, target: &Path, size: u64) -> Result<bool, CopyError> {
        self.transfer.transfer(source, target)?;

        if self.options.verify {
            verify_digests(source, target)?;
            Ok(true)
        } else {
            verify_size(target, size)?;
            Ok(false)
        }
    }

    fn finalize(&self, mut rec: CopyRecord) -> CopyRecord {
        rec.finished = Some(Local::now());

        if rec.skipped {
            log::info!(
                "Skipped {}: {}",
                rec.source.display(),
                rec.error.as_deref().unwrap_or_default()
            );
        } else if rec.success {
            log::info!(
                "Copied {} -> {} ({} bytes{})",
                rec.source.display(),
                rec.destination
                    .as_deref()
                    .map_or_else(String::new, |d| d.display().to_string()),
                rec.size_bytes,
                if rec.verified { ", verified" } else { "" }
            );
        } else {
            log::error!(
                "Failed to copy {}: {}",
                rec.source.display(),
                rec.error.as_deref().unwrap_or_default()
            );
        }

        self.stats.record(rec.clone());

        if let Some(callback) = &self.on_complete {
            if panic::catch_unwind(AssertUnwindSafe(|| callback(&rec))).is_err() {
                log::error!("Completion callback panicked for {}", rec.source.display());
            }
        }

        rec
    }

    /// Destination before collision handling.
    fn base_destination(&self, source: &Path) -> PathBuf {
        if self.options.preserve_structure {
            if let Ok(relative) = source.strip_prefix(&self.source_root) {
                if !relative.as_os_str().is_empty() {
                    return self.destination_root.join(relative);
                }
            }
        }

        let name = source.file_name().unwrap_or(source.as_os_str());
        self.destination_root.join(name)
    }
}

/// Run `spawn` for every path and keep the handles of those that started.
fn spawn_each<H>(
    paths: Vec<PathBuf>,
    mut spawn: impl FnMut(PathBuf) -> Result<H, CopyError>,
) -> Vec<H> {
    let mut handles = Vec::with_capacity(paths.len());
    for path in paths {
        match spawn(path) {
            Ok(handle) => handles.push(handle),
            Err(e) => log::error!("{e}"),
        }
    }
    handles
}
