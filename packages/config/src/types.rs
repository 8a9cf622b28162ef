//! Settings document for stream-watcher.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use stream_watcher_copy::{CollisionMode, CopyOptions, DEFAULT_RENAME_PATTERN};
use stream_watcher_glob::{FilterOptions, normalize_extensions};
use stream_watcher_watch::WatchOptions;

/// User settings.
///
/// Missing keys take their defaults and unknown keys are ignored, so older
/// and newer settings files both load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Folder to watch for new files.
    pub source_root: PathBuf,

    /// Folder that receives the copies.
    pub destination_root: PathBuf,

    /// Seconds a file's size must stay unchanged before it is copied.
    pub stable_seconds: u64,

    /// Seconds between stability checks.
    pub poll_interval_seconds: u64,

    /// Allowed extensions. Empty accepts every file.
    pub extensions: Vec<String>,

    /// File name globs of which at least one must match. Empty accepts every file.
    pub include_globs: Vec<String>,

    /// File name globs that exclude a file.
    pub exclude_globs: Vec<String>,

    /// Mirror sub-folders under the destination. Also watches sub-folders.
    pub preserve_structure: bool,

    /// What to do when the destination already exists.
    #[serde(deserialize_with = "lenient_collision_mode")]
    pub collision_mode: CollisionMode,

    /// Template for renamed copies.
    pub rename_pattern: String,

    /// Compare SHA-256 digests after copying.
    pub verify: bool,

    /// Skip files smaller than this many bytes. 0 disables the bound.
    pub min_size: u64,

    /// Skip files larger than this many bytes. 0 disables the bound.
    pub max_size: u64,

    /// Extra attempts after a failed copy.
    pub retry_count: u32,

    /// Seconds between copy attempts.
    pub retry_delay_seconds: u64,

    /// Start syncing when the service starts.
    pub sync_enabled: bool,

    /// `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,

    /// Rotate the log file once it grows past this many MiB.
    pub max_log_size_mb: u64,

    /// Rotated log files to keep next to the live one.
    pub log_backup_count: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_root: PathBuf::new(),
            destination_root: PathBuf::new(),
            stable_seconds: 60,
            poll_interval_seconds: 5,
            extensions: Vec::new(),
            include_globs: Vec::new(),
            exclude_globs: Vec::new(),
            preserve_structure: false,
            collision_mode: CollisionMode::Rename,
            rename_pattern: DEFAULT_RENAME_PATTERN.to_string(),
            verify: true,
            min_size: 0,
            max_size: 0,
            retry_count: 2,
            retry_delay_seconds: 5,
            sync_enabled: true,
            log_level: "info".to_string(),
            max_log_size_mb: 10,
            log_backup_count: 3,
        }
    }
}

impl Settings {
    /// Clean up values as they come from a file or a prompt.
    pub fn normalize(&mut self) {
        self.extensions = normalize_extensions(&self.extensions);
        self.include_globs = normalize_globs(&self.include_globs);
        self.exclude_globs = normalize_globs(&self.exclude_globs);

        if self.rename_pattern.trim().is_empty() {
            self.rename_pattern = DEFAULT_RENAME_PATTERN.to_string();
        } else {
            self.rename_pattern = self.rename_pattern.trim().to_string();
        }

        self.poll_interval_seconds = self.poll_interval_seconds.max(1);
        self.max_log_size_mb = self.max_log_size_mb.max(1);

        let level = self.log_level.trim().to_lowercase();
        self.log_level = if log::LevelFilter::from_str(&level).is_ok() {
            level
        } else {
            log::warn!("Unknown log level {:?}, using info", self.log_level);
            "info".to_string()
        };
    }

    /// Both folders are set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.source_root.as_os_str().is_empty() && !self.destination_root.as_os_str().is_empty()
    }

    /// The configured log level.
    #[must_use]
    pub fn level_filter(&self) -> log::LevelFilter {
        log::LevelFilter::from_str(&self.log_level).unwrap_or(log::LevelFilter::Info)
    }

    /// Size at which the log file rotates.
    #[must_use]
    pub fn max_log_bytes(&self) -> usize {
        usize::try_from(self.max_log_size_mb.max(1).saturating_mul(1024 * 1024))
            .unwrap_or(usize::MAX)
    }

    /// Filter rules for the watcher.
    #[must_use]
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            extensions: self.extensions.clone(),
            include_globs: self.include_globs.clone(),
            exclude_globs: self.exclude_globs.clone(),
        }
    }

    /// Options for the copy engine.
    #[must_use]
    pub fn copy_options(&self) -> CopyOptions {
        CopyOptions {
            preserve_structure: self.preserve_structure,
            collision_mode: self.collision_mode,
            rename_pattern: self.rename_pattern.clone(),
            verify: self.verify,
            min_size: self.min_size,
            max_size: self.max_size,
            retry_count: self.retry_count,
            retry_delay: Duration::from_secs(self.retry_delay_seconds),
        }
    }

    /// Options for the folder watcher.
    #[must_use]
    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            source_root: self.source_root.clone(),
            recursive: self.preserve_structure,
            stable_seconds: self.stable_seconds,
            poll_interval: Duration::from_secs(self.poll_interval_seconds.max(1)),
            filter: self.filter_options(),
        }
    }
}

fn normalize_globs(globs: &[String]) -> Vec<String> {
    globs
        .iter()
        .map(|glob| glob.trim())
        .filter(|glob| !glob.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Unknown collision modes fall back to the default instead of failing the load.
fn lenient_collision_mode<'de, D>(deserializer: D) -> Result<CollisionMode, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.parse().unwrap_or_else(|e| {
        log::warn!("{e}, using {}", CollisionMode::default());
        CollisionMode::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.stable_seconds, 60);
        assert_eq!(settings.poll_interval_seconds, 5);
        assert_eq!(settings.collision_mode, CollisionMode::Rename);
        assert_eq!(settings.rename_pattern, "{name}_{n}.{ext}");
        assert!(settings.verify);
        assert_eq!(settings.retry_count, 2);
        assert_eq!(settings.retry_delay_seconds, 5);
        assert!(settings.sync_enabled);
        assert_eq!(settings.max_log_size_mb, 10);
        assert_eq!(settings.log_backup_count, 3);
        assert_eq!(settings.max_log_bytes(), 10 * 1024 * 1024);
        assert!(!settings.is_configured());
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"source_root": "/in", "verify": false, "future_key": 1}"#)
                .unwrap();

        assert_eq!(settings.source_root, PathBuf::from("/in"));
        assert!(!settings.verify);
        assert_eq!(settings.stable_seconds, 60);
        assert!(!settings.is_configured());
    }

    #[test]
    fn test_unknown_collision_mode_falls_back() {
        let settings: Settings = serde_json::from_str(r#"{"collision_mode": "merge"}"#).unwrap();
        assert_eq!(settings.collision_mode, CollisionMode::Rename);

        let settings: Settings = serde_json::from_str(r#"{"collision_mode": "Skip"}"#).unwrap();
        assert_eq!(settings.collision_mode, CollisionMode::Skip);
    }

    #[test]
    fn test_normalize() {
        let mut settings = Settings {
            extensions: vec![" .MP3".to_string(), String::new(), "wav".to_string()],
            include_globs: vec![" show_* ".to_string(), "  ".to_string()],
            exclude_globs: vec!["*.tmp".to_string(), String::new()],
            rename_pattern: "   ".to_string(),
            poll_interval_seconds: 0,
            max_log_size_mb: 0,
            log_backup_count: 0,
            log_level: "DEBUG".to_string(),
            ..Settings::default()
        };
        settings.normalize();

        assert_eq!(settings.extensions, vec!["mp3", "wav"]);
        assert_eq!(settings.include_globs, vec!["show_*"]);
        assert_eq!(settings.exclude_globs, vec!["*.tmp"]);
        assert_eq!(settings.rename_pattern, DEFAULT_RENAME_PATTERN);
        assert_eq!(settings.poll_interval_seconds, 1);
        assert_eq!(settings.max_log_size_mb, 1);
        assert_eq!(settings.log_backup_count, 0);
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.level_filter(), log::LevelFilter::Debug);

        settings.log_level = "loud".to_string();
        settings.normalize();
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_derived_options() {
        let settings = Settings {
            source_root: PathBuf::from("/in"),
            destination_root: PathBuf::from("/out"),
            preserve_structure: true,
            collision_mode: CollisionMode::Skip,
            retry_delay_seconds: 7,
            stable_seconds: 15,
            extensions: vec!["mp4".to_string()],
            ..Settings::default()
        };
        assert!(settings.is_configured());

        let copy = settings.copy_options();
        assert!(copy.preserve_structure);
        assert_eq!(copy.collision_mode, CollisionMode::Skip);
        assert_eq!(copy.retry_delay, Duration::from_secs(7));

        let watch = settings.watch_options();
        assert!(watch.recursive);
        assert_eq!(watch.stable_seconds, 15);
        assert_eq!(watch.poll_interval, Duration::from_secs(5));
        assert_eq!(watch.filter.extensions, vec!["mp4"]);
    }
}
