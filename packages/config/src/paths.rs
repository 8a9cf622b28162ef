//! Platform configuration locations.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use crate::error::ConfigError;

/// Name of the application directory under the platform config directory.
pub const APP_DIR_NAME: &str = "StreamWatcher";

/// File name of the settings document.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// File name of the rotating log.
pub const LOG_FILE_NAME: &str = "stream_watcher.log";

/// The per-user settings directory, e.g. `~/.config/StreamWatcher`.
///
/// # Errors
///
/// * If the platform has no configuration directory
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

/// The default settings file inside [`default_config_dir`].
///
/// # Errors
///
/// * If the platform has no configuration directory
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(default_config_dir()?.join(CONFIG_FILE_NAME))
}

/// The log file inside [`default_config_dir`].
///
/// # Errors
///
/// * If the platform has no configuration directory
pub fn default_log_path() -> Result<PathBuf, ConfigError> {
    Ok(default_config_dir()?.join(LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path_layout() {
        if let Ok(path) = default_config_path() {
            assert!(path.ends_with("StreamWatcher/config.json"));
        }
    }

    #[test]
    fn test_log_path_next_to_config() {
        if let (Ok(log), Ok(config)) = (default_log_path(), default_config_path()) {
            assert_eq!(log.parent(), config.parent());
            assert!(log.ends_with("stream_watcher.log"));
        }
    }
}
