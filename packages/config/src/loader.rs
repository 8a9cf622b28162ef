//! Reading and writing the settings document.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::types::Settings;

/// On-disk format of a settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    /// `.json`, or no extension.
    Json,
    /// `.toml`.
    Toml,
}

impl SettingsFormat {
    /// Detect the format from the file extension.
    ///
    /// # Errors
    ///
    /// * If the extension is neither `json` nor `toml`
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            None => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }
}

/// Load settings, auto-detecting the format from the extension.
///
/// Stored values override the defaults; the result is normalized.
///
/// # Errors
///
/// * If the file extension is not supported
/// * If the file cannot be read
/// * If the file cannot be parsed
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let format = SettingsFormat::from_path(path)?;
    log::debug!("Loading {format:?} config from {}", path.display());

    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut settings: Settings = match format {
        SettingsFormat::Json => {
            serde_json::from_str(&content).map_err(|e| ConfigError::JsonParseError {
                path: path.to_path_buf(),
                source: e,
            })?
        }
        SettingsFormat::Toml => toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            path: path.to_path_buf(),
            source: e,
        })?,
    };
    settings.normalize();

    log::info!("Configuration loaded from {}", path.display());
    Ok(settings)
}

/// Load settings, writing the defaults first if the file does not exist.
///
/// # Errors
///
/// * If the defaults cannot be written
/// * If an existing file cannot be loaded
pub fn load_or_init(path: &Path) -> Result<Settings, ConfigError> {
    if path.exists() {
        return load_settings(path);
    }

    let settings = Settings::default();
    save_settings(path, &settings)?;
    log::info!("Created default configuration at {}", path.display());
    Ok(settings)
}

/// Save settings, pretty-printed, creating parent directories as needed.
///
/// # Errors
///
/// * If the file extension is not supported
/// * If the settings cannot be serialized
/// * If the file or its directory cannot be written
pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    let content = match SettingsFormat::from_path(path)? {
        SettingsFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(settings).map_err(ConfigError::JsonSerializeError)?;
            json.push('\n');
            json
        }
        SettingsFormat::Toml => {
            toml::to_string_pretty(settings).map_err(ConfigError::TomlSerializeError)?
        }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ConfigError::CreateDirError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(path, content).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;

    log::info!("Configuration saved to {}", path.display());
    Ok(())
}
