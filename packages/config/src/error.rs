//! Error types for settings loading and saving.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the settings file.
    #[error("Failed to read config file {}: {source}", path.display())]
    ReadError {
        /// Path to the file that couldn't be read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the settings file.
    #[error("Failed to write config file {}: {source}", path.display())]
    WriteError {
        /// Path to the file that couldn't be written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create the directory holding the settings file.
    #[error("Failed to create config directory {}: {source}", path.display())]
    CreateDirError {
        /// The directory path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse JSON settings.
    #[error("Failed to parse JSON config {}: {source}", path.display())]
    JsonParseError {
        /// Path to the file that couldn't be parsed.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to parse TOML settings.
    #[error("Failed to parse TOML config {}: {source}", path.display())]
    TomlParseError {
        /// Path to the file that couldn't be parsed.
        path: PathBuf,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// Failed to serialize settings as JSON.
    #[error("Failed to serialize config as JSON: {0}")]
    JsonSerializeError(#[source] serde_json::Error),

    /// Failed to serialize settings as TOML.
    #[error("Failed to serialize config as TOML: {0}")]
    TomlSerializeError(#[source] toml::ser::Error),

    /// Unsupported configuration format.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// The platform has no per-user configuration directory.
    #[error("Could not determine the user configuration directory")]
    NoConfigDir,
}
