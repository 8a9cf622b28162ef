//! Settings for stream-watcher.
//!
//! This crate provides the settings document and its persistence:
//!
//! * JSON (`config.json`, the default) and TOML (`*.toml`) files
//! * Missing keys take defaults, unknown keys are ignored
//! * Platform-specific default location via `dirs`
//!
//! # Example
//!
//! ```rust,ignore
//! use stream_watcher_config::{default_config_path, load_or_init};
//!
//! let path = default_config_path()?;
//! let settings = load_or_init(&path)?;
//! if settings.is_configured() {
//!     println!("{} -> {}", settings.source_root.display(), settings.destination_root.display());
//! }
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod loader;
mod paths;
mod types;

pub use error::ConfigError;
pub use loader::{SettingsFormat, load_or_init, load_settings, save_settings};
pub use paths::{
    APP_DIR_NAME, CONFIG_FILE_NAME, LOG_FILE_NAME, default_config_dir, default_config_path,
    default_log_path,
};
pub use types::Settings;
