//! Name-based filtering of watched files.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::collections::BTreeSet;
use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::GlobError;

/// Raw filter settings, as stored in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Allowed extensions without the leading dot. Empty accepts everything.
    pub extensions: Vec<String>,
    /// File name globs of which at least one must match. Empty accepts everything.
    pub include_globs: Vec<String>,
    /// File name globs that reject a file when any of them match.
    pub exclude_globs: Vec<String>,
}

/// Compiled filter deciding whether a path should be tracked.
///
/// All matching is case-insensitive and done against the file name only.
#[derive(Debug, Clone)]
pub struct FileFilter {
    extensions: BTreeSet<String>,
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl FileFilter {
    /// Compile a filter from its options.
    ///
    /// # Errors
    ///
    /// * If any include or exclude pattern is not a valid glob
    pub fn new(options: &FilterOptions) -> Result<Self, GlobError> {
        Ok(Self {
            extensions: normalize_extensions(&options.extensions).into_iter().collect(),
            include: compile_set(&options.include_globs)?,
            exclude: compile_set(&options.exclude_globs)?,
        })
    }

    /// A filter that accepts every file.
    #[must_use]
    pub const fn accept_all() -> Self {
        Self {
            extensions: BTreeSet::new(),
            include: None,
            exclude: None,
        }
    }

    /// Replace the extension allow-list, keeping the glob rules.
    pub fn set_extensions(&mut self, extensions: &[String]) {
        self.extensions = normalize_extensions(extensions).into_iter().collect();
        log::debug!("Extension allow-list now {:?}", self.extensions);
    }

    /// The normalized extension allow-list.
    #[must_use]
    pub fn extensions(&self) -> Vec<String> {
        self.extensions.iter().cloned().collect()
    }

    /// Decide whether `path` should be tracked.
    ///
    /// Include globs are checked first, then exclude globs, then the
    /// extension allow-list.
    #[must_use]
    pub fn should_track(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };

        if let Some(include) = &self.include {
            if !include.is_match(name.as_ref()) {
                log::debug!("Ignoring {name} (does not match any include pattern)");
                return false;
            }
        }

        if let Some(exclude) = &self.exclude {
            if exclude.is_match(name.as_ref()) {
                log::debug!("Excluding {name} (matches an exclude pattern)");
                return false;
            }
        }

        if self.extensions.is_empty() {
            return true;
        }

        let ext = Path::new(name.as_ref())
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let allowed = self.extensions.contains(&ext);
        if !allowed {
            log::debug!("Ignoring {name} (extension {ext:?} not allowed)");
        }
        allowed
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::accept_all()
    }
}

/// Normalize extensions: trim, lowercase, strip leading dots, drop blanks.
#[must_use]
pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect();
    normalized.dedup();
    normalized
}

fn compile_set(patterns: &[String]) -> Result<Option<GlobSet>, GlobError> {
    let patterns: Vec<&str> = patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();

    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in &patterns {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| GlobError::InvalidPattern {
                pattern: (*pattern).to_string(),
                source: e,
            })?;
        builder.add(glob);
    }

    builder
        .build()
        .map(Some)
        .map_err(|e| GlobError::InvalidPattern {
            pattern: patterns.join(", "),
            source: e,
        })
}
