//! Logger setup: stderr plus a size-rotated log file.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use pretty_env_logger::env_logger::Target;
use stream_watcher_config::Settings;

/// Sends each formatted log line to stderr and to the rotating file.
struct LogTee {
    file: FileRotate<AppendCount>,
}

impl Write for LogTee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _ = io::stderr().write_all(buf);
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = io::stderr().flush();
        self.file.flush()
    }
}

/// Open `path` for appending, rotating past `max_bytes` and keeping `backups`
/// older files (`<path>.1` is the newest).
fn open_rotating(
    path: &Path,
    max_bytes: usize,
    backups: usize,
) -> io::Result<FileRotate<AppendCount>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let suffixes = AppendCount::new(backups.max(1));
    let limit = ContentLimit::BytesSurpassed(max_bytes.max(1));

    #[cfg(unix)]
    let file = FileRotate::new(path, suffixes, limit, Compression::None, None);
    #[cfg(not(unix))]
    let file = FileRotate::new(path, suffixes, limit, Compression::None);

    Ok(file)
}

/// Set up logging.
///
/// The filter comes from `RUST_LOG`, then `--verbose`, then the level in
/// `settings`. When `log_path` is given, every line is also appended to that
/// file, which rotates at the configured size.
pub fn init(verbose: bool, settings: &Settings, log_path: Option<&Path>) {
    let mut builder = pretty_env_logger::formatted_builder();

    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else {
        builder.filter_level(settings.level_filter());
    }

    let mut file_error = None;
    if let Some(path) = log_path {
        match open_rotating(path, settings.max_log_bytes(), settings.log_backup_count) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(LogTee { file })));
            }
            Err(e) => file_error = Some(e),
        }
    }

    builder.init();

    if let Some(path) = log_path {
        match file_error {
            Some(e) => log::warn!("Cannot open log file {}: {e}", path.display()),
            None => log::debug!("Logging to {}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rotates_past_size_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("stream_watcher.log");

        let mut tee = LogTee {
            file: open_rotating(&path, 64, 2).unwrap(),
        };
        for n in 0..12 {
            let line = format!("line {n:02} of the rotating log test...\n");
            tee.write_all(line.as_bytes()).unwrap();
        }
        tee.flush().unwrap();

        assert!(path.is_file());
        assert!(dir.path().join("logs/stream_watcher.log.1").is_file());
        assert!(dir.path().join("logs/stream_watcher.log.2").is_file());
        assert!(!dir.path().join("logs/stream_watcher.log.3").exists());
        assert!(fs::metadata(&path).unwrap().len() < 200);
    }

    #[test]
    fn test_lines_stay_whole_across_rotation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stream_watcher.log");

        let mut tee = LogTee {
            file: open_rotating(&path, 32, 1).unwrap(),
        };
        tee.write_all(b"first record, longer than the limit\n")
            .unwrap();
        tee.write_all(b"second record\n").unwrap();
        tee.flush().unwrap();

        let rotated = fs::read_to_string(dir.path().join("stream_watcher.log.1")).unwrap();
        assert_eq!(rotated, "first record, longer than the limit\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "second record\n");
    }
}
