//! Interactive prompts using dialoguer.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::io;
use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input, Select};
use stream_watcher_config::Settings;
use stream_watcher_copy::CollisionMode;

/// Walk the user through the settings `init` writes, starting from `current`.
///
/// # Errors
///
/// * If the user cancels a prompt
pub fn prompt_settings(current: &Settings, cwd: &Path) -> io::Result<Settings> {
    let mut settings = current.clone();

    settings.source_root = prompt_folder("Folder to watch", &current.source_root, cwd)?;
    if !settings.source_root.is_dir() {
        let keep = Confirm::new()
            .with_prompt(format!(
                "{} does not exist yet. Use it anyway?",
                settings.source_root.display()
            ))
            .default(true)
            .interact()?;
        if !keep {
            settings.source_root = prompt_folder("Folder to watch", &current.source_root, cwd)?;
        }
    }

    settings.destination_root =
        prompt_folder("Folder to copy into", &current.destination_root, cwd)?;

    settings.stable_seconds = Input::new()
        .with_prompt("Seconds a file must stay unchanged before copying")
        .default(current.stable_seconds)
        .interact_text()?;

    let modes: Vec<String> = CollisionMode::ALL.iter().map(ToString::to_string).collect();
    let default_mode = CollisionMode::ALL
        .iter()
        .position(|m| *m == current.collision_mode)
        .unwrap_or(0);
    let choice = Select::new()
        .with_prompt("When the destination already has that file")
        .items(&modes)
        .default(default_mode)
        .interact()?;
    settings.collision_mode = CollisionMode::ALL[choice];

    settings.verify = Confirm::new()
        .with_prompt("Verify copies with a SHA-256 checksum?")
        .default(current.verify)
        .interact()?;

    settings.normalize();
    Ok(settings)
}

/// Prompt for a folder, resolving relative answers against `cwd`.
fn prompt_folder(prompt: &str, current: &Path, cwd: &Path) -> io::Result<PathBuf> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if !current.as_os_str().is_empty() {
        input = input.default(current.display().to_string());
    }
    let answer: String = input.interact_text()?;

    Ok(resolve_folder(answer.trim(), cwd))
}

/// Absolute, lexically cleaned form of `answer`.
fn resolve_folder(answer: &str, cwd: &Path) -> PathBuf {
    let path = PathBuf::from(answer);
    let path = if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    };
    path_clean::clean(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_folder_relative() {
        let resolved = resolve_folder("./captures/../incoming", Path::new("/home/me"));
        assert_eq!(resolved, PathBuf::from("/home/me/incoming"));
    }

    #[test]
    fn test_resolve_folder_absolute() {
        let resolved = resolve_folder("/mnt/archive//2024/", Path::new("/home/me"));
        assert_eq!(resolved, PathBuf::from("/mnt/archive/2024"));
    }
}
