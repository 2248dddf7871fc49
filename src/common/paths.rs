//! Configuration and data paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/agentqa/`, `~/.local/share/agentqa/`
//! - macOS: `~/Library/Application Support/agentqa/`
//! - Windows: `%APPDATA%\agentqa\`

use std::io;
use std::path::{Path, PathBuf};

/// Application name used for directory lookups
const APP_NAME: &str = "agentqa";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the default configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the directory for agentqa's own log file
pub fn log_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("logs"))
}

/// Turn a test case id into a single safe path component
///
/// Path separators, control characters and characters Windows rejects are
/// replaced with `_`. Ids made only of dots map to `_` so they can never
/// point at the current or parent directory.
pub fn sanitize_component(id: &str) -> String {
    let cleaned: String = id
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Create a directory (and parents) if it does not exist yet
pub fn ensure_dir(dir: &Path) -> io::Result<PathBuf> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(dir.to_path_buf())
}
