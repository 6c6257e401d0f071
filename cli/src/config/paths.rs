//! Platform-specific path utilities for flagctl.

use std::path::PathBuf;

use crate::error::{FlagctlError, Result};

/// Get the configuration directory for flagctl.
///
/// - Linux: `~/.config/flagctl`
/// - macOS: `~/Library/Application Support/flagctl`
/// - Windows: `%APPDATA%\flagctl`
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| FlagctlError::Config("Cannot determine config directory".to_string()))?;
    Ok(base.join("flagctl"))
}

/// Get the main configuration file path.
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Ensure the configuration directory exists.
#[allow(dead_code)]
pub fn ensure_config_dir() -> Result<PathBuf> {
    let dir = config_dir()?;
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}
