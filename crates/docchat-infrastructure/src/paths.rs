//! Unified path management for docchat configuration and cache files.
//!
//! Paths follow the platform conventions resolved by the `dirs` crate
//! (XDG on Linux, `Application Support` on macOS, `AppData` on Windows).

use docchat_core::error::{DocChatError, Result};
use std::path::PathBuf;

const APP_NAME: &str = "docchat";

/// Unified path management for docchat.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/docchat/           # Config directory
/// └── config.toml              # Client configuration
///
/// ~/.local/share/docchat/      # Data directory
/// └── cache/                   # Local cache, one file per key
/// ```
pub struct DocChatPaths;

impl DocChatPaths {
    /// Returns the docchat configuration directory.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or_else(|| DocChatError::config("Cannot find config directory"))
    }

    /// Returns the docchat data directory.
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or_else(|| DocChatError::config("Cannot find data directory"))
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the default cache directory.
    pub fn cache_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("cache"))
    }
}
