//! Configuration service implementation.
//!
//! Loads [`ClientConfig`] from `~/.config/docchat/config.toml` and applies
//! environment overrides on top.

use crate::paths::DocChatPaths;
use docchat_core::config::ClientConfig;
use docchat_core::error::{DocChatError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the backend base URL.
pub const BACKEND_URL_ENV: &str = "DOCCHAT_BACKEND_URL";
/// Overrides the cache directory.
pub const CACHE_DIR_ENV: &str = "DOCCHAT_CACHE_DIR";

/// Loads the client configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Creates a service reading the default config file.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(DocChatPaths::config_file()?))
    }

    /// Creates a service reading a specific config file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration with process environment overrides applied.
    ///
    /// A missing file yields the defaults. The cache directory falls back to
    /// the platform data directory when neither the file nor the environment
    /// sets it.
    pub fn load(&self) -> Result<ClientConfig> {
        let config = self.load_with_env(|name| std::env::var(name).ok())?;
        tracing::debug!(
            "[ConfigService] Backend: {}, cache: {:?}",
            config.backend_url,
            config.cache_dir
        );
        Ok(config)
    }

    /// Loads the configuration using `env` to look up overrides.
    pub fn load_with_env<F>(&self, env: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.load_file()?;

        if let Some(url) = env(BACKEND_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.backend_url = url;
        }
        if let Some(dir) = env(CACHE_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            config.cache_dir = Some(PathBuf::from(dir));
        }
        if config.cache_dir.is_none() {
            config.cache_dir = DocChatPaths::cache_dir().ok();
        }

        Ok(config)
    }

    fn load_file(&self) -> Result<ClientConfig> {
        if !self.path.exists() {
            tracing::debug!(
                "[ConfigService] No config at {}, using defaults",
                self.path.display()
            );
            return Ok(ClientConfig::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            DocChatError::config(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))
        })?;

        if content.trim().is_empty() {
            return Ok(ClientConfig::default());
        }

        Ok(toml::from_str(&content)?)
    }
}
