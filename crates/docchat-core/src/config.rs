use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Backend used when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Client configuration as stored in `config.toml`.
///
/// Every field is optional in the file; `cache_dir` stays `None` until the
/// infrastructure layer resolves the platform data directory.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub backend_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            cache_dir: None,
        }
    }
}

impl ClientConfig {
    /// Backend base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config, ClientConfig::default());

        let config: ClientConfig = toml::from_str(r#"cache_dir = "/tmp/dc""#).unwrap();
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/dc")));
    }

    #[test]
    fn test_base_url_trims_slash() {
        let config = ClientConfig {
            backend_url: "http://api.example.com/".to_string(),
            cache_dir: None,
        };
        assert_eq!(config.base_url(), "http://api.example.com");
    }
}
