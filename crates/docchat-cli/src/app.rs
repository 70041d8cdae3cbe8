//! Composition root: wires configuration, cache and backend into a session manager.

use crate::GlobalArgs;
use anyhow::{Context, Result};
use docchat_core::cache::{CacheStore, LocalCache, MemoryCacheStore};
use docchat_core::config::ClientConfig;
use docchat_core::session::SessionManager;
use docchat_infrastructure::{ConfigService, FileCacheStore};
use docchat_interaction::HttpChatApi;
use std::sync::Arc;

/// Resolves configuration with CLI flags taking precedence.
pub fn resolve_config(args: &GlobalArgs) -> Result<ClientConfig> {
    let mut config = ConfigService::new()
        .and_then(|service| service.load())
        .context("Failed to load configuration")?;

    if let Some(url) = &args.backend_url {
        config.backend_url = url.clone();
    }
    if let Some(dir) = &args.cache_dir {
        config.cache_dir = Some(dir.clone());
    }
    Ok(config)
}

/// Builds the session manager and runs the startup flow.
pub async fn bootstrap(args: &GlobalArgs) -> Result<SessionManager> {
    let config = resolve_config(args)?;
    tracing::info!("[Bootstrap] Backend: {}", config.backend_url);

    let store: Arc<dyn CacheStore> = if args.ephemeral {
        tracing::info!("[Bootstrap] Using in-memory cache");
        Arc::new(MemoryCacheStore::new())
    } else {
        let dir = config
            .cache_dir
            .clone()
            .context("No cache directory available; pass --cache-dir or --ephemeral")?;
        tracing::info!("[Bootstrap] Cache directory: {}", dir.display());
        Arc::new(FileCacheStore::new(dir)?)
    };

    let api = Arc::new(HttpChatApi::from_config(&config));
    let manager = SessionManager::new(api, LocalCache::new(store));
    manager.initialize().await;
    tracing::info!("[Bootstrap] Session manager ready");

    Ok(manager)
}
