pub mod config_service;
pub mod file_cache_store;
pub mod paths;

pub use crate::config_service::ConfigService;
pub use crate::file_cache_store::FileCacheStore;
pub use crate::paths::DocChatPaths;
