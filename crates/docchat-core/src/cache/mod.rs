//! Local cache persistence.
//!
//! The cache is advisory: everything read from it is validated, and every
//! write is best-effort. [`CacheStore`] is the raw key-value port;
//! [`LocalCache`] is the typed façade used by the session manager.

mod local;
mod memory;

pub use local::{CacheSnapshot, LocalCache};
pub use memory::MemoryCacheStore;

use crate::error::Result;

/// Prefix of the per-session message cache keys.
pub const MESSAGES_PREFIX: &str = "document_qa_messages_";

/// Returns the message cache key for a session.
pub fn messages_key(session_id: &str) -> String {
    format!("{MESSAGES_PREFIX}{session_id}")
}

/// Fixed cache namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Snapshot of the merged session list
    Chats,
    /// Active session id
    ActiveChat,
    /// Whether the chat screen is shown for the active session
    IsUploaded,
    SidebarCollapsed,
    Theme,
    /// Per-session threshold map
    Thresholds,
    UserPreferences,
}

impl Namespace {
    /// Every fixed namespace.
    pub const ALL: [Namespace; 7] = [
        Namespace::Chats,
        Namespace::ActiveChat,
        Namespace::IsUploaded,
        Namespace::SidebarCollapsed,
        Namespace::Theme,
        Namespace::Thresholds,
        Namespace::UserPreferences,
    ];

    /// Storage key of this namespace.
    pub fn key(self) -> &'static str {
        match self {
            Namespace::Chats => "document_qa_chats",
            Namespace::ActiveChat => "document_qa_active_chat",
            Namespace::IsUploaded => "document_qa_is_uploaded",
            Namespace::SidebarCollapsed => "document_qa_sidebar_collapsed",
            Namespace::Theme => "document_qa_theme",
            Namespace::Thresholds => "document_qa_threshold",
            Namespace::UserPreferences => "document_qa_user_preferences",
        }
    }
}

/// Raw string key-value storage that survives process restarts.
///
/// Implementations must be safe to call from the event loop: writes are
/// expected to complete (or fail) without waiting on anything but the local
/// storage medium.
pub trait CacheStore: Send + Sync {
    /// Reads the raw value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Lists every key currently present.
    fn keys(&self) -> Vec<String>;
}
