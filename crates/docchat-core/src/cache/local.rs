use super::{CacheStore, MESSAGES_PREFIX, Namespace, messages_key};
use crate::identity;
use crate::session::{Message, Session};
use crate::state::{ChatState, Theme, UserPreferences};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything found in the cache on startup.
///
/// Every field is independently optional: a missing or corrupt namespace
/// leaves its field `None` without affecting the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheSnapshot {
    pub sessions: Option<Vec<Session>>,
    pub active_session_id: Option<String>,
    pub is_uploaded: Option<bool>,
    pub sidebar_collapsed: Option<bool>,
    pub theme: Option<Theme>,
    pub thresholds: Option<HashMap<String, f64>>,
    pub preferences: Option<UserPreferences>,
}

impl CacheSnapshot {
    /// Applies every present field onto `state`.
    pub fn apply_to(self, state: &mut ChatState) {
        if let Some(sessions) = self.sessions {
            state.sessions = sessions;
        }
        if let Some(id) = self.active_session_id {
            state.active_session_id = Some(id);
        }
        if let Some(is_uploaded) = self.is_uploaded {
            state.is_uploaded = is_uploaded;
        }
        if let Some(collapsed) = self.sidebar_collapsed {
            state.sidebar_collapsed = collapsed;
        }
        if let Some(theme) = self.theme {
            state.theme = theme;
        }
        if let Some(thresholds) = self.thresholds {
            state.thresholds = thresholds;
        }
        if let Some(preferences) = self.preferences {
            state.preferences = preferences;
        }
    }
}

/// Typed, best-effort access to the local cache.
///
/// Values are stored as JSON. Write failures (quota, I/O) are logged and
/// swallowed; values that fail to decode are erased and treated as absent.
#[derive(Clone)]
pub struct LocalCache {
    store: Arc<dyn CacheStore>,
}

impl LocalCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Reads the raw value of a namespace.
    pub fn get(&self, namespace: Namespace) -> Option<String> {
        self.store.get(namespace.key())
    }

    /// Writes a raw value into a namespace.
    pub fn set(&self, namespace: Namespace, value: &str) {
        self.set_key(namespace.key(), value);
    }

    /// Erases a namespace. Erasing a missing namespace is a no-op.
    pub fn remove(&self, namespace: Namespace) {
        self.remove_key(namespace.key());
    }

    /// Reads and decodes a namespace.
    pub fn read<T: DeserializeOwned>(&self, namespace: Namespace) -> Option<T> {
        self.read_key(namespace.key())
    }

    /// Encodes and writes a namespace.
    pub fn write<T: Serialize + ?Sized>(&self, namespace: Namespace, value: &T) {
        self.write_key(namespace.key(), value);
    }

    /// Cached messages of one session.
    pub fn read_messages(&self, session_id: &str) -> Option<Vec<Message>> {
        self.read_key(&messages_key(session_id))
    }

    pub fn write_messages(&self, session_id: &str, messages: &[Message]) {
        self.write_key(&messages_key(session_id), messages);
    }

    pub fn remove_messages(&self, session_id: &str) {
        self.remove_key(&messages_key(session_id));
    }

    /// The cached session list snapshot, empty when absent.
    pub fn cached_sessions(&self) -> Vec<Session> {
        self.read(Namespace::Chats).unwrap_or_default()
    }

    /// Loads every namespace independently.
    ///
    /// The active session id goes through the identity validator, which erases
    /// the entry when it holds a sentinel value.
    pub fn load_snapshot(&self) -> CacheSnapshot {
        let raw_active = self.get(Namespace::ActiveChat);

        CacheSnapshot {
            sessions: self.read(Namespace::Chats),
            active_session_id: identity::validate(self, raw_active.as_deref()),
            is_uploaded: self.read(Namespace::IsUploaded),
            sidebar_collapsed: self.read(Namespace::SidebarCollapsed),
            theme: self.read(Namespace::Theme),
            thresholds: self.read(Namespace::Thresholds),
            preferences: self.read(Namespace::UserPreferences),
        }
    }

    /// Overwrites every namespace from the current state.
    ///
    /// The active session's messages are written to its message namespace; an
    /// absent or invalid active pointer erases the active-session entry.
    pub fn save_snapshot(&self, state: &ChatState) {
        let active = state
            .active_session_id
            .as_deref()
            .and_then(identity::normalize_session_id);

        match active.as_deref() {
            Some(id) => self.write(Namespace::ActiveChat, id),
            None => self.remove(Namespace::ActiveChat),
        }
        self.write(Namespace::IsUploaded, &state.is_uploaded);
        self.write(Namespace::SidebarCollapsed, &state.sidebar_collapsed);
        self.write(Namespace::Theme, &state.theme);
        self.write(Namespace::UserPreferences, &state.preferences);
        self.write(Namespace::Thresholds, &state.thresholds);
        self.write(Namespace::Chats, &state.sessions);

        if let Some(id) = active.as_deref() {
            self.write_messages(id, &state.messages);
        }
    }

    /// Removes every fixed namespace and every per-session message entry.
    ///
    /// Message entries are discovered by listing the store, since the set of
    /// session ids is unbounded.
    pub fn clear_all(&self) {
        for namespace in Namespace::ALL {
            self.remove(namespace);
        }

        let message_keys: Vec<String> = self
            .store
            .keys()
            .into_iter()
            .filter(|key| key.starts_with(MESSAGES_PREFIX))
            .collect();

        for key in &message_keys {
            self.remove_key(key);
        }

        tracing::debug!(
            "[LocalCache] Cleared all namespaces and {} message cache(s)",
            message_keys.len()
        );
    }

    fn read_key<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("[LocalCache] Discarding unreadable entry '{}': {}", key, e);
                self.remove_key(key);
                None
            }
        }
    }

    fn write_key<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.set_key(key, &json),
            Err(e) => tracing::error!("[LocalCache] Failed to encode '{}': {}", key, e),
        }
    }

    fn set_key(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::error!("[LocalCache] Failed to write '{}': {}", key, e);
        }
    }

    fn remove_key(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            tracing::error!("[LocalCache] Failed to remove '{}': {}", key, e);
        }
    }
}
