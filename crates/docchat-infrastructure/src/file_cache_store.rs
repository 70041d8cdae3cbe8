//! File-backed implementation of the local cache store.
//!
//! Each key is stored as `<encoded key>.json` in a single cache directory.
//! Writes go through a temporary file in the same directory followed by an
//! atomic rename, so readers never observe a half-written value. Writes are
//! not fsynced: the cache is rewritten on every state change and a lost
//! write only costs the latest snapshot.

use docchat_core::cache::CacheStore;
use docchat_core::error::{DocChatError, Result};
use std::fs::{self, File};
use std::io::{ErrorKind, Write as IoWrite};
use std::path::{Path, PathBuf};

const EXTENSION: &str = ".json";

/// A [`CacheStore`] persisting one file per key.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    /// Opens (and creates if needed) a cache directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            DocChatError::io(format!(
                "Failed to create cache directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        tracing::debug!("[FileCacheStore] Using cache directory {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}{}", encode_key(key), EXTENSION))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!(".{}.{}.tmp", encode_key(key), uuid::Uuid::new_v4()))
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("[FileCacheStore] Failed to read '{}': {}", key, e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let tmp_path = self.temp_path_for(key);

        let written = File::create(&tmp_path)
            .and_then(|mut tmp_file| tmp_file.write_all(value.as_bytes()));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        fs::rename(&tmp_path, self.path_for(key)).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DocChatError::from(e)
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    "[FileCacheStore] Failed to list {}: {}",
                    self.dir.display(),
                    e
                );
                return Vec::new();
            }
        };

        let mut keys: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter_map(|name| name.strip_suffix(EXTENSION).and_then(decode_key))
            .collect();
        keys.sort();
        keys
    }
}

/// Percent-encodes a key into a file-name-safe form (no `/` survives).
fn encode_key(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}

fn decode_key(encoded: &str) -> Option<String> {
    urlencoding::decode(encoded).ok().map(|key| key.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docchat_core::cache::{LocalCache, Namespace};
    use docchat_core::state::{ChatState, Theme};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileCacheStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(temp_dir.path().join("cache")).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_set_get_remove() {
        let (_temp, store) = store();

        assert_eq!(store.get("document_qa_theme"), None);
        store.set("document_qa_theme", "\"dark\"").unwrap();
        assert_eq!(store.get("document_qa_theme").as_deref(), Some("\"dark\""));

        store.set("document_qa_theme", "\"light\"").unwrap();
        assert_eq!(store.get("document_qa_theme").as_deref(), Some("\"light\""));

        store.remove("document_qa_theme").unwrap();
        assert_eq!(store.get("document_qa_theme"), None);
        // removing again is fine
        store.remove("document_qa_theme").unwrap();
    }

    #[test]
    fn test_keys_decode_unsafe_characters() {
        let (_temp, store) = store();
        store.set("document_qa_messages_a/b c", "[]").unwrap();
        store.set("document_qa_messages_../escape", "[]").unwrap();
        store.set("document_qa_chats", "[]").unwrap();

        assert_eq!(
            store.keys(),
            vec![
                "document_qa_chats".to_string(),
                "document_qa_messages_../escape".to_string(),
                "document_qa_messages_a/b c".to_string(),
            ]
        );
        // nothing escaped the cache directory
        assert_eq!(fs::read_dir(store.dir()).unwrap().count(), 3);
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let (_temp, store) = store();
        store.set("k", "v").unwrap();

        let names: Vec<String> = fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["k.json".to_string()]);
    }

    #[test]
    fn test_encode_key_is_file_name_safe() {
        assert_eq!(encode_key("document_qa_chats"), "document_qa_chats");
        assert_eq!(encode_key("a/b c"), "a%2Fb%20c");
        for key in ["with space", "ünïcode", "100%", "a.b", "x/../y"] {
            assert!(!encode_key(key).contains('/'));
            assert_eq!(decode_key(&encode_key(key)).as_deref(), Some(key));
        }
        // not valid UTF-8 once decoded
        assert_eq!(decode_key("%FF%FE"), None);
    }

    #[test]
    fn test_stray_temp_files_are_not_keys() {
        let (_temp, store) = store();
        store.set("document_qa_theme", "\"dark\"").unwrap();
        fs::write(store.dir().join(".document_qa_theme.abc.tmp"), "partial").unwrap();

        assert_eq!(store.keys(), vec!["document_qa_theme".to_string()]);
    }

    #[test]
    fn test_repeated_snapshots_keep_one_file_per_key() {
        let (_temp, store) = store();
        let cache = LocalCache::new(Arc::new(store.clone()));
        let mut state = ChatState::new();
        for i in 0..20 {
            state.active_session_id = Some(format!("chat-{i}"));
            cache.save_snapshot(&state);
        }

        let files = fs::read_dir(store.dir()).unwrap().count();
        assert_eq!(files, store.keys().len());
        assert_eq!(
            cache.load_snapshot().active_session_id.as_deref(),
            Some("chat-19")
        );
    }

    #[test]
    fn test_survives_restart_through_local_cache() {
        let (temp, store) = store();
        let cache = LocalCache::new(Arc::new(store));
        let mut state = ChatState::new();
        state.theme = Theme::Dark;
        state.active_session_id = Some("abc".to_string());
        cache.save_snapshot(&state);

        let reopened = FileCacheStore::new(temp.path().join("cache")).unwrap();
        let snapshot = LocalCache::new(Arc::new(reopened)).load_snapshot();
        assert_eq!(snapshot.theme, Some(Theme::Dark));
        assert_eq!(snapshot.active_session_id.as_deref(), Some("abc"));

        cache.clear_all();
        assert!(LocalCache::new(Arc::new(FileCacheStore::new(temp.path().join("cache")).unwrap()))
            .get(Namespace::Theme)
            .is_none());
    }
}
