//! Validation of persisted chat session identifiers.
//!
//! Cached values are untrusted. A naive decode of the active session entry
//! would happily accept `null`, `"null"` or `"undefined"` as an id; these
//! functions reject such sentinels.

use crate::cache::{LocalCache, Namespace};
use serde_json::Value;

/// Turns a raw persisted value into a usable session id.
///
/// The value is first decoded as JSON; when that fails it is taken as a bare
/// string. JSON scalars other than strings (e.g. a numeric id) are also taken
/// literally, while JSON `null`, arrays and objects are rejected. The
/// resulting candidate must be non-blank and neither `"null"` nor
/// `"undefined"`.
pub fn normalize_session_id(raw: &str) -> Option<String> {
    let candidate = match serde_json::from_str::<Value>(raw) {
        Ok(Value::String(decoded)) => decoded,
        Ok(Value::Null) | Ok(Value::Array(_)) | Ok(Value::Object(_)) => return None,
        Ok(Value::Bool(_)) | Ok(Value::Number(_)) | Err(_) => raw.to_string(),
    };

    is_usable(&candidate).then_some(candidate)
}

fn is_usable(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    !trimmed.is_empty() && trimmed != "null" && trimmed != "undefined"
}

/// Validates the raw active-session entry and self-heals the cache.
///
/// Returns the usable id, or `None`. When a raw value is present but invalid,
/// the active-session namespace is erased; erasing is idempotent.
pub fn validate(cache: &LocalCache, raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    match normalize_session_id(raw) {
        Some(id) => Some(id),
        None => {
            cache.remove(Namespace::ActiveChat);
            tracing::info!("[Identity] Cleaned up invalid active session id: {:?}", raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, MemoryCacheStore};
    use std::sync::Arc;

    #[test]
    fn test_rejects_sentinels() {
        for raw in ["null", "undefined", "\"null\"", "\"undefined\"", "", "\"\"", "   ", "\"  \""] {
            assert_eq!(normalize_session_id(raw), None, "raw value {raw:?}");
        }
    }

    #[test]
    fn test_rejects_structured_json() {
        assert_eq!(normalize_session_id("[]"), None);
        assert_eq!(normalize_session_id("{\"id\":\"a\"}"), None);
    }

    #[test]
    fn test_accepts_encoded_and_bare_strings() {
        assert_eq!(
            normalize_session_id("\"6f1c-42\"").as_deref(),
            Some("6f1c-42")
        );
        assert_eq!(normalize_session_id("6f1c-42").as_deref(), Some("6f1c-42"));
        assert_eq!(normalize_session_id("12345").as_deref(), Some("12345"));
    }

    #[test]
    fn test_validate_erases_invalid_entry_idempotently() {
        let store = Arc::new(MemoryCacheStore::new());
        let cache = LocalCache::new(store.clone());
        store.set(Namespace::ActiveChat.key(), "\"null\"").unwrap();

        let raw = cache.get(Namespace::ActiveChat);
        assert_eq!(validate(&cache, raw.as_deref()), None);
        assert_eq!(store.get(Namespace::ActiveChat.key()), None);

        // second pass is a no-op
        assert_eq!(validate(&cache, raw.as_deref()), None);
        assert_eq!(store.get(Namespace::ActiveChat.key()), None);
    }

    #[test]
    fn test_validate_keeps_valid_entry() {
        let store = Arc::new(MemoryCacheStore::new());
        let cache = LocalCache::new(store.clone());
        store.set(Namespace::ActiveChat.key(), "\"abc\"").unwrap();

        let raw = cache.get(Namespace::ActiveChat);
        assert_eq!(validate(&cache, raw.as_deref()).as_deref(), Some("abc"));
        assert!(store.get(Namespace::ActiveChat.key()).is_some());
    }

    #[test]
    fn test_validate_absent() {
        let cache = LocalCache::new(Arc::new(MemoryCacheStore::new()));
        assert_eq!(validate(&cache, None), None);
    }
}
