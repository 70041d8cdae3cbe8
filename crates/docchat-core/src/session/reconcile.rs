//! Reconciliation of cached chat messages with the remote history.

use super::message::{Message, QaRecord};

/// Combines cached messages for a session with the records re-fetched from the remote.
///
/// When the remote produced at least one record, the expanded remote history
/// replaces the cached messages entirely. With zero records (or when the
/// caller had to substitute an empty list for a failed fetch) the cached
/// messages are returned unchanged.
pub fn reconcile(cached: &[Message], records: &[QaRecord]) -> Vec<Message> {
    reconcile_at(cached, records, chrono::Utc::now().timestamp_millis())
}

/// Same as [`reconcile`] with an explicit clock value for synthesized ids.
pub fn reconcile_at(cached: &[Message], records: &[QaRecord], now_millis: i64) -> Vec<Message> {
    let expanded = expand_records(records, now_millis);
    if expanded.is_empty() {
        return cached.to_vec();
    }
    expanded
}

/// Reshapes flat Q/A records into an alternating user/assistant stream.
///
/// Each record yields `<base>_user` followed by `<base>_assistant`, where
/// `base` is the record's own id, or `<now_millis>_<index>` when the record
/// has none. Records with an id therefore produce identical message ids on
/// every reload.
pub fn expand_records(records: &[QaRecord], now_millis: i64) -> Vec<Message> {
    let mut messages = Vec::with_capacity(records.len() * 2);

    for (index, record) in records.iter().enumerate() {
        let base_id = match record.id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("{now_millis}_{index}"),
        };
        let metadata = record.metadata();

        messages.push(Message {
            metadata: Some(metadata.clone()),
            ..Message::user(
                format!("{base_id}_user"),
                record.question.clone(),
                record.timestamp.clone(),
            )
        });
        messages.push(Message::assistant(
            format!("{base_id}_assistant"),
            record.answer.clone(),
            record.timestamp.clone(),
            Some(metadata),
        ));
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::message::Sender;

    fn record(id: Option<&str>, question: &str, answer: &str) -> QaRecord {
        QaRecord {
            id: id.map(str::to_string),
            question: question.to_string(),
            answer: answer.to_string(),
            timestamp: "T".to_string(),
            distance: Some(0.25),
            threshold: Some(0.5),
            web_search_used: Some(false),
            web_search_reason: None,
        }
    }

    fn cached_messages() -> Vec<Message> {
        vec![
            Message::user("1_user", "cached question", "T0"),
            Message::assistant("1_assistant", "cached answer", "T0", None),
        ]
    }

    #[test]
    fn test_empty_remote_keeps_cache() {
        let cached = cached_messages();
        assert_eq!(reconcile(&cached, &[]), cached);
    }

    #[test]
    fn test_remote_replaces_cache() {
        let cached = cached_messages();
        let records = vec![record(None, "Q", "A")];

        let messages = reconcile_at(&cached, &records, 1000);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "Q");
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].timestamp, "T");
        assert_eq!(messages[1].text, "A");
        assert_eq!(messages[1].sender, Sender::Assistant);
        assert_eq!(messages[1].timestamp, "T");
        assert!(!messages.iter().any(|m| m.text.starts_with("cached")));
    }

    #[test]
    fn test_two_messages_per_record_in_order() {
        let records = vec![
            record(Some("r1"), "Q1", "A1"),
            record(None, "Q2", "A2"),
            record(Some("r3"), "Q3", "A3"),
        ];

        let messages = reconcile_at(&[], &records, 42);

        assert_eq!(messages.len(), 6);
        for (i, pair) in messages.chunks(2).enumerate() {
            assert_eq!(pair[0].sender, Sender::User);
            assert_eq!(pair[1].sender, Sender::Assistant);
            assert_eq!(pair[0].text, format!("Q{}", i + 1));
            assert_eq!(pair[1].text, format!("A{}", i + 1));
            assert_eq!(pair[0].metadata, pair[1].metadata);
        }
        assert_eq!(messages[0].id, "r1_user");
        assert_eq!(messages[1].id, "r1_assistant");
        assert_eq!(messages[2].id, "42_1_user");
        assert_eq!(messages[3].id, "42_1_assistant");
    }

    #[test]
    fn test_stable_ids_are_idempotent_across_reloads() {
        let records = vec![record(Some("r1"), "Q", "A")];
        let first = reconcile_at(&[], &records, 1);
        let second = reconcile_at(&first, &records, 999);
        assert_eq!(first, second);
    }

    #[test]
    fn test_metadata_carries_record_fields() {
        let mut rec = record(Some("r"), "Q", "A");
        rec.web_search_used = Some(true);
        rec.web_search_reason = Some("low similarity".to_string());

        let messages = expand_records(&[rec], 0);
        let meta = messages[1].metadata.as_ref().unwrap();

        assert_eq!(meta.similarity_distance, Some(0.25));
        assert_eq!(meta.threshold, Some(0.5));
        assert_eq!(meta.web_search_used, Some(true));
        assert_eq!(meta.web_search_reason.as_deref(), Some("low similarity"));
    }
}
