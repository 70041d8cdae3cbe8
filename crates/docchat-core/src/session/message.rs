//! Chat message types.
//!
//! `Message` is the bidirectional stream entry shown in a chat window.
//! `QaRecord` is the flat question/answer record returned by the history
//! endpoint; each record expands into one user and one assistant message.

use serde::{Deserialize, Serialize};

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Message typed by the user.
    User,
    /// Answer produced by the backend.
    Assistant,
}

/// Retrieval details attached to an answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    /// Vector distance between the question and the best matching chunk
    #[serde(default, alias = "distance", skip_serializing_if = "Option::is_none")]
    pub similarity_distance: Option<f64>,
    /// Similarity threshold the answer was produced with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// Whether the backend augmented the answer with a web search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_search_used: Option<bool>,
    /// Backend explanation of the web search decision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_search_reason: Option<String>,
}

/// A single message in a chat window.
///
/// Messages are immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    /// Timestamp when the message was created (ISO 8601 format).
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl Message {
    /// Creates a user message without metadata.
    pub fn user(id: impl Into<String>, text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            sender: Sender::User,
            timestamp: timestamp.into(),
            metadata: None,
        }
    }

    /// Creates an assistant message.
    pub fn assistant(
        id: impl Into<String>,
        text: impl Into<String>,
        timestamp: impl Into<String>,
        metadata: Option<MessageMetadata>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            sender: Sender::Assistant,
            timestamp: timestamp.into(),
            metadata,
        }
    }
}

/// One question/answer exchange as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaRecord {
    /// Stable record id, when the backend exposes one
    #[serde(default, rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub web_search_used: Option<bool>,
    #[serde(default)]
    pub web_search_reason: Option<String>,
}

impl QaRecord {
    /// Metadata shared by both messages derived from this record.
    pub fn metadata(&self) -> MessageMetadata {
        MessageMetadata {
            similarity_distance: self.distance,
            threshold: self.threshold,
            web_search_used: self.web_search_used,
            web_search_reason: self.web_search_reason.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Sender::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_metadata_accepts_legacy_distance_key() {
        let meta: MessageMetadata =
            serde_json::from_str(r#"{"distance": 0.42, "webSearchUsed": true}"#).unwrap();
        assert_eq!(meta.similarity_distance, Some(0.42));
        assert_eq!(meta.web_search_used, Some(true));
        assert_eq!(meta.threshold, None);
    }

    #[test]
    fn test_qa_record_from_history_payload() {
        let json = r#"{
            "chat_id": "c1",
            "question": "Q",
            "answer": "A",
            "distance": 0.3,
            "threshold": 0.5,
            "web_search_used": false,
            "timestamp": "2025-01-01T00:00:00",
            "created_at": "2025-01-01T00:00:00"
        }"#;
        let record: QaRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, None);
        assert_eq!(record.question, "Q");
        assert_eq!(record.metadata().threshold, Some(0.5));
        assert_eq!(record.metadata().web_search_reason, None);
    }
}
