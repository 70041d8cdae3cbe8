//! Session domain model.
//!
//! This module contains the chat session summary as listed by the remote
//! session API and mirrored into the local cache.

use serde::{Deserialize, Serialize};

/// Question text the backend stores for a freshly created, still empty chat.
pub const PLACEHOLDER_QUESTION: &str = "Chat started";

/// Summary of one chat thread.
///
/// Identity is `id`: two sessions with the same `id` are the same entity
/// regardless of the other fields. The wire format uses snake_case field names
/// and `_id` for the identifier; the cached snapshot uses the same format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session identifier assigned by the backend
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Most recent question asked in this chat
    #[serde(default)]
    pub latest_question: String,
    /// Most recent answer given in this chat
    #[serde(default)]
    pub latest_answer: String,
    /// Timestamp of the most recent exchange (ISO 8601 format)
    #[serde(default)]
    pub latest_timestamp: String,
    /// Number of stored question/answer records
    #[serde(default)]
    pub message_count: u32,
}

impl Session {
    /// Creates a session summary with only an id, as a freshly created chat looks.
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            latest_question: PLACEHOLDER_QUESTION.to_string(),
            latest_answer: String::new(),
            latest_timestamp: chrono::Utc::now().to_rfc3339(),
            message_count: 1,
        }
    }

    /// Returns true if this chat has no real exchange yet.
    ///
    /// A session is a placeholder when its latest question is the backend's
    /// "Chat started" marker and it holds at most one record.
    pub fn is_placeholder(&self) -> bool {
        self.latest_question == PLACEHOLDER_QUESTION && self.message_count <= 1
    }
}
