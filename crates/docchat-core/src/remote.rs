//! Remote document-QA API port.
//!
//! Defines the request/response contract of the session/document backend.
//! The core never talks HTTP itself; adapters implement [`ChatApi`].

use crate::error::Result;
use crate::session::{MessageMetadata, QaRecord, Session};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A document attached to a chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub document_id: String,
    pub filename: String,
    /// MIME type reported at upload; the backend may store none
    #[serde(default)]
    pub content_type: Option<String>,
    /// Upload time (ISO 8601 format)
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

/// A file to upload, already read into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Question sent to the answering endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub question: String,
    pub chat_id: Option<String>,
    pub threshold: f64,
    pub use_web_search: bool,
}

/// Answer returned by the answering endpoint.
///
/// Only `answer` is guaranteed; the backend omits the retrieval fields when
/// it answers without consulting a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default)]
    pub debug_dist: Option<f64>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub web_search_used: Option<bool>,
    #[serde(default)]
    pub web_search_reason: Option<String>,
}

impl QueryResponse {
    /// Metadata attached to the assistant message built from this answer.
    pub fn metadata(&self) -> MessageMetadata {
        MessageMetadata {
            similarity_distance: self.debug_dist,
            threshold: self.threshold,
            web_search_used: self.web_search_used,
            web_search_reason: self.web_search_reason.clone(),
        }
    }
}

/// An abstract client of the session/document backend.
///
/// One method per remote operation. Implementations perform no retries and
/// configure no timeouts; callers decide how to degrade on failure.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Creates a session and returns its backend-assigned id.
    async fn create_session(&self) -> Result<String>;

    /// Lists every session the backend knows about.
    async fn list_sessions(&self) -> Result<Vec<Session>>;

    /// Fetches the Q/A history of a session, oldest first.
    async fn get_messages(&self, session_id: &str) -> Result<Vec<QaRecord>>;

    async fn delete_session(&self, session_id: &str) -> Result<()>;

    async fn delete_all_sessions(&self) -> Result<()>;

    async fn get_documents(&self, session_id: &str) -> Result<Vec<Document>>;

    /// Uploads a document, optionally attaching it to a session.
    async fn upload_document(&self, file: UploadFile, session_id: Option<&str>) -> Result<()>;

    /// Asks a question against the session's documents.
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse>;

    async fn get_threshold(&self, session_id: &str) -> Result<f64>;

    async fn set_threshold(&self, session_id: &str, threshold: f64) -> Result<()>;
}
