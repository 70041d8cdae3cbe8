//! In-memory backend used by the session manager tests.

use super::message::QaRecord;
use super::model::Session;
use crate::error::{DocChatError, Result};
use crate::remote::{ChatApi, Document, QueryRequest, QueryResponse, UploadFile};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::Notify;

pub(crate) fn record(question: &str, answer: &str, timestamp: &str) -> QaRecord {
    QaRecord {
        id: None,
        question: question.to_string(),
        answer: answer.to_string(),
        timestamp: timestamp.to_string(),
        distance: Some(0.2),
        threshold: Some(0.5),
        web_search_used: Some(false),
        web_search_reason: None,
    }
}

/// Mock backend with switchable failures and an optional history gate.
#[derive(Default)]
pub(crate) struct MockChatApi {
    sessions: Mutex<Vec<Session>>,
    histories: Mutex<HashMap<String, Vec<QaRecord>>>,
    thresholds: Mutex<HashMap<String, f64>>,
    documents: Mutex<HashMap<String, Vec<Document>>>,
    uploads: Mutex<Vec<(String, Option<String>)>>,
    queries: Mutex<Vec<QueryRequest>>,
    failing: Mutex<HashSet<String>>,
    gated: Mutex<Option<String>>,
    gated_queries: AtomicBool,
    lagging_list: AtomicBool,
    next_id: AtomicU32,
    /// Released to let a gated history fetch or query complete
    pub gate: Notify,
}

impl MockChatApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the named operation fail from now on.
    pub fn fail(&self, operation: &str) {
        self.failing.lock().unwrap().insert(operation.to_string());
    }

    /// Makes history fetches of `session_id` wait for [`MockChatApi::gate`].
    pub fn gate_history(&self, session_id: &str) {
        *self.gated.lock().unwrap() = Some(session_id.to_string());
    }

    /// Makes queries wait for [`MockChatApi::gate`].
    pub fn gate_queries(&self) {
        self.gated_queries.store(true, Ordering::SeqCst);
    }

    /// Created sessions no longer show up in the session list.
    pub fn lag_list(&self) {
        self.lagging_list.store(true, Ordering::SeqCst);
    }

    pub fn add_session(&self, session: Session) {
        self.sessions.lock().unwrap().push(session);
    }

    pub fn set_history(&self, session_id: &str, records: Vec<QaRecord>) {
        self.histories
            .lock()
            .unwrap()
            .insert(session_id.to_string(), records);
    }

    pub fn set_remote_threshold(&self, session_id: &str, threshold: f64) {
        self.thresholds
            .lock()
            .unwrap()
            .insert(session_id.to_string(), threshold);
    }

    pub fn remote_threshold(&self, session_id: &str) -> Option<f64> {
        self.thresholds.lock().unwrap().get(session_id).copied()
    }

    pub fn add_document(&self, session_id: &str, filename: &str) {
        self.documents
            .lock()
            .unwrap()
            .entry(session_id.to_string())
            .or_default()
            .push(Document {
                document_id: format!("doc-{filename}"),
                filename: filename.to_string(),
                content_type: Some("text/plain".to_string()),
                uploaded_at: Some("2025-01-01T00:00:00Z".to_string()),
            });
    }

    pub fn uploads(&self) -> Vec<(String, Option<String>)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn last_query(&self) -> Option<QueryRequest> {
        self.queries.lock().unwrap().last().cloned()
    }

    fn check(&self, operation: &str) -> Result<()> {
        if self.failing.lock().unwrap().contains(operation) {
            return Err(DocChatError::remote(
                operation,
                Some(500),
                "Internal Server Error",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatApi for MockChatApi {
    async fn create_session(&self) -> Result<String> {
        self.check("create_session")?;
        let id = format!("chat-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        if !self.lagging_list.load(Ordering::SeqCst) {
            self.add_session(Session::placeholder(id.clone()));
        }
        Ok(id)
    }

    async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.check("list_sessions")?;
        Ok(self.sessions.lock().unwrap().clone())
    }

    async fn get_messages(&self, session_id: &str) -> Result<Vec<QaRecord>> {
        let gated = self.gated.lock().unwrap().as_deref() == Some(session_id);
        if gated {
            self.gate.notified().await;
        }
        self.check("get_messages")?;
        Ok(self
            .histories
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.check("delete_session")?;
        self.sessions.lock().unwrap().retain(|s| s.id != session_id);
        self.histories.lock().unwrap().remove(session_id);
        Ok(())
    }

    async fn delete_all_sessions(&self) -> Result<()> {
        self.check("delete_all_sessions")?;
        self.sessions.lock().unwrap().clear();
        self.histories.lock().unwrap().clear();
        Ok(())
    }

    async fn get_documents(&self, session_id: &str) -> Result<Vec<Document>> {
        self.check("get_documents")?;
        Ok(self
            .documents
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn upload_document(&self, file: UploadFile, session_id: Option<&str>) -> Result<()> {
        self.check("upload_document")?;
        self.uploads
            .lock()
            .unwrap()
            .push((file.file_name, session_id.map(str::to_string)));
        Ok(())
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        self.queries.lock().unwrap().push(request.clone());
        if self.gated_queries.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }
        self.check("query")?;
        Ok(QueryResponse {
            answer: format!("Answer to: {}", request.question),
            debug_dist: Some(0.25),
            threshold: Some(request.threshold),
            web_search_used: Some(request.use_web_search),
            web_search_reason: None,
        })
    }

    async fn get_threshold(&self, session_id: &str) -> Result<f64> {
        self.check("get_threshold")?;
        Ok(self
            .thresholds
            .lock()
            .unwrap()
            .get(session_id)
            .copied()
            .unwrap_or(0.5))
    }

    async fn set_threshold(&self, session_id: &str, threshold: f64) -> Result<()> {
        self.check("set_threshold")?;
        self.set_remote_threshold(session_id, threshold);
        Ok(())
    }
}
