//! HttpChatApi - REST implementation of the document-QA backend.
//!
//! Talks to the FastAPI service that stores chats, documents and answers.
//! No retries and no timeouts are configured here; the session manager
//! decides how each failure degrades.

use async_trait::async_trait;
use docchat_core::config::ClientConfig;
use docchat_core::error::{DocChatError, Result};
use docchat_core::remote::{ChatApi, Document, QueryRequest, QueryResponse, UploadFile};
use docchat_core::session::{QaRecord, Session};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Returns the MIME type for a file name, or `application/octet-stream`.
pub fn guess_content_type(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// [`ChatApi`] implementation over HTTP.
#[derive(Clone)]
pub struct HttpChatApi {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CreateChatResponse {
    chat_id: String,
}

#[derive(Debug, Deserialize)]
struct ChatsResponse {
    #[serde(default)]
    chats: Vec<Session>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    messages: Vec<QaRecord>,
}

#[derive(Debug, Deserialize)]
struct DocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ThresholdBody {
    threshold: Option<f64>,
}

#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    question: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    chat_id: Option<&'a str>,
}

impl HttpChatApi {
    /// Creates a client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL of a per-chat resource; the id is encoded as one path segment.
    fn chat_url(&self, session_id: &str, suffix: &str) -> String {
        self.url(&format!(
            "/chats/{}{}",
            urlencoding::encode(session_id),
            suffix
        ))
    }

    /// Sends a request and fails on transport errors or non-2xx statuses.
    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            DocChatError::remote(operation, None, format!("Request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!(
                "[HttpChatApi] {} returned {}: {}",
                operation,
                status,
                error_text
            );
            return Err(DocChatError::remote(
                operation,
                Some(status.as_u16()),
                format!("HTTP {}: {}", status, error_text),
            ));
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = self.send(operation, request).await?;
        response.json::<T>().await.map_err(|e| {
            DocChatError::remote(
                operation,
                None,
                format!("Failed to parse response: {}", e),
            )
        })
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn create_session(&self) -> Result<String> {
        let body: CreateChatResponse = self
            .send_json("create_session", self.client.post(self.url("/chats/")))
            .await?;
        Ok(body.chat_id)
    }

    async fn list_sessions(&self) -> Result<Vec<Session>> {
        let body: ChatsResponse = self
            .send_json("list_sessions", self.client.get(self.url("/chats/")))
            .await?;
        Ok(body.chats)
    }

    async fn get_messages(&self, session_id: &str) -> Result<Vec<QaRecord>> {
        let url = self.chat_url(session_id, "/messages");
        let body: MessagesResponse = self.send_json("get_messages", self.client.get(url)).await?;
        Ok(body.messages)
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        let url = self.chat_url(session_id, "");
        self.send("delete_session", self.client.delete(url)).await?;
        Ok(())
    }

    async fn delete_all_sessions(&self) -> Result<()> {
        self.send(
            "delete_all_sessions",
            self.client.delete(self.url("/chats/all")),
        )
        .await?;
        Ok(())
    }

    async fn get_documents(&self, session_id: &str) -> Result<Vec<Document>> {
        let url = self.chat_url(session_id, "/documents");
        let body: DocumentsResponse = self.send_json("get_documents", self.client.get(url)).await?;
        Ok(body.documents)
    }

    async fn upload_document(&self, file: UploadFile, session_id: Option<&str>) -> Result<()> {
        let content_type = if file.content_type.is_empty() {
            guess_content_type(&file.file_name)
        } else {
            file.content_type
        };

        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&content_type)
            .map_err(|e| {
                DocChatError::invalid_input(format!("Invalid content type '{}': {}", content_type, e))
            })?;
        let form = Form::new().part("file", part);

        let mut request = self.client.post(self.url("/upload/")).multipart(form);
        if let Some(chat_id) = session_id {
            request = request.query(&[("chat_id", chat_id)]);
        }

        self.send("upload_document", request).await?;
        Ok(())
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let mut params = vec![("threshold", request.threshold.to_string())];
        if request.use_web_search {
            params.push(("use_web_search", "true".to_string()));
        }

        let body = QueryBody {
            question: &request.question,
            chat_id: request.chat_id.as_deref(),
        };

        self.send_json(
            "query",
            self.client
                .post(self.url("/query/"))
                .query(&params)
                .json(&body),
        )
        .await
    }

    async fn get_threshold(&self, session_id: &str) -> Result<f64> {
        let url = self.chat_url(session_id, "/threshold");
        let body: ThresholdBody = self.send_json("get_threshold", self.client.get(url)).await?;
        Ok(body.threshold.unwrap_or(docchat_core::state::DEFAULT_THRESHOLD))
    }

    async fn set_threshold(&self, session_id: &str, threshold: f64) -> Result<()> {
        let url = self.chat_url(session_id, "/threshold");
        let body = ThresholdBody {
            threshold: Some(threshold),
        };
        self.send("set_threshold", self.client.post(url).json(&body))
            .await?;
        Ok(())
    }
}
