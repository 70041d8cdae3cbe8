use super::merge::merge_sessions;
use super::message::Message;
use super::model::Session;
use super::reconcile::reconcile;
use crate::cache::LocalCache;
use crate::error::{DocChatError, Result};
use crate::identity::normalize_session_id;
use crate::remote::{ChatApi, Document, QueryRequest, UploadFile};
use crate::state::{
    ChatState, DEFAULT_THRESHOLD, PreferencesUpdate, Theme, UserPreferences, View, clamp_threshold,
};
use crate::web_search::{KeywordWebSearchStrategy, WebSearchStrategy};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Text shown in place of an answer when the question could not be answered.
pub const ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";
/// Alert raised when a session cannot be deleted remotely.
pub const DELETE_FAILED_ALERT: &str = "Failed to delete chat. Please try again.";
/// Alert raised when the bulk delete fails remotely.
pub const CLEAR_FAILED_ALERT: &str = "Failed to clear all chats. Please try again.";

/// Owns the active session pointer and keeps cache, remote and UI state consistent.
///
/// `SessionManager` is responsible for:
/// - Restoring cached state on startup and reconciling it with the remote
/// - Selecting, creating and deleting sessions
/// - Loading and reconciling the active session's messages
/// - Per-session thresholds, preferences, theme and sidebar state
/// - Persisting the state container after every observable change
///
/// All mutation goes through these methods. Locks are never held across a
/// remote call, and every response is applied only if it still belongs to
/// the active session.
pub struct SessionManager {
    /// The single state container observed by the UI
    state: Arc<RwLock<ChatState>>,
    /// Session/document backend
    api: Arc<dyn ChatApi>,
    /// Local persistent cache
    cache: LocalCache,
    /// Decides the web search flag of each question
    web_search: Arc<dyn WebSearchStrategy>,
}

impl SessionManager {
    /// Creates a new `SessionManager` with default state.
    ///
    /// Call [`SessionManager::initialize`] to restore cached state and fetch
    /// the session list.
    pub fn new(api: Arc<dyn ChatApi>, cache: LocalCache) -> Self {
        Self {
            state: Arc::new(RwLock::new(ChatState::new())),
            api,
            cache,
            web_search: Arc::new(KeywordWebSearchStrategy::default()),
        }
    }

    /// Replaces the web search strategy.
    pub fn with_web_search_strategy(mut self, strategy: Arc<dyn WebSearchStrategy>) -> Self {
        self.web_search = strategy;
        self
    }

    // ============================================================================
    // Read-only views
    // ============================================================================

    /// Returns a copy of the whole state container.
    pub async fn snapshot(&self) -> ChatState {
        self.state.read().await.clone()
    }

    /// Returns the ID of the currently active session.
    pub async fn active_session_id(&self) -> Option<String> {
        self.state.read().await.active_session_id.clone()
    }

    /// Returns the messages of the active session.
    pub async fn messages(&self) -> Vec<Message> {
        self.state.read().await.messages.clone()
    }

    /// Returns the screen to display.
    pub async fn view(&self) -> View {
        self.state.read().await.view()
    }

    /// Threshold of the active session, or the default.
    pub async fn current_threshold(&self) -> f64 {
        let state = self.state.read().await;
        state
            .active_session_id
            .as_deref()
            .map(|id| state.threshold_for(id))
            .unwrap_or(DEFAULT_THRESHOLD)
    }

    // ============================================================================
    // Startup and session list
    // ============================================================================

    /// Restores cached state, refreshes the session list and reloads the active session.
    ///
    /// The cached active pointer is validated first; the pointer is dropped if
    /// the refreshed list does not contain it. A restored session with content
    /// opens the chat screen even if the cached upload flag was lost.
    pub async fn initialize(&self) {
        let snapshot = self.cache.load_snapshot();
        {
            let mut state = self.state.write().await;
            snapshot.apply_to(&mut state);
            if let Some(session_id) = state.active_session_id.clone() {
                state.messages = self.cache.read_messages(&session_id).unwrap_or_default();
            }
        }

        self.refresh_sessions().await;

        {
            let mut state = self.state.write().await;
            let has_content = state.active_session().map(|s| !s.is_placeholder());
            if let Some(has_content) = has_content {
                state.is_uploaded = state.is_uploaded || has_content;
            }
        }

        if let Some(session_id) = self.active_session_id().await {
            tracing::info!("[SessionManager] Restoring active session: {}", session_id);
            self.load_session_data(&session_id).await;
        }

        self.persist().await;
    }

    /// Fetches the remote session list and merges it with the cached list.
    ///
    /// On remote failure the current list is kept. After a successful refresh
    /// an active pointer that no longer resolves is cleared.
    pub async fn refresh_sessions(&self) {
        self.refresh_sessions_keeping(None).await;
    }

    /// Refreshes the list; `keep` stays listed as a placeholder if the remote
    /// list does not contain it yet.
    async fn refresh_sessions_keeping(&self, keep: Option<&str>) {
        let remote = match self.api.list_sessions().await {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::error!("[SessionManager] Error loading chats: {}", e);
                return;
            }
        };

        let cached = self.cache.cached_sessions();
        let mut merged = merge_sessions(&remote, &cached);
        if let Some(id) = keep
            && !merged.iter().any(|s| s.id == id)
        {
            tracing::debug!("[SessionManager] Remote list lags behind new session {}", id);
            merged.insert(0, Session::placeholder(id));
        }

        {
            let mut state = self.state.write().await;
            state.sessions = merged;
            tracing::debug!(
                "[SessionManager] Session list refreshed: {} session(s), content: {}",
                state.sessions.len(),
                state.has_content_sessions()
            );
            clear_dangling_pointer(&mut state);
        }

        self.persist().await;
    }

    // ============================================================================
    // Transitions
    // ============================================================================

    /// Makes `session_id` the active session.
    ///
    /// The id must pass identity validation and be a member of the merged list.
    /// A session unknown to the current list triggers one refresh before being
    /// rejected, which tolerates sessions created moments ago. Cached messages
    /// are shown immediately, then replaced by the remote history if it has
    /// any records.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the id is a sentinel or blank
    /// - `NotFound` if the session is not listed even after a refresh
    pub async fn select_session(&self, session_id: &str) -> Result<()> {
        let session_id = normalize_session_id(session_id).ok_or_else(|| {
            DocChatError::invalid_input(format!("Invalid session id: {session_id:?}"))
        })?;

        if !self.is_listed(&session_id).await {
            self.refresh_sessions().await;
            if !self.is_listed(&session_id).await {
                tracing::warn!("[SessionManager] Cannot select unknown session: {}", session_id);
                return Err(DocChatError::not_found("session", session_id));
            }
        }

        let cached = self.cache.read_messages(&session_id).unwrap_or_default();
        {
            let mut state = self.state.write().await;
            state.active_session_id = Some(session_id.clone());
            state.messages = cached;
            state.is_uploaded = state
                .active_session()
                .map(|session| !session.is_placeholder())
                .unwrap_or(false);
        }
        tracing::info!("[SessionManager] Selected session: {}", session_id);

        self.persist().await;
        self.load_session_data(&session_id).await;
        Ok(())
    }

    /// Creates a new remote session and makes it active with no messages.
    ///
    /// Returns the new session id. The new session is a placeholder until its
    /// first exchange lands, so the upload screen is shown. It stays listed
    /// even if the backend's list does not report it yet.
    pub async fn create_session(&self) -> Result<String> {
        let raw_id = self.api.create_session().await.inspect_err(|e| {
            tracing::error!("[SessionManager] Error creating new chat: {}", e);
        })?;

        let session_id = normalize_session_id(&raw_id).ok_or_else(|| {
            DocChatError::internal(format!("Backend returned an unusable chat id: {raw_id:?}"))
        })?;

        {
            let mut state = self.state.write().await;
            state.active_session_id = Some(session_id.clone());
            state.messages.clear();
            state.is_uploaded = false;
        }
        tracing::info!("[SessionManager] Created session: {}", session_id);

        self.persist().await;
        self.refresh_sessions_keeping(Some(&session_id)).await;
        self.load_session_data(&session_id).await;

        Ok(session_id)
    }

    /// Deletes a session remotely, then purges it locally.
    ///
    /// Nothing local changes unless the remote deletion succeeds. On success
    /// the session's cached messages and threshold are purged and, if it was
    /// active, the pointer is cleared.
    ///
    /// # Errors
    ///
    /// Returns the remote error after raising an alert on the state.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        if let Err(e) = self.api.delete_session(session_id).await {
            tracing::error!("[SessionManager] Error deleting chat {}: {}", session_id, e);
            self.state.write().await.alert = Some(DELETE_FAILED_ALERT.to_string());
            return Err(e);
        }

        self.cache.remove_messages(session_id);
        {
            let mut state = self.state.write().await;
            state.sessions.retain(|s| s.id != session_id);
            state.thresholds.remove(session_id);
            if state.active_session_id.as_deref() == Some(session_id) {
                state.active_session_id = None;
                state.messages.clear();
                state.is_uploaded = false;
            }
        }
        tracing::info!("[SessionManager] Deleted session: {}", session_id);

        self.persist().await;
        self.refresh_sessions().await;
        Ok(())
    }

    /// Deletes every session remotely, then resets all local state to defaults.
    ///
    /// # Errors
    ///
    /// Returns the remote error after raising an alert; local state is untouched.
    pub async fn clear_all(&self) -> Result<()> {
        if let Err(e) = self.api.delete_all_sessions().await {
            tracing::error!("[SessionManager] Error clearing all chats: {}", e);
            self.state.write().await.alert = Some(CLEAR_FAILED_ALERT.to_string());
            return Err(e);
        }

        self.cache.clear_all();
        *self.state.write().await = ChatState::new();
        tracing::info!("[SessionManager] All chats deleted from server and local cache cleared");
        Ok(())
    }

    // ============================================================================
    // Conversation
    // ============================================================================

    /// Sends a question for the active session.
    ///
    /// The user message is inserted optimistically. The reply is the answer,
    /// or an error message if the query failed. Returns `None` when the
    /// question is blank, no session is active, or the active session changed
    /// while waiting for the answer (the reply is then discarded).
    pub async fn ask(&self, question: &str) -> Option<Message> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }

        let millis = chrono::Utc::now().timestamp_millis();
        let (session_id, threshold, preferences) = {
            let mut state = self.state.write().await;
            let session_id = state.active_session_id.clone()?;
            let threshold = state.threshold_for(&session_id);
            state.messages.push(Message::user(
                format!("{millis}_user"),
                question,
                chrono::Utc::now().to_rfc3339(),
            ));
            (session_id, threshold, state.preferences)
        };
        self.persist().await;

        let request = QueryRequest {
            question: question.to_string(),
            chat_id: Some(session_id.clone()),
            threshold,
            use_web_search: self.web_search.should_use_web_search(question, &preferences),
        };

        let (reply, answered) = match self.api.query(&request).await {
            Ok(response) => (
                Message::assistant(
                    format!("{millis}_assistant"),
                    response.answer.clone(),
                    chrono::Utc::now().to_rfc3339(),
                    Some(response.metadata()),
                ),
                true,
            ),
            Err(e) => {
                tracing::error!("[SessionManager] Error sending message: {}", e);
                (
                    Message::assistant(
                        format!("{millis}_error"),
                        ERROR_REPLY,
                        chrono::Utc::now().to_rfc3339(),
                        None,
                    ),
                    false,
                )
            }
        };

        {
            let mut state = self.state.write().await;
            if state.active_session_id.as_deref() != Some(session_id.as_str()) {
                tracing::debug!(
                    "[SessionManager] Discarding reply for inactive session {}",
                    session_id
                );
                return None;
            }
            state.messages.push(reply.clone());
            if answered {
                state.is_uploaded = true;
            }
        }

        self.persist().await;
        Some(reply)
    }

    /// Uploads a document into the active session, creating one if needed.
    ///
    /// Returns the id of the session the document was attached to.
    pub async fn upload_document(&self, file: UploadFile) -> Result<String> {
        let session_id = match self.active_session_id().await {
            Some(id) => id,
            None => self.create_session().await?,
        };

        let file_name = file.file_name.clone();
        self.api
            .upload_document(file, Some(&session_id))
            .await
            .inspect_err(|e| tracing::error!("[SessionManager] Upload failed: {}", e))?;

        {
            let mut state = self.state.write().await;
            if state.active_session_id.as_deref() == Some(session_id.as_str()) {
                state.is_uploaded = true;
            }
        }
        tracing::info!(
            "[SessionManager] Uploaded '{}' into session {}",
            file_name,
            session_id
        );

        self.persist().await;
        Ok(session_id)
    }

    /// Fetches the documents of every listed session.
    ///
    /// A failed fetch yields an empty list for that session.
    pub async fn session_documents(&self) -> HashMap<String, Vec<Document>> {
        let ids: Vec<String> = {
            let state = self.state.read().await;
            state.sessions.iter().map(|s| s.id.clone()).collect()
        };

        let mut documents = HashMap::with_capacity(ids.len());
        for id in ids {
            let docs = match self.api.get_documents(&id).await {
                Ok(docs) => docs,
                Err(e) => {
                    tracing::warn!("[SessionManager] Could not load documents for {}: {}", id, e);
                    Vec::new()
                }
            };
            documents.insert(id, docs);
        }
        documents
    }

    // ============================================================================
    // Settings
    // ============================================================================

    /// Updates the active session's threshold, remote first.
    ///
    /// Does nothing when no session is active. The value is clamped to `[0, 1]`.
    pub async fn set_threshold(&self, threshold: f64) -> Result<()> {
        let Some(session_id) = self.active_session_id().await else {
            return Ok(());
        };
        let threshold = clamp_threshold(threshold);

        self.api
            .set_threshold(&session_id, threshold)
            .await
            .inspect_err(|e| tracing::error!("[SessionManager] Error updating threshold: {}", e))?;

        self.state
            .write()
            .await
            .thresholds
            .insert(session_id.clone(), threshold);
        tracing::info!(
            "[SessionManager] Threshold updated to {} for chat {}",
            threshold,
            session_id
        );

        self.persist().await;
        Ok(())
    }

    /// Merges a partial preferences update and returns the result.
    pub async fn update_preferences(&self, update: PreferencesUpdate) -> UserPreferences {
        let preferences = {
            let mut state = self.state.write().await;
            state.preferences = state.preferences.merged(update);
            state.preferences
        };
        self.persist().await;
        preferences
    }

    /// Switches between light and dark theme and returns the new one.
    pub async fn toggle_theme(&self) -> Theme {
        let theme = {
            let mut state = self.state.write().await;
            state.theme = state.theme.toggled();
            state.theme
        };
        self.persist().await;
        theme
    }

    /// Flips the collapsed sidebar flag and returns whether it is now collapsed.
    pub async fn toggle_sidebar(&self) -> bool {
        let collapsed = {
            let mut state = self.state.write().await;
            state.sidebar_collapsed = !state.sidebar_collapsed;
            state.sidebar_collapsed
        };
        self.persist().await;
        collapsed
    }

    /// Clears the pending alert. Alerts are not persisted.
    pub async fn dismiss_alert(&self) {
        self.state.write().await.alert = None;
    }

    // ============================================================================
    // Internals
    // ============================================================================

    async fn is_listed(&self, session_id: &str) -> bool {
        self.state.read().await.find_session(session_id).is_some()
    }

    /// Loads remote history and threshold for a session.
    async fn load_session_data(&self, session_id: &str) {
        self.load_messages(session_id).await;
        self.load_threshold(session_id).await;
    }

    async fn load_messages(&self, session_id: &str) {
        let records = match self.api.get_messages(session_id).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    "[SessionManager] Error loading chat messages for {}, keeping cache: {}",
                    session_id,
                    e
                );
                return;
            }
        };

        {
            let mut state = self.state.write().await;
            if state.active_session_id.as_deref() != Some(session_id) {
                tracing::debug!(
                    "[SessionManager] Discarding stale history for {}",
                    session_id
                );
                return;
            }
            state.messages = reconcile(&state.messages, &records);
        }

        self.persist().await;
    }

    async fn load_threshold(&self, session_id: &str) {
        let threshold = match self.api.get_threshold(session_id).await {
            Ok(value) => clamp_threshold(value),
            Err(e) => {
                tracing::warn!(
                    "[SessionManager] Error loading chat threshold for {}: {}",
                    session_id,
                    e
                );
                DEFAULT_THRESHOLD
            }
        };

        {
            let mut state = self.state.write().await;
            let still_known = state.find_session(session_id).is_some()
                || state.active_session_id.as_deref() == Some(session_id);
            if !still_known {
                return;
            }
            state.thresholds.insert(session_id.to_string(), threshold);
        }

        self.persist().await;
    }

    /// Writes the state container to the cache.
    async fn persist(&self) {
        let state = self.state.read().await;
        self.cache.save_snapshot(&state);
    }
}

/// Clears an active pointer that is invalid or not in the session list.
fn clear_dangling_pointer(state: &mut ChatState) {
    let Some(active) = state.active_session_id.clone() else {
        return;
    };

    let valid = normalize_session_id(&active).is_some() && state.find_session(&active).is_some();
    if !valid {
        tracing::info!(
            "[SessionManager] Active session '{}' is no longer listed; clearing",
            active
        );
        state.active_session_id = None;
        state.messages.clear();
        state.is_uploaded = false;
    }
}
