//! Client state domain models.
//!
//! `ChatState` is the single state container the UI observes. It is only
//! mutated through the transitions of [`crate::session::SessionManager`];
//! everything else reads derived views from it.

use crate::session::{Message, Session, has_content_sessions};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Similarity threshold used when a chat has no stored setting.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Clamps a threshold into the valid `[0, 1]` range.
pub fn clamp_threshold(value: f64) -> f64 {
    if value.is_nan() {
        return DEFAULT_THRESHOLD;
    }
    value.clamp(0.0, 1.0)
}

/// Color theme of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Returns the other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Which main screen is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Document upload screen.
    Upload,
    /// Chat window for the active session.
    Chat,
}

/// Process-wide display and answering preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub auto_scroll: bool,
    pub show_timestamps: bool,
    pub compact_mode: bool,
    pub web_search_enabled: bool,
    /// Let the keyword strategy decide when web search is used
    pub web_search_auto: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            auto_scroll: true,
            show_timestamps: true,
            compact_mode: false,
            web_search_enabled: false,
            web_search_auto: true,
        }
    }
}

/// Partial update of [`UserPreferences`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreferencesUpdate {
    pub auto_scroll: Option<bool>,
    pub show_timestamps: Option<bool>,
    pub compact_mode: Option<bool>,
    pub web_search_enabled: Option<bool>,
    pub web_search_auto: Option<bool>,
}

impl UserPreferences {
    /// Returns a copy with every field set in `update` replaced.
    pub fn merged(self, update: PreferencesUpdate) -> Self {
        Self {
            auto_scroll: update.auto_scroll.unwrap_or(self.auto_scroll),
            show_timestamps: update.show_timestamps.unwrap_or(self.show_timestamps),
            compact_mode: update.compact_mode.unwrap_or(self.compact_mode),
            web_search_enabled: update.web_search_enabled.unwrap_or(self.web_search_enabled),
            web_search_auto: update.web_search_auto.unwrap_or(self.web_search_auto),
        }
    }
}

/// Complete client state.
///
/// # Fields
///
/// * `sessions` - Merged session list (remote first, then cache-only entries).
/// * `active_session_id` - Active pointer; always absent or a member of `sessions`
///   once a list refresh has completed.
/// * `messages` - Messages of the active session.
/// * `thresholds` - Per-session similarity thresholds, created lazily.
/// * `is_uploaded` - Whether the active session has document content to chat about.
/// * `alert` - Dismissable message for a failed destructive action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    pub sessions: Vec<Session>,
    pub active_session_id: Option<String>,
    pub messages: Vec<Message>,
    pub thresholds: HashMap<String, f64>,
    pub preferences: UserPreferences,
    pub theme: Theme,
    pub sidebar_collapsed: bool,
    pub is_uploaded: bool,
    pub alert: Option<String>,
}

impl ChatState {
    /// Creates a state with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active session summary, if the pointer resolves.
    pub fn active_session(&self) -> Option<&Session> {
        let id = self.active_session_id.as_deref()?;
        self.find_session(id)
    }

    /// Looks up a session in the merged list.
    pub fn find_session(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    /// Threshold for a session, falling back to the default.
    pub fn threshold_for(&self, session_id: &str) -> f64 {
        self.thresholds
            .get(session_id)
            .copied()
            .unwrap_or(DEFAULT_THRESHOLD)
    }

    /// True if any listed session holds a real exchange.
    pub fn has_content_sessions(&self) -> bool {
        has_content_sessions(&self.sessions)
    }

    /// The screen to display.
    pub fn view(&self) -> View {
        match self.active_session_id {
            Some(_) if self.is_uploaded => View::Chat,
            _ => View::Upload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preferences() {
        let prefs = UserPreferences::default();
        assert!(prefs.auto_scroll);
        assert!(prefs.show_timestamps);
        assert!(!prefs.compact_mode);
        assert!(!prefs.web_search_enabled);
        assert!(prefs.web_search_auto);
    }

    #[test]
    fn test_preferences_partial_update() {
        let prefs = UserPreferences::default().merged(PreferencesUpdate {
            web_search_enabled: Some(true),
            compact_mode: Some(true),
            ..Default::default()
        });
        assert!(prefs.web_search_enabled);
        assert!(prefs.compact_mode);
        assert!(prefs.auto_scroll);
    }

    #[test]
    fn test_preferences_tolerate_partial_blob() {
        let prefs: UserPreferences = serde_json::from_str(r#"{"compactMode": true}"#).unwrap();
        assert!(prefs.compact_mode);
        assert!(prefs.web_search_auto);
    }

    #[test]
    fn test_clamp_threshold() {
        assert_eq!(clamp_threshold(1.7), 1.0);
        assert_eq!(clamp_threshold(-0.2), 0.0);
        assert_eq!(clamp_threshold(0.3), 0.3);
        assert_eq!(clamp_threshold(f64::NAN), DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_view_requires_active_session() {
        let mut state = ChatState::new();
        state.is_uploaded = true;
        assert_eq!(state.view(), View::Upload);

        state.active_session_id = Some("a".to_string());
        assert_eq!(state.view(), View::Chat);

        state.is_uploaded = false;
        assert_eq!(state.view(), View::Upload);
    }

    #[test]
    fn test_theme_toggle_and_wire_format() {
        assert_eq!(Theme::default().toggled(), Theme::Dark);
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
    }

    #[test]
    fn test_threshold_for_defaults() {
        let mut state = ChatState::new();
        assert_eq!(state.threshold_for("x"), DEFAULT_THRESHOLD);
        state.thresholds.insert("x".to_string(), 0.8);
        assert_eq!(state.threshold_for("x"), 0.8);
    }
}
