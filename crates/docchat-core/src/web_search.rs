//! Decides whether a question should be answered with web search augmentation.

use crate::state::UserPreferences;

/// Words suggesting a question needs fresh information.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "latest", "current", "recent", "today", "now", "update", "news", "2024", "2025",
];

/// Strategy deciding the `use_web_search` flag of a query.
pub trait WebSearchStrategy: Send + Sync {
    fn should_use_web_search(&self, question: &str, preferences: &UserPreferences) -> bool;
}

/// Keyword-based strategy.
///
/// Web search is off unless enabled in the preferences. With auto mode on,
/// it is used only for questions containing one of the keywords
/// (case-insensitive substring match); with auto mode off, every question
/// uses it.
#[derive(Debug, Clone)]
pub struct KeywordWebSearchStrategy {
    keywords: Vec<String>,
}

impl KeywordWebSearchStrategy {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }

    fn mentions_fresh_information(&self, question: &str) -> bool {
        let question = question.to_lowercase();
        self.keywords.iter().any(|k| question.contains(k.as_str()))
    }
}

impl Default for KeywordWebSearchStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().copied())
    }
}

impl WebSearchStrategy for KeywordWebSearchStrategy {
    fn should_use_web_search(&self, question: &str, preferences: &UserPreferences) -> bool {
        if !preferences.web_search_enabled {
            return false;
        }
        if preferences.web_search_auto {
            return self.mentions_fresh_information(question);
        }
        true
    }
}
