//! Terminal rendering helpers.

use colored::Colorize;
use docchat_core::session::{Message, Sender, Session};
use docchat_core::state::{ChatState, UserPreferences};

/// Sidebar title length before truncation.
pub const DEFAULT_TRUNCATE: usize = 50;

/// Shortens `text` to `max` characters, appending `...` when cut.
pub fn truncate_text(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// One sidebar row.
pub fn session_line(session: &Session, active: bool) -> String {
    let title = if session.is_placeholder() {
        "New chat".to_string()
    } else {
        truncate_text(&session.latest_question, DEFAULT_TRUNCATE)
    };
    let marker = if active { "*" } else { " " };
    let line = format!(
        "{} {}  {} ({} msg)",
        marker, session.id, title, session.message_count
    );
    if active {
        line.bright_green().to_string()
    } else {
        line
    }
}

pub fn print_message(message: &Message, preferences: &UserPreferences) {
    let author = match message.sender {
        Sender::User => "You".bright_cyan(),
        Sender::Assistant => "Assistant".bright_magenta(),
    };
    if preferences.show_timestamps {
        println!("{} {}", author, message.timestamp.bright_black());
    } else {
        println!("{}", author);
    }

    for line in message.text.lines() {
        match message.sender {
            Sender::User => println!("{}", line),
            Sender::Assistant => println!("{}", line.bright_blue()),
        }
    }

    if let Some(meta) = &message.metadata
        && !preferences.compact_mode
    {
        let mut details = Vec::new();
        if let Some(distance) = meta.similarity_distance {
            details.push(format!("distance {:.3}", distance));
        }
        if let Some(threshold) = meta.threshold {
            details.push(format!("threshold {:.2}", threshold));
        }
        if meta.web_search_used == Some(true) {
            details.push("web search".to_string());
        }
        if let Some(reason) = &meta.web_search_reason {
            details.push(reason.clone());
        }
        if !details.is_empty() {
            println!("{}", format!("  [{}]", details.join(", ")).bright_black());
        }
    }

    if !preferences.compact_mode {
        println!();
    }
}

/// Prints a pending alert to stderr.
pub fn print_alert(state: &ChatState) {
    if let Some(alert) = &state.alert {
        eprintln!("{}", alert.red());
    }
}
