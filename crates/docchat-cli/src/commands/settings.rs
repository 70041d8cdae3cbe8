use anyhow::Result;
use clap::Args;
use colored::Colorize;
use docchat_core::session::SessionManager;
use docchat_core::state::{PreferencesUpdate, Theme, UserPreferences};

/// Preference flags; omitted flags leave the current value untouched.
#[derive(Args, Debug, Clone, Default)]
pub struct PrefsArgs {
    #[arg(long)]
    pub auto_scroll: Option<bool>,
    #[arg(long)]
    pub show_timestamps: Option<bool>,
    #[arg(long)]
    pub compact_mode: Option<bool>,
    #[arg(long)]
    pub web_search: Option<bool>,
    /// Only search the web for questions about recent events
    #[arg(long)]
    pub web_search_auto: Option<bool>,
}

impl From<PrefsArgs> for PreferencesUpdate {
    fn from(args: PrefsArgs) -> Self {
        PreferencesUpdate {
            auto_scroll: args.auto_scroll,
            show_timestamps: args.show_timestamps,
            compact_mode: args.compact_mode,
            web_search_enabled: args.web_search,
            web_search_auto: args.web_search_auto,
        }
    }
}

pub async fn threshold(manager: &SessionManager, value: Option<f64>) -> Result<()> {
    if manager.active_session_id().await.is_none() {
        anyhow::bail!("No active chat; select one first");
    }

    if let Some(value) = value {
        manager.set_threshold(value).await?;
    }
    println!("Threshold: {:.2}", manager.current_threshold().await);
    Ok(())
}

pub async fn prefs(manager: &SessionManager, args: PrefsArgs) -> Result<()> {
    let preferences = manager.update_preferences(args.into()).await;
    print_preferences(&preferences);
    Ok(())
}

fn print_preferences(preferences: &UserPreferences) {
    let rows = [
        ("auto scroll", preferences.auto_scroll),
        ("show timestamps", preferences.show_timestamps),
        ("compact mode", preferences.compact_mode),
        ("web search", preferences.web_search_enabled),
        ("web search auto", preferences.web_search_auto),
    ];
    for (name, enabled) in rows {
        let value = if enabled { "on".green() } else { "off".bright_black() };
        println!("{:<16} {}", name, value);
    }
}

pub async fn theme(manager: &SessionManager) -> Result<()> {
    let theme = match manager.toggle_theme().await {
        Theme::Light => "light",
        Theme::Dark => "dark",
    };
    println!("Theme: {}", theme);
    Ok(())
}

pub async fn sidebar(manager: &SessionManager) -> Result<()> {
    let collapsed = manager.toggle_sidebar().await;
    println!(
        "Sidebar: {}",
        if collapsed { "collapsed" } else { "expanded" }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefs_args_map_to_partial_update() {
        let update: PreferencesUpdate = PrefsArgs {
            web_search: Some(true),
            ..Default::default()
        }
        .into();
        assert_eq!(update.web_search_enabled, Some(true));
        assert_eq!(update.auto_scroll, None);
    }
}
