use crate::display::{print_alert, session_line};
use anyhow::Result;
use colored::Colorize;
use docchat_core::session::SessionManager;

pub async fn list(manager: &SessionManager) -> Result<()> {
    let state = manager.snapshot().await;

    if state.sessions.is_empty() {
        println!("{}", "No chats yet. Upload a document to start.".bright_black());
        return Ok(());
    }

    let active = state.active_session_id.as_deref();
    for session in &state.sessions {
        println!("{}", session_line(session, active == Some(session.id.as_str())));
    }
    if active.is_none() && state.has_content_sessions() {
        println!("{}", "Select a chat to continue it.".bright_black());
    }
    Ok(())
}

pub async fn create(manager: &SessionManager) -> Result<()> {
    let id = manager.create_session().await?;
    println!("{}", format!("Started new chat {}", id).green());
    Ok(())
}

pub async fn select(manager: &SessionManager, id: &str) -> Result<()> {
    manager.select_session(id).await?;
    println!("{}", format!("Active chat: {}", id).green());
    crate::commands::conversation::show(manager).await
}

pub async fn delete(manager: &SessionManager, id: &str) -> Result<()> {
    let result = manager.delete_session(id).await;
    print_alert(&manager.snapshot().await);
    manager.dismiss_alert().await;
    result?;
    println!("{}", format!("Deleted chat {}", id).green());
    Ok(())
}

pub async fn clear(manager: &SessionManager) -> Result<()> {
    let result = manager.clear_all().await;
    print_alert(&manager.snapshot().await);
    manager.dismiss_alert().await;
    result?;
    println!("{}", "All chats deleted".green());
    Ok(())
}
