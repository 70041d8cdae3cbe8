use crate::display::{print_message, truncate_text};
use anyhow::{Context, Result};
use colored::Colorize;
use docchat_core::remote::UploadFile;
use docchat_core::session::SessionManager;
use docchat_core::state::View;
use docchat_interaction::guess_content_type;
use std::path::Path;

pub async fn show(manager: &SessionManager) -> Result<()> {
    let state = manager.snapshot().await;

    let Some(session) = state.active_session() else {
        println!("{}", "No active chat. Upload a document to start.".bright_black());
        return Ok(());
    };

    println!(
        "{} {}  threshold {:.2}",
        "Chat".bold(),
        session.id,
        state.threshold_for(&session.id)
    );

    if state.view() == View::Upload {
        println!(
            "{}",
            "No document yet. Use `docchat upload <path>` to add one.".bright_black()
        );
    }

    for message in &state.messages {
        print_message(message, &state.preferences);
    }
    Ok(())
}

pub async fn ask(manager: &SessionManager, question: &str) -> Result<()> {
    if manager.active_session_id().await.is_none() {
        anyhow::bail!("No active chat; run `docchat new` or `docchat upload <path>` first");
    }

    let state = manager.snapshot().await;
    match manager.ask(question).await {
        Some(reply) => print_message(&reply, &state.preferences),
        None => println!("{}", "Nothing to ask.".bright_black()),
    }
    Ok(())
}

pub async fn upload(manager: &SessionManager, path: &Path) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .context("Path has no file name")?;

    println!("{}", format!("Uploading {}...", file_name).bright_black());
    let file = UploadFile {
        content_type: guess_content_type(&file_name),
        file_name,
        bytes,
    };
    let session_id = manager.upload_document(file).await?;
    println!("{}", format!("Document ready in chat {}", session_id).green());
    Ok(())
}

pub async fn docs(manager: &SessionManager) -> Result<()> {
    let state = manager.snapshot().await;
    let documents = manager.session_documents().await;

    for session in &state.sessions {
        let title = truncate_text(&session.latest_question, 30);
        println!("{} {}", session.id.bold(), title.bright_black());
        match documents.get(&session.id) {
            Some(docs) if !docs.is_empty() => {
                for doc in docs {
                    println!(
                        "  - {} ({})",
                        doc.filename,
                        doc.content_type.as_deref().unwrap_or("unknown type")
                    );
                }
            }
            _ => println!("  {}", "no documents".bright_black()),
        }
    }
    Ok(())
}
