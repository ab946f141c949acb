//! CLI command implementations.
//!
//! Each `run_*` function drives a [`DashboardSession`] and prints to stdout.
//! Logs go to stderr through `tracing`, so stdout stays parseable.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::models::{ChatRole, Document, UploadFile};
use crate::query::SubmitOutcome;
use crate::registry::RefreshOutcome;
use crate::session::DashboardSession;
use crate::status::{badge, color_enabled};
use crate::upload::UploadOutcome;

/// `ragdesk documents`: one refresh, then print the list.
pub async fn run_documents(config: Config) -> Result<()> {
    let session = DashboardSession::connect(config)?;
    if session.refresh().await == RefreshOutcome::Failed {
        anyhow::bail!(
            "Could not reach the backend at {}",
            session.config().backend.base_url
        );
    }
    print!(
        "{}",
        format_document_list(&session.registry().documents(), None, color_enabled())
    );
    Ok(())
}

/// `ragdesk upload <path>`: upload one file, then print the refreshed list.
pub async fn run_upload(config: Config, path: &Path) -> Result<()> {
    let session = DashboardSession::connect(config)?;
    let file = UploadFile::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    upload_and_report(&session, &file).await?;
    print!(
        "{}",
        format_document_list(&session.registry().documents(), None, color_enabled())
    );
    Ok(())
}

/// `ragdesk ask <question>`: one exchange; prints the assistant turn.
pub async fn run_ask(config: Config, question: &str) -> Result<()> {
    let session = DashboardSession::connect(config)?;
    let outcome = session.queries().ask(question).await;
    if outcome == SubmitOutcome::Empty {
        anyhow::bail!("question must not be empty");
    }
    if let Some(turn) = session.queries().last_turn() {
        println!("{}", turn.text);
    }
    if outcome == SubmitOutcome::Failed {
        anyhow::bail!("search request failed");
    }
    Ok(())
}

/// `ragdesk watch`: poll and print the list whenever it changes, until Ctrl-C.
pub async fn run_watch(config: Config) -> Result<()> {
    let mut session = DashboardSession::connect(config)?;
    let mut generations = session.registry().subscribe();
    session.start();

    let color = color_enabled();
    let mut last_printed: Option<Vec<Document>> = None;
    loop {
        tokio::select! {
            changed = generations.changed() => {
                if changed.is_err() {
                    break;
                }
                let docs = session.registry().documents();
                if last_printed.as_ref() != Some(&docs) {
                    println!("--- {} ---", chrono::Local::now().format("%H:%M:%S"));
                    print!("{}", format_document_list(&docs, None, color));
                    last_printed = Some(docs);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    session.shutdown();
    Ok(())
}

/// `ragdesk chat`: interactive session with background polling.
pub async fn run_chat(config: Config) -> Result<()> {
    let mut session = DashboardSession::connect(config)?;
    session.start();
    let color = color_enabled();

    if let Some(greeting) = session.queries().last_turn() {
        println!("assistant> {}", greeting.text);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_chat_line(&line) {
            ChatCommand::Quit => break,
            ChatCommand::Nothing => {}
            ChatCommand::Docs => {
                let selected = session.selected_document().map(|d| d.id);
                print!(
                    "{}",
                    format_document_list(
                        &session.registry().documents(),
                        selected.as_deref(),
                        color
                    )
                );
                if !session.registry().is_online() {
                    println!("(backend offline; showing last known list)");
                }
            }
            ChatCommand::Select(id) => {
                session.selection().select(id.clone());
                match session.selected_document() {
                    Some(doc) => println!("{}", format_document_details(&doc, color)),
                    None => println!("No document with id {} in the current list.", id),
                }
            }
            ChatCommand::Clear => {
                session.selection().clear();
                println!("Selection cleared.");
            }
            ChatCommand::Upload(path) => {
                let file = match UploadFile::from_path(Path::new(&path)).await {
                    Ok(file) => file,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                if let Err(e) = upload_and_report(&session, &file).await {
                    println!("{}", e);
                }
            }
            ChatCommand::Ask(text) => {
                println!("Thinking...");
                if session.queries().ask(text).await == SubmitOutcome::Busy {
                    println!("A question is already being answered.");
                    continue;
                }
                if let Some(turn) = session.queries().last_turn() {
                    if turn.role == ChatRole::Assistant {
                        println!("assistant> {}", turn.text);
                    }
                }
            }
        }
    }

    session.shutdown();
    Ok(())
}

async fn upload_and_report(session: &DashboardSession, file: &UploadFile) -> Result<()> {
    match session.uploads().upload(Some(file)).await {
        Ok(UploadOutcome::Uploaded { receipt, .. }) => {
            let name = receipt.filename.as_deref().unwrap_or(&file.file_name);
            match receipt.doc_id {
                Some(id) => println!("Uploaded {} (id {}).", name, id),
                None => println!("Uploaded {}.", name),
            }
            Ok(())
        }
        Ok(UploadOutcome::Busy) => {
            println!("An upload is already in progress.");
            Ok(())
        }
        Ok(UploadOutcome::NoFile) => Ok(()),
        Err(e) => Err(anyhow::Error::new(e).context(crate::upload::UPLOAD_FAILED_NOTICE)),
    }
}

/// One line of input in `ragdesk chat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Ask(String),
    Docs,
    Select(String),
    Clear,
    Upload(String),
    Quit,
    Nothing,
}

pub fn parse_chat_line(line: &str) -> ChatCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ChatCommand::Nothing;
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return ChatCommand::Ask(line.to_string());
    };

    let (cmd, arg) = match rest.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (rest, ""),
    };
    match (cmd, arg) {
        ("quit" | "exit" | "q", _) => ChatCommand::Quit,
        ("docs" | "documents", _) => ChatCommand::Docs,
        ("clear", _) => ChatCommand::Clear,
        ("select", id) if !id.is_empty() => ChatCommand::Select(id.to_string()),
        ("upload", path) if !path.is_empty() => ChatCommand::Upload(path.to_string()),
        // Anything else is a question that happens to start with '/'.
        _ => ChatCommand::Ask(line.to_string()),
    }
}

/// One line per document: marker, id, badge, name, date.
pub fn format_document_list(docs: &[Document], selected: Option<&str>, color: bool) -> String {
    if docs.is_empty() {
        return "No documents.\n".to_string();
    }
    let mut out = String::new();
    for doc in docs {
        let marker = if selected == Some(doc.id.as_str()) { '*' } else { ' ' };
        out.push_str(&format!(
            "{} {:>4}  {}  {}  {}\n",
            marker,
            doc.id,
            badge(&doc.status, color),
            doc.name,
            doc.date
        ));
    }
    out
}

pub fn format_document_details(doc: &Document, color: bool) -> String {
    format!(
        "--- {} ---\nid:          {}\nstatus:      {}\nupload date: {}",
        doc.name,
        doc.id,
        badge(&doc.status, color),
        doc.date
    )
}
