//! # ragdesk CLI
//!
//! Terminal client for the report ingestion and RAG search backend.
//!
//! ## Usage
//!
//! ```bash
//! ragdesk --config ./config/ragdesk.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ragdesk documents` | Fetch and print the document list with statuses |
//! | `ragdesk upload <path>` | Upload a report, then print the refreshed list |
//! | `ragdesk ask "<question>"` | Ask one question and print the answer with sources |
//! | `ragdesk watch` | Poll the document list and print it whenever it changes |
//! | `ragdesk chat` | Interactive chat with background polling |
//!
//! Set `RAGDESK_LOG=debug` to see request logs on stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use ragdesk::commands;
use ragdesk::config::{self, Config};

const DEFAULT_CONFIG_PATH: &str = "./config/ragdesk.toml";

/// ragdesk — dashboard client for a document ingestion and RAG search backend.
///
/// Configuration is read from `--config`, or from `./config/ragdesk.toml`
/// when that file exists. Without either, built-in defaults apply.
#[derive(Parser)]
#[command(
    name = "ragdesk",
    about = "ragdesk — dashboard client for a document ingestion and RAG search backend",
    version,
    long_about = "ragdesk keeps a live view of the documents ingested by the backend, uploads \
    new reports, and answers questions grounded in them through the backend's search endpoint."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override `[backend].base_url` from the config file.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List documents and their processing status.
    Documents,

    /// Upload a report file for ingestion.
    ///
    /// The file is sent as a multipart form. On success the document list
    /// is refreshed immediately and printed.
    Upload {
        /// Path to the file to upload.
        path: PathBuf,
    },

    /// Ask a single question.
    ///
    /// Prints the answer followed by the cited sources and their similarity.
    Ask {
        /// The question text.
        question: String,
    },

    /// Poll the document list and print it whenever it changes.
    ///
    /// Runs until interrupted with Ctrl-C.
    Watch,

    /// Start an interactive chat session.
    ///
    /// Plain lines are questions. Commands: `/docs`, `/select <id>`,
    /// `/clear`, `/upload <path>`, `/quit`.
    Chat,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("RAGDESK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_config(path: Option<&Path>, base_url: Option<String>) -> Result<Config> {
    let mut cfg = match path {
        Some(path) => config::load_config(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            config::load_config(Path::new(DEFAULT_CONFIG_PATH))?
        }
        None => Config::minimal(),
    };
    if let Some(url) = base_url {
        cfg.backend.base_url = url;
        cfg.validate()?;
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = resolve_config(cli.config.as_deref(), cli.base_url)?;

    match cli.command {
        Commands::Documents => commands::run_documents(cfg).await?,
        Commands::Upload { path } => commands::run_upload(cfg, &path).await?,
        Commands::Ask { question } => commands::run_ask(cfg, &question).await?,
        Commands::Watch => commands::run_watch(cfg).await?,
        Commands::Chat => commands::run_chat(cfg).await?,
    }

    Ok(())
}
