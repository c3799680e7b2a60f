//! CLI entrypoint for roundtable
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::Result;
use clap::Parser;
use roundtable_application::{SessionStore, TranscriptExporter};
use roundtable_infrastructure::{
    ConfigLoader, JsonSessionStore, MarkdownTranscript, build_registry,
};
use roundtable_presentation::{Cli, DiscussionRepl};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load configuration
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    // === Dependency Injection ===
    let registry = Arc::new(build_registry(&config)?);
    let store: Arc<dyn SessionStore> = Arc::new(JsonSessionStore::new(&config.storage.data_dir));
    let transcript: Arc<dyn TranscriptExporter> =
        Arc::new(MarkdownTranscript::new(&config.storage.data_dir));

    // One-shot session management modes
    if cli.list {
        let sessions = store.list().await?;
        if sessions.is_empty() {
            println!("No sessions yet.");
        } else {
            for session in sessions {
                println!(
                    "{}  {}  round {}  {}",
                    session.id,
                    session.created_at.format("%Y-%m-%d %H:%M"),
                    session.current_round,
                    session.title,
                );
            }
        }
        return Ok(());
    }

    if let Some(id) = &cli.export {
        let content = transcript.read(id).await?;
        if content.is_empty() {
            println!("No transcript for session {id}.");
        } else {
            println!("{content}");
        }
        return Ok(());
    }

    if let Some(id) = &cli.delete {
        store.delete(id).await?;
        transcript.remove(id).await?;
        println!("Deleted session {id}.");
        return Ok(());
    }

    // Resume or create the session
    let session = match &cli.session {
        Some(id) => store.get(id).await?,
        None => {
            let title = cli.title.clone().unwrap_or_else(|| "新讨论".to_string());
            let session = store.create(&title).await?;
            transcript.create(&session).await?;
            session
        }
    };
    info!(id = %session.id, round = session.current_round, "session ready");

    let mut repl = DiscussionRepl::new(
        registry,
        store,
        transcript,
        session,
        config.discussion.recent_rounds,
    );
    repl.run().await?;

    Ok(())
}
