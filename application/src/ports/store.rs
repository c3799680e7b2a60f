//! Session persistence and transcript export ports.
//!
//! The round engine never touches these; only the composition root reads
//! a session before a round and writes it (plus the Markdown transcript)
//! after. Implementations must serialize updates per session id if rounds
//! could ever overlap — the engine assumes they never do for one session.

use async_trait::async_trait;
use roundtable_domain::{DiscussionRecord, RoundMessage, Session};
use thiserror::Error;

/// Errors from the storage adapters
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Session not found: {0}")]
    NotFound(String),
}

/// Durable key/value persistence of sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Session>, StoreError>;

    async fn create(&self, title: &str) -> Result<Session, StoreError>;

    async fn get(&self, id: &str) -> Result<Session, StoreError>;

    async fn update(&self, session: &Session) -> Result<(), StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Markdown export of raw round transcripts
#[async_trait]
pub trait TranscriptExporter: Send + Sync {
    /// Create the transcript file for a new session.
    async fn create(&self, session: &Session) -> Result<(), StoreError>;

    /// Append one completed round (verbatim messages + its summary from
    /// the updated record).
    async fn append_round(
        &self,
        session_id: &str,
        round_number: u32,
        messages: &[RoundMessage],
        record: &DiscussionRecord,
    ) -> Result<(), StoreError>;

    /// Read the full transcript back.
    async fn read(&self, session_id: &str) -> Result<String, StoreError>;

    /// Remove the transcript when its session is deleted.
    async fn remove(&self, session_id: &str) -> Result<(), StoreError>;
}
