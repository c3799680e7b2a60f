//! Model backend port
//!
//! Defines the single capability the engine needs from a hosted model:
//! given a system prompt and a message list, produce a lazy sequence of
//! text fragments. Vendor adapters live in the infrastructure layer; the
//! engine never branches on vendor identity.

use async_trait::async_trait;
use roundtable_domain::{ChatMessage, ModelId, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur invoking a model backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Backend returned no content")]
    EmptyResponse,

    #[error("Other error: {0}")]
    Other(String),
}

/// One completion request to a backend.
///
/// With `stream: false` the resulting sequence yields exactly one
/// fragment containing the full text.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system_prompt: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

/// Handle for receiving streaming events from a backend call.
///
/// Wraps an `mpsc::Receiver<StreamEvent>` and provides convenience
/// methods for consuming the stream.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Consume the stream and collect all text into a single string.
    ///
    /// Used by the non-streaming compaction call, which only needs the
    /// final text.
    pub async fn collect_text(mut self) -> Result<String, BackendError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => full_text.push_str(&chunk),
                StreamEvent::Completed(text) => {
                    if full_text.is_empty() {
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                StreamEvent::Error(e) => {
                    return Err(BackendError::RequestFailed(e));
                }
            }
        }
        // Channel closed without Completed — return what we have
        Ok(full_text)
    }
}

/// A hosted model capable of chat completions
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Stable identifier this backend is registered under
    fn id(&self) -> &ModelId;

    /// Human-readable name used in prompts
    fn display_name(&self) -> &str;

    /// Start a completion and return a handle to its fragment stream.
    ///
    /// Fails with a backend-specific error when the vendor is
    /// unreachable, unauthorized, or returns an error status.
    async fn chat(&self, request: ChatRequest) -> Result<StreamHandle, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collect_text_prefers_accumulated_deltas() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(StreamEvent::Delta("a".into())).await.unwrap();
        tx.send(StreamEvent::Delta("b".into())).await.unwrap();
        tx.send(StreamEvent::Completed("ab".into())).await.unwrap();
        drop(tx);

        let text = StreamHandle::new(rx).collect_text().await.unwrap();
        assert_eq!(text, "ab");
    }

    #[tokio::test]
    async fn collect_text_uses_completed_when_no_deltas() {
        let (tx, rx) = mpsc::channel(1);
        tx.send(StreamEvent::Completed("full".into())).await.unwrap();
        drop(tx);

        let text = StreamHandle::new(rx).collect_text().await.unwrap();
        assert_eq!(text, "full");
    }

    #[tokio::test]
    async fn collect_text_surfaces_stream_errors() {
        let (tx, rx) = mpsc::channel(1);
        tx.send(StreamEvent::Error("boom".into())).await.unwrap();
        drop(tx);

        let err = StreamHandle::new(rx).collect_text().await.unwrap_err();
        assert!(matches!(err, BackendError::RequestFailed(_)));
    }
}
