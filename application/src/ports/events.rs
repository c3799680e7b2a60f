//! Push-protocol events emitted while a round executes.
//!
//! The event stream is strictly ordered per round: for each participant,
//! `model_start`, then its `model_chunk`s, then `model_done` — never
//! interleaved across participants — and finally one `round_done`.
//!
//! Events serialize with the wire field names any transport (SSE,
//! WebSocket, in-process channel) is expected to carry; the shipped
//! console observer consumes them directly from the channel.

use roundtable_domain::{DiscussionRecord, ModelId};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

/// An event in the per-round push protocol.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum RoundEvent {
    /// A participant's turn begins.
    ModelStart { model: ModelId },
    /// Incremental fragment of that participant's output.
    ModelChunk { model: ModelId, text: String },
    /// The participant's turn is complete, with its full accumulated text.
    ModelDone {
        model: ModelId,
        #[serde(rename = "fullText")]
        full_text: String,
    },
    /// A participant (or, when `model` is absent, the round) failed.
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        model: Option<ModelId>,
        error: String,
    },
    /// The round is complete; carries the updated record.
    RoundDone {
        #[serde(rename = "roundId")]
        round_id: u32,
        record: DiscussionRecord,
    },
}

/// Typed sender the round executor writes events to.
///
/// A closed receiver (observer gone) never aborts the round: the round
/// still has to finish so its outcome can be persisted.
#[derive(Clone)]
pub struct RoundEventTx {
    sender: mpsc::Sender<RoundEvent>,
}

impl RoundEventTx {
    pub fn new(sender: mpsc::Sender<RoundEvent>) -> Self {
        Self { sender }
    }

    /// Create a connected sender/receiver pair.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<RoundEvent>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(tx), rx)
    }

    pub async fn emit(&self, event: RoundEvent) {
        if self.sender.send(event).await.is_err() {
            debug!("round event receiver dropped; continuing without observer");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_wire_names() {
        let event = RoundEvent::ModelDone {
            model: ModelId::new("glm"),
            full_text: "hi".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "model_done");
        assert_eq!(json["data"]["fullText"], "hi");

        let event = RoundEvent::Error {
            model: None,
            error: "boom".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "error");
        assert!(json["data"].get("model").is_none());

        let event = RoundEvent::RoundDone {
            round_id: 3,
            record: DiscussionRecord::default(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["data"]["roundId"], 3);
    }

    #[tokio::test]
    async fn emit_survives_dropped_receiver() {
        let (tx, rx) = RoundEventTx::channel(1);
        drop(rx);
        tx.emit(RoundEvent::ModelStart { model: ModelId::new("glm") }).await;
    }
}
