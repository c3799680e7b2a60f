//! Raw per-round messages and the round result.

use crate::core::model::ModelId;
use crate::discussion::record::DiscussionRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Speaker name used for the initiating user turn.
pub const USER_SPEAKER: &str = "user";

/// A raw (non-summarized) utterance in a round: the user's message or one
/// participant's full turn. Exists for the duration of the round and is
/// handed to storage verbatim; the engine does not retain it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundMessage {
    pub speaker: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl RoundMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            speaker: USER_SPEAKER.to_string(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn model(id: &ModelId, content: impl Into<String>) -> Self {
        Self {
            speaker: id.to_string(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.speaker == USER_SPEAKER
    }
}

/// Result of one completed round, returned to the caller for persistence.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub round_number: u32,
    pub messages: Vec<RoundMessage>,
    pub record: DiscussionRecord,
}
