//! The bounded, self-summarizing discussion record.
//!
//! [`DiscussionRecord`] is regenerated after every round by the record
//! compactor. The outline carries durable state (topic, decisions, open
//! questions, pivots); `recent_rounds` is a sliding window of per-round
//! summaries, bounded by a configurable cap.
//!
//! Field names serialize as camelCase: this is both the on-disk session
//! format and the shape the recorder model is asked to emit.

use crate::core::error::DomainError;
use crate::core::model::ModelId;
use serde::{Deserialize, Serialize};

/// Default bound on the `recent_rounds` sliding window.
pub const DEFAULT_RECENT_ROUNDS_CAP: usize = 5;

/// Durable outline of the discussion so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Outline {
    pub topic: String,
    pub key_decisions: Vec<String>,
    pub open_questions: Vec<String>,
    pub direction_changes: Vec<String>,
}

/// Summary of a single message within a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    pub speaker: String,
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

/// Summary of one completed round. Immutable once created, except for
/// being dropped out of the sliding window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummary {
    pub round_number: u32,
    #[serde(default)]
    pub participants: Vec<ModelId>,
    #[serde(default)]
    pub messages: Vec<MessageSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_command: Option<String>,
}

/// The bounded discussion record: outline + recent round summaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscussionRecord {
    pub outline: Outline,
    pub recent_rounds: Vec<RoundSummary>,
}

impl DiscussionRecord {
    /// Create an empty record for a new discussion.
    pub fn empty(topic: impl Into<String>) -> Self {
        Self {
            outline: Outline {
                topic: topic.into(),
                ..Outline::default()
            },
            recent_rounds: Vec::new(),
        }
    }

    /// Check the window invariant: round numbers strictly increasing
    /// (which also rules out duplicates).
    ///
    /// Used to reject malformed recorder-model output before it replaces
    /// the previous record.
    pub fn validate(&self) -> Result<(), DomainError> {
        for pair in self.recent_rounds.windows(2) {
            if pair[1].round_number <= pair[0].round_number {
                return Err(DomainError::InvalidRecord(format!(
                    "recentRounds not strictly increasing: {} then {}",
                    pair[0].round_number, pair[1].round_number
                )));
            }
        }
        Ok(())
    }

    /// Drop the oldest entries so at most `cap` rounds remain.
    pub fn truncate_recent(&mut self, cap: usize) {
        if self.recent_rounds.len() > cap {
            let excess = self.recent_rounds.len() - cap;
            self.recent_rounds.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(n: u32) -> RoundSummary {
        RoundSummary {
            round_number: n,
            participants: vec![ModelId::new("glm")],
            messages: vec![],
            control_command: None,
        }
    }

    #[test]
    fn empty_record_has_topic_only() {
        let record = DiscussionRecord::empty("caching strategy");
        assert_eq!(record.outline.topic, "caching strategy");
        assert!(record.outline.key_decisions.is_empty());
        assert!(record.recent_rounds.is_empty());
    }

    #[test]
    fn validate_rejects_duplicate_round_numbers() {
        let mut record = DiscussionRecord::default();
        record.recent_rounds = vec![round(1), round(2), round(2)];
        assert!(record.validate().is_err());
    }

    #[test]
    fn validate_rejects_unordered_rounds() {
        let mut record = DiscussionRecord::default();
        record.recent_rounds = vec![round(3), round(1)];
        assert!(record.validate().is_err());
        record.recent_rounds = vec![round(1), round(2), round(5)];
        assert!(record.validate().is_ok());
    }

    #[test]
    fn truncate_keeps_most_recent() {
        let mut record = DiscussionRecord::default();
        record.recent_rounds = (1..=8).map(round).collect();
        record.truncate_recent(5);
        assert_eq!(record.recent_rounds.len(), 5);
        assert_eq!(record.recent_rounds[0].round_number, 4);
        assert_eq!(record.recent_rounds[4].round_number, 8);
    }

    #[test]
    fn serializes_as_camel_case() {
        let record = DiscussionRecord {
            outline: Outline {
                topic: "t".into(),
                key_decisions: vec!["d".into()],
                open_questions: vec![],
                direction_changes: vec![],
            },
            recent_rounds: vec![round(1)],
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["outline"]["keyDecisions"].is_array());
        assert_eq!(json["recentRounds"][0]["roundNumber"], 1);
        // controlCommand is omitted when absent
        assert!(json["recentRounds"][0].get("controlCommand").is_none());
    }

    #[test]
    fn deserializes_sparse_recorder_output() {
        // Recorder models routinely drop empty arrays; defaults fill them in.
        let json = r#"{
            "outline": { "topic": "x" },
            "recentRounds": [{ "roundNumber": 1, "messages": [
                { "speaker": "glm", "summary": "s" }
            ]}]
        }"#;
        let record: DiscussionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.outline.topic, "x");
        assert!(record.recent_rounds[0].messages[0].key_points.is_empty());
    }
}
