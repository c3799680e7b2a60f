//! Record compaction use case.
//!
//! Folds one round's transcript into the bounded discussion record by
//! asking the designated recorder model for a complete updated record,
//! with a deterministic local fallback when that call or its output
//! parsing fails. Compaction never raises past its caller.

use crate::ports::backend::{BackendError, ChatRequest};
use crate::ports::registry::ModelRegistry;
use roundtable_domain::{
    ChatMessage, DiscussionRecord, DomainError, MessageSummary, RecorderPrompt, RoundMessage,
    RoundSummary,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Fallback summaries keep at most this many characters of each message.
const FALLBACK_SUMMARY_CHARS: usize = 200;

#[derive(Error, Debug)]
enum CompactError {
    #[error("no recorder backend configured")]
    NoRecorder,

    #[error("recorder call failed: {0}")]
    Backend(#[from] BackendError),

    #[error("recorder output was not a valid record: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Use case for compacting a round into the discussion record
pub struct CompactRecordUseCase {
    registry: Arc<ModelRegistry>,
    recent_rounds_cap: usize,
}

impl CompactRecordUseCase {
    pub fn new(registry: Arc<ModelRegistry>, recent_rounds_cap: usize) -> Self {
        Self {
            registry,
            recent_rounds_cap,
        }
    }

    /// Fold `messages` into `record`, returning the updated record.
    ///
    /// All failures are absorbed into the fallback path; the observer
    /// never sees a compaction error.
    pub async fn execute(
        &self,
        record: DiscussionRecord,
        messages: &[RoundMessage],
        round_number: u32,
    ) -> DiscussionRecord {
        match self.summarize_with_recorder(&record, messages).await {
            Ok(updated) => {
                debug!(round_number, "recorder updated the discussion record");
                updated
            }
            Err(e) => {
                warn!(round_number, error = %e, "recorder failed, using fallback summary");
                self.fallback_summary(record, messages, round_number)
            }
        }
    }

    async fn summarize_with_recorder(
        &self,
        record: &DiscussionRecord,
        messages: &[RoundMessage],
    ) -> Result<DiscussionRecord, CompactError> {
        let recorder = self.registry.recorder().ok_or(CompactError::NoRecorder)?;

        let transcript = messages
            .iter()
            .map(|m| format!("{}: {}", m.speaker, m.content))
            .collect::<Vec<_>>()
            .join("\n\n");
        let record_json = serde_json::to_string_pretty(record)?;
        let prompt = RecorderPrompt::update(&record_json, &transcript, self.recent_rounds_cap);

        let request = ChatRequest {
            system_prompt: RecorderPrompt::system().to_string(),
            messages: vec![ChatMessage::user(prompt)],
            stream: false,
        };

        let response = recorder.chat(request).await?.collect_text().await?;

        let mut updated: DiscussionRecord = serde_json::from_str(strip_code_fence(&response))?;
        updated.validate()?;
        // The recorder is told the cap but models overrun it anyway.
        updated.truncate_recent(self.recent_rounds_cap);
        Ok(updated)
    }

    /// Deterministic local summary for the round.
    ///
    /// Unlike the primary path, eviction here is a plain slice: the
    /// dropped oldest round is NOT folded into the outline, and the
    /// outline fields are left untouched. Keep this divergence — exported
    /// transcripts and downstream consumers depend on the fallback's
    /// observable behavior.
    fn fallback_summary(
        &self,
        mut record: DiscussionRecord,
        messages: &[RoundMessage],
        round_number: u32,
    ) -> DiscussionRecord {
        let summary = RoundSummary {
            round_number,
            participants: messages
                .iter()
                .filter(|m| !m.is_user())
                .map(|m| m.speaker.as_str().into())
                .collect(),
            messages: messages
                .iter()
                .map(|m| MessageSummary {
                    speaker: m.speaker.clone(),
                    summary: truncate_chars(&m.content, FALLBACK_SUMMARY_CHARS),
                    key_points: Vec::new(),
                })
                .collect(),
            control_command: None,
        };

        record.recent_rounds.push(summary);
        record.truncate_recent(self.recent_rounds_cap);
        record
    }
}

/// First `max` characters of `content`, with an ellipsis when truncated.
fn truncate_chars(content: &str, max: usize) -> String {
    let mut truncated: String = content.chars().take(max).collect();
    if content.chars().count() > max {
        truncated.push_str("...");
    }
    truncated
}

/// Strip a surrounding markdown code fence, if the model wrapped its JSON
/// in one despite instructions.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let inner = match inner.split_once('\n') {
        Some((_, rest)) => rest,
        None => inner,
    };
    inner.trim_end().trim_end_matches("```").trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::backend::{ModelBackend, StreamHandle};
    use async_trait::async_trait;
    use roundtable_domain::{ModelId, StreamEvent};
    use tokio::sync::mpsc;

    struct ScriptedRecorder {
        id: ModelId,
        response: Option<String>,
    }

    #[async_trait]
    impl ModelBackend for ScriptedRecorder {
        fn id(&self) -> &ModelId {
            &self.id
        }

        fn display_name(&self) -> &str {
            "Recorder"
        }

        async fn chat(&self, request: ChatRequest) -> Result<StreamHandle, BackendError> {
            assert!(!request.stream, "compaction must not stream");
            let Some(response) = self.response.clone() else {
                return Err(BackendError::Connection("unreachable".into()));
            };
            let (tx, rx) = mpsc::channel(1);
            tx.send(StreamEvent::Completed(response)).await.unwrap();
            Ok(StreamHandle::new(rx))
        }
    }

    fn registry_with(response: Option<String>) -> Arc<ModelRegistry> {
        let mut registry =
            ModelRegistry::new(vec![ModelId::new("glm")], ModelId::new("glm"));
        registry.register(Arc::new(ScriptedRecorder {
            id: ModelId::new("glm"),
            response,
        }));
        Arc::new(registry)
    }

    fn round_messages() -> Vec<RoundMessage> {
        vec![
            RoundMessage::user("话题"),
            RoundMessage::model(&ModelId::new("glm"), &"长".repeat(250)),
            RoundMessage::model(&ModelId::new("kimi"), "短回答"),
        ]
    }

    #[tokio::test]
    async fn primary_path_parses_recorder_output() {
        let updated = serde_json::json!({
            "outline": { "topic": "new", "keyDecisions": ["d"] },
            "recentRounds": [{ "roundNumber": 1, "participants": ["glm"], "messages": [] }]
        });
        let use_case = CompactRecordUseCase::new(
            registry_with(Some(format!("```json\n{updated}\n```"))),
            5,
        );

        let record = use_case
            .execute(DiscussionRecord::empty("old"), &round_messages(), 1)
            .await;
        assert_eq!(record.outline.topic, "new");
        assert_eq!(record.recent_rounds.len(), 1);
    }

    #[tokio::test]
    async fn primary_path_enforces_window_cap() {
        // Recorder overruns the cap it was told about; the excess is
        // truncated locally, keeping the most recent rounds.
        let rounds: Vec<_> = (1..=8)
            .map(|n| serde_json::json!({ "roundNumber": n, "messages": [] }))
            .collect();
        let updated = serde_json::json!({
            "outline": { "topic": "t" },
            "recentRounds": rounds
        });
        let use_case = CompactRecordUseCase::new(registry_with(Some(updated.to_string())), 5);

        let record = use_case
            .execute(DiscussionRecord::empty("t"), &round_messages(), 8)
            .await;
        assert_eq!(record.recent_rounds.len(), 5);
        assert_eq!(record.recent_rounds[0].round_number, 4);
        assert_eq!(record.recent_rounds[4].round_number, 8);
    }

    #[tokio::test]
    async fn malformed_recorder_output_triggers_fallback() {
        let use_case =
            CompactRecordUseCase::new(registry_with(Some("not json at all".into())), 5);

        let record = use_case
            .execute(DiscussionRecord::empty("topic"), &round_messages(), 1)
            .await;
        // Fallback appended exactly one round and left the outline alone
        assert_eq!(record.recent_rounds.len(), 1);
        assert_eq!(record.outline.topic, "topic");
    }

    #[tokio::test]
    async fn invalid_record_structure_triggers_fallback() {
        // Parses as JSON but violates the strictly-increasing invariant
        let bad = serde_json::json!({
            "outline": { "topic": "x" },
            "recentRounds": [
                { "roundNumber": 2, "messages": [] },
                { "roundNumber": 2, "messages": [] }
            ]
        });
        let use_case = CompactRecordUseCase::new(registry_with(Some(bad.to_string())), 5);

        let record = use_case
            .execute(DiscussionRecord::empty("topic"), &round_messages(), 3)
            .await;
        assert_eq!(record.recent_rounds.len(), 1);
        assert_eq!(record.recent_rounds[0].round_number, 3);
    }

    #[tokio::test]
    async fn fallback_truncates_summaries_and_skips_user_in_participants() {
        let use_case = CompactRecordUseCase::new(registry_with(None), 5);

        let record = use_case
            .execute(DiscussionRecord::empty("topic"), &round_messages(), 1)
            .await;

        let round = &record.recent_rounds[0];
        assert_eq!(
            round.participants,
            vec![ModelId::new("glm"), ModelId::new("kimi")]
        );
        // 200 chars + "..."
        let long = &round.messages[1].summary;
        assert_eq!(long.chars().count(), 203);
        assert!(long.ends_with("..."));
        // Short content untouched
        assert_eq!(round.messages[2].summary, "短回答");
        assert!(round.messages.iter().all(|m| m.key_points.is_empty()));
    }

    #[tokio::test]
    async fn fallback_enforces_window_cap() {
        let use_case = CompactRecordUseCase::new(registry_with(None), 3);

        let mut record = DiscussionRecord::empty("topic");
        for n in 1..=6 {
            record = use_case.execute(record, &round_messages(), n).await;
            assert!(record.recent_rounds.len() <= 3);
        }
        assert_eq!(record.recent_rounds.last().unwrap().round_number, 6);
        assert_eq!(record.recent_rounds[0].round_number, 4);
    }

    #[test]
    fn strip_code_fence_variants() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "汉".repeat(205);
        let truncated = truncate_chars(&text, 200);
        assert_eq!(truncated.chars().count(), 203);
    }
}
