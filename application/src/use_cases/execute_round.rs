//! Round execution use case.
//!
//! Drives one discussion round: emits the user's message, then invokes
//! each selected participant strictly in sequence — never in parallel, so
//! the push channel carries a deterministic, non-interleaved turn order —
//! relaying fragments as they arrive and isolating per-participant
//! failures. After the last participant the record compactor runs and
//! `round_done` is emitted.

use crate::ports::backend::{BackendError, ChatRequest, ModelBackend};
use crate::ports::events::{RoundEvent, RoundEventTx};
use crate::ports::registry::ModelRegistry;
use crate::use_cases::compact_record::CompactRecordUseCase;
use roundtable_domain::{
    ChatMessage, DiscussionPrompt, DiscussionRecord, ModelId, ParsedCommand, RoundMessage,
    RoundOutcome, StreamEvent,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Errors that abort a round early
#[derive(Error, Debug)]
pub enum ExecuteRoundError {
    #[error("Round cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
enum TurnError {
    #[error("Round cancelled")]
    Cancelled,

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("{0}")]
    Stream(String),
}

/// Input for one round of discussion
#[derive(Debug, Clone)]
pub struct ExecuteRoundInput {
    pub user_message: String,
    pub command: ParsedCommand,
    pub participants: Vec<ModelId>,
    pub record: DiscussionRecord,
    pub round_number: u32,
}

/// Use case for executing one discussion round
pub struct ExecuteRoundUseCase {
    registry: Arc<ModelRegistry>,
    compactor: CompactRecordUseCase,
}

impl ExecuteRoundUseCase {
    pub fn new(registry: Arc<ModelRegistry>, recent_rounds_cap: usize) -> Self {
        Self {
            compactor: CompactRecordUseCase::new(Arc::clone(&registry), recent_rounds_cap),
            registry,
        }
    }

    /// Execute the round, streaming events to `events` as it goes.
    ///
    /// A single participant's failure never aborts the round; the
    /// remaining participants still speak. Cancellation stops the turn in
    /// flight and starts no further participants.
    pub async fn execute(
        &self,
        input: ExecuteRoundInput,
        events: &RoundEventTx,
        cancel: &CancellationToken,
    ) -> Result<RoundOutcome, ExecuteRoundError> {
        info!(
            round_number = input.round_number,
            participants = input.participants.len(),
            "starting round"
        );

        let mut messages = vec![RoundMessage::user(&input.user_message)];
        let context_prompt = DiscussionPrompt::context(&input.record);

        for participant in &input.participants {
            if cancel.is_cancelled() {
                return Err(ExecuteRoundError::Cancelled);
            }

            // Unregistered ids are skipped silently; selection normally
            // filters them out already.
            let Some(backend) = self.registry.get(participant) else {
                warn!(model = %participant, "no backend registered, skipping");
                continue;
            };

            events
                .emit(RoundEvent::ModelStart {
                    model: participant.clone(),
                })
                .await;

            match self
                .run_turn(&backend, &context_prompt, &messages, &input.command, events, cancel)
                .await
            {
                Ok(full_text) => {
                    messages.push(RoundMessage::model(participant, &full_text));
                    events
                        .emit(RoundEvent::ModelDone {
                            model: participant.clone(),
                            full_text,
                        })
                        .await;
                }
                Err(TurnError::Cancelled) => return Err(ExecuteRoundError::Cancelled),
                Err(e) => {
                    warn!(model = %participant, error = %e, "participant failed, continuing");
                    events
                        .emit(RoundEvent::Error {
                            model: Some(participant.clone()),
                            error: e.to_string(),
                        })
                        .await;
                }
            }
        }

        let record = self
            .compactor
            .execute(input.record, &messages, input.round_number)
            .await;

        events
            .emit(RoundEvent::RoundDone {
                round_id: input.round_number,
                record: record.clone(),
            })
            .await;

        Ok(RoundOutcome {
            round_number: input.round_number,
            messages,
            record,
        })
    }

    /// One participant's streaming turn. Returns the full accumulated text.
    async fn run_turn(
        &self,
        backend: &Arc<dyn ModelBackend>,
        context_prompt: &str,
        messages: &[RoundMessage],
        command: &ParsedCommand,
        events: &RoundEventTx,
        cancel: &CancellationToken,
    ) -> Result<String, TurnError> {
        // Each speaker sees the record context plus every prior turn of
        // this round, including earlier participants' full output.
        let prompt = format!(
            "{context_prompt}{}",
            DiscussionPrompt::format_current_round(messages)
        );
        let request = ChatRequest {
            system_prompt: DiscussionPrompt::discussant_system(
                backend.display_name(),
                command.prompt_injection.as_deref(),
            ),
            messages: vec![ChatMessage::user(prompt)],
            stream: true,
        };

        let mut handle = backend.chat(request).await?;
        let model = backend.id().clone();
        let mut full_text = String::new();

        loop {
            // The only true suspension point of the round: each fragment
            // arrival yields control back here.
            let event = tokio::select! {
                _ = cancel.cancelled() => return Err(TurnError::Cancelled),
                event = handle.receiver.recv() => event,
            };

            match event {
                Some(StreamEvent::Delta(chunk)) => {
                    full_text.push_str(&chunk);
                    events
                        .emit(RoundEvent::ModelChunk {
                            model: model.clone(),
                            text: chunk,
                        })
                        .await;
                }
                Some(StreamEvent::Completed(text)) => {
                    if full_text.is_empty() && !text.is_empty() {
                        // Single-shot response: relay it as one fragment.
                        events
                            .emit(RoundEvent::ModelChunk {
                                model: model.clone(),
                                text: text.clone(),
                            })
                            .await;
                        full_text = text;
                    }
                    break;
                }
                Some(StreamEvent::Error(e)) => return Err(TurnError::Stream(e)),
                // Stream closed without a terminal event: keep what we have.
                None => break,
            }
        }

        Ok(full_text)
    }
}
