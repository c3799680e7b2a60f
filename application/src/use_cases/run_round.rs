//! Round orchestration use case (composition root of the engine).
//!
//! Wires parser → selector → executor for one incoming message: parses
//! the control command, adopts a new topic when appropriate, selects
//! participants, and runs the round. The caller owns persistence of the
//! returned outcome.

use crate::ports::events::{RoundEvent, RoundEventTx};
use crate::ports::registry::ModelRegistry;
use crate::use_cases::execute_round::{
    ExecuteRoundError, ExecuteRoundInput, ExecuteRoundUseCase,
};
use roundtable_domain::{
    CommandType, DiscussionRecord, RoundOutcome, parse_command, select_participants,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Errors that terminate a round before completion
#[derive(Error, Debug)]
pub enum RunRoundError {
    #[error("Round cancelled")]
    Cancelled,
}

/// Input for one user message against a session
#[derive(Debug, Clone)]
pub struct RunRoundInput {
    pub message: String,
    pub record: DiscussionRecord,
    /// Rounds completed so far; the new round is numbered one higher.
    pub current_round: u32,
}

/// Use case for running one full round from raw user input
pub struct RunRoundUseCase {
    registry: Arc<ModelRegistry>,
    executor: ExecuteRoundUseCase,
}

impl RunRoundUseCase {
    pub fn new(registry: Arc<ModelRegistry>, recent_rounds_cap: usize) -> Self {
        Self {
            executor: ExecuteRoundUseCase::new(Arc::clone(&registry), recent_rounds_cap),
            registry,
        }
    }

    pub async fn execute(
        &self,
        input: RunRoundInput,
        events: &RoundEventTx,
        cancel: &CancellationToken,
    ) -> Result<RoundOutcome, RunRoundError> {
        let command = parse_command(&input.message, &self.registry.known_ids());

        let mut record = input.record;
        // `@all` restates the topic; so does the very first normal message.
        if command.kind == CommandType::All
            || (input.current_round == 0 && command.kind == CommandType::Normal)
        {
            record.outline.topic = if command.content.is_empty() {
                input.message.clone()
            } else {
                command.content.clone()
            };
        }

        let participants = select_participants(&command, self.registry.default_order());
        let round_number = input.current_round + 1;
        info!(round_number, kind = ?command.kind, "round orchestrated");

        let exec_input = ExecuteRoundInput {
            user_message: input.message,
            command,
            participants,
            record,
            round_number,
        };

        match self.executor.execute(exec_input, events, cancel).await {
            Ok(outcome) => Ok(outcome),
            Err(e @ ExecuteRoundError::Cancelled) => {
                events
                    .emit(RoundEvent::Error {
                        model: None,
                        error: e.to_string(),
                    })
                    .await;
                Err(RunRoundError::Cancelled)
            }
        }
    }
}
