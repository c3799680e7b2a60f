//! Domain layer for roundtable
//!
//! This crate contains the core business logic of the multi-model
//! discussion engine: entities, value objects, and the pure functions
//! that decide what happens in a round. It has no dependencies on
//! infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Round
//!
//! One complete cycle of a user prompt followed by zero or more model
//! turns and one record-compaction step. Participants speak strictly in
//! sequence so the observer sees a readable, non-interleaved discussion.
//!
//! ## Discussion record
//!
//! The bounded, continuously-recompacted summary of the conversation:
//! an outline (topic, decisions, open questions, pivots) plus a sliding
//! window of recent round summaries.

pub mod command;
pub mod core;
pub mod discussion;
pub mod prompt;
pub mod selection;

// Re-export commonly used types
pub use command::{CommandType, ParsedCommand, markers, parse_command};
pub use core::{error::DomainError, model::ModelId};
pub use discussion::{
    entities::Session,
    message::{ChatMessage, Role},
    record::{
        DEFAULT_RECENT_ROUNDS_CAP, DiscussionRecord, MessageSummary, Outline, RoundSummary,
    },
    round::{RoundMessage, RoundOutcome, USER_SPEAKER},
    stream::StreamEvent,
};
pub use prompt::{DiscussionPrompt, RecorderPrompt};
pub use selection::select_participants;
