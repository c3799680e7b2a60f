//! Control-command parsing.
//!
//! A control command is a structured directive parsed from a user message
//! prefix that alters participant selection or injects steering
//! instructions. Parsing is a total function: every input maps to exactly
//! one command, and anything unrecognized (including malformed `@`
//! prefixes) falls through to [`CommandType::Normal`] with the marker left
//! in the content. That permissiveness is intentional, not a failure.

use crate::core::model::ModelId;
use crate::prompt::injections;
use serde::{Deserialize, Serialize};

/// Command markers recognized in user messages.
pub mod markers {
    /// New topic addressed to all participants.
    pub const ALL: &str = "@all ";
    /// Deep-dive analysis request.
    pub const DEEP: &str = "@深入";
    /// Critical-review request.
    pub const CHALLENGE: &str = "@挑战";
    /// Summary-only round (exact match, no model speaks).
    pub const SUMMARY: &str = "@总结";
    /// Skip one participant this round.
    pub const SKIP: &str = "@跳过";
    /// Optional "new topic" labels stripped from `@all` content.
    pub const NEW_TOPIC_LABELS: [&str; 2] = ["新话题：", "新话题:"];
}

/// The kind of control command a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    All,
    Deep,
    Challenge,
    Summary,
    Skip,
    Direct,
    Normal,
}

/// A parsed control command. Produced fresh per incoming message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedCommand {
    #[serde(rename = "type")]
    pub kind: CommandType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_model: Option<ModelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_injection: Option<String>,
}

impl ParsedCommand {
    fn normal(content: impl Into<String>) -> Self {
        Self {
            kind: CommandType::Normal,
            content: content.into(),
            target_model: None,
            prompt_injection: None,
        }
    }
}

/// Parse a user message into a control command.
///
/// Recognized forms are checked in priority order, first match wins:
/// `@all `, `@深入`, `@挑战`, exact `@总结`, `@跳过`, then `@<modelId> rest`
/// for any id in `known_models` (case-insensitive). Everything else is a
/// normal message.
pub fn parse_command(message: &str, known_models: &[ModelId]) -> ParsedCommand {
    if let Some(rest) = message.strip_prefix(markers::ALL) {
        return ParsedCommand {
            kind: CommandType::All,
            content: strip_new_topic_label(rest).to_string(),
            target_model: None,
            prompt_injection: Some(injections::ALL.to_string()),
        };
    }

    if let Some(rest) = message.strip_prefix(markers::DEEP) {
        return ParsedCommand {
            kind: CommandType::Deep,
            content: rest.trim().to_string(),
            target_model: None,
            prompt_injection: Some(injections::DEEP.to_string()),
        };
    }

    if let Some(rest) = message.strip_prefix(markers::CHALLENGE) {
        return ParsedCommand {
            kind: CommandType::Challenge,
            content: rest.trim().to_string(),
            target_model: None,
            prompt_injection: Some(injections::CHALLENGE.to_string()),
        };
    }

    if message.trim() == markers::SUMMARY {
        return ParsedCommand {
            kind: CommandType::Summary,
            content: String::new(),
            target_model: None,
            prompt_injection: Some(injections::SUMMARY.to_string()),
        };
    }

    if let Some(rest) = message.strip_prefix(markers::SKIP) {
        return ParsedCommand {
            kind: CommandType::Skip,
            content: String::new(),
            target_model: Some(ModelId::new(rest)),
            prompt_injection: None,
        };
    }

    // "@<modelId> rest" — direct address of one known participant.
    if let Some(rest) = message.strip_prefix('@')
        && let Some((id, content)) = rest.split_once(char::is_whitespace)
    {
        let id = ModelId::new(id);
        if known_models.contains(&id) {
            return ParsedCommand {
                kind: CommandType::Direct,
                content: content.trim_start().to_string(),
                target_model: Some(id),
                prompt_injection: None,
            };
        }
    }

    ParsedCommand::normal(message)
}

fn strip_new_topic_label(content: &str) -> &str {
    for label in markers::NEW_TOPIC_LABELS {
        if let Some(rest) = content.strip_prefix(label) {
            return rest.trim_start();
        }
    }
    content
}
