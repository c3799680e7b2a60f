//! Participant selection for a round.

use crate::command::{CommandType, ParsedCommand};
use crate::core::model::ModelId;

/// Decide which participants speak this round, in order.
///
/// `summary` runs no participants (only compaction); `skip` removes the
/// target from the default order; `direct` yields a singleton when a
/// target is present. Everything else keeps the full default order.
pub fn select_participants(command: &ParsedCommand, default_order: &[ModelId]) -> Vec<ModelId> {
    match command.kind {
        CommandType::Summary => Vec::new(),
        CommandType::Skip => default_order
            .iter()
            .filter(|id| Some(*id) != command.target_model.as_ref())
            .cloned()
            .collect(),
        CommandType::Direct => match &command.target_model {
            Some(target) => vec![target.clone()],
            None => default_order.to_vec(),
        },
        _ => default_order.to_vec(),
    }
}
