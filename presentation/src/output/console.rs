//! Console observer for the round event stream.
//!
//! Drains the per-round event channel and renders it live: a header per
//! participant, fragments as they arrive, failures inline, and the
//! round summary at the end. Turns never interleave, so printing
//! fragments directly is safe.

use colored::Colorize;
use roundtable_application::RoundEvent;
use roundtable_domain::DiscussionRecord;
use std::io::Write;
use tokio::sync::mpsc;

/// Renders round events to stdout as they arrive
pub struct ConsolePresenter;

impl ConsolePresenter {
    /// Consume the event stream until the channel closes.
    pub async fn run(mut receiver: mpsc::Receiver<RoundEvent>) {
        while let Some(event) = receiver.recv().await {
            match event {
                RoundEvent::ModelStart { model } => {
                    println!();
                    println!(
                        "{}",
                        format!("── 🤖 {} ──", model.as_str().to_uppercase())
                            .yellow()
                            .bold()
                    );
                }
                RoundEvent::ModelChunk { text, .. } => {
                    print!("{text}");
                    let _ = std::io::stdout().flush();
                }
                RoundEvent::ModelDone { .. } => {
                    println!();
                }
                RoundEvent::Error { model, error } => {
                    let who = model
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "round".to_string());
                    eprintln!("{}", format!("[{who}] {error}").red());
                }
                RoundEvent::RoundDone { round_id, record } => {
                    if let Some(summary) = round_summary(&record, round_id) {
                        println!();
                        println!("{}", format!("📝 本轮摘要：{summary}").dimmed());
                    }
                }
            }
        }
    }
}

/// Pull this round's one-line summary out of the updated record.
///
/// Prefers the key points across all message summaries; falls back to
/// the summaries themselves.
fn round_summary(record: &DiscussionRecord, round_number: u32) -> Option<String> {
    let round = record
        .recent_rounds
        .iter()
        .find(|r| r.round_number == round_number)?;

    let key_points: Vec<&str> = round
        .messages
        .iter()
        .flat_map(|m| m.key_points.iter())
        .map(String::as_str)
        .collect();
    let line = if key_points.is_empty() {
        round
            .messages
            .iter()
            .map(|m| m.summary.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        key_points.join("；")
    };

    if line.is_empty() { None } else { Some(line) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::{MessageSummary, RoundSummary};

    fn record(round_number: u32, key_points: Vec<String>, summary: &str) -> DiscussionRecord {
        let mut record = DiscussionRecord::empty("t");
        record.recent_rounds.push(RoundSummary {
            round_number,
            participants: vec![],
            messages: vec![MessageSummary {
                speaker: "glm".into(),
                summary: summary.into(),
                key_points,
            }],
            control_command: None,
        });
        record
    }

    #[test]
    fn summary_prefers_key_points() {
        let record = record(2, vec!["a".into(), "b".into()], "full summary");
        assert_eq!(round_summary(&record, 2).as_deref(), Some("a；b"));
    }

    #[test]
    fn summary_falls_back_to_message_summaries() {
        let record = record(2, vec![], "full summary");
        assert_eq!(round_summary(&record, 2).as_deref(), Some("full summary"));
    }

    #[test]
    fn missing_round_yields_none() {
        let record = record(2, vec![], "s");
        assert_eq!(round_summary(&record, 9), None);
    }
}
