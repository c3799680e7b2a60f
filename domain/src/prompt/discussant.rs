//! Prompts for discussion participants.

use crate::discussion::record::DiscussionRecord;
use crate::discussion::round::RoundMessage;
use std::fmt::Write;

/// Templates for the discussant side of a round.
pub struct DiscussionPrompt;

impl DiscussionPrompt {
    /// System prompt for a participant, with the command's steering
    /// instruction appended when present.
    pub fn discussant_system(display_name: &str, injection: Option<&str>) -> String {
        let mut prompt = format!(
            r#"你是 {display_name}，正在参与一场多 AI 模型的头脑风暴讨论。

规则：
1. 直接给出你的想法和观点，不要客套寒暄
2. 如果你同意之前的观点，简要说明并补充新的角度，不要重复
3. 如果你有不同意见，明确指出并说明理由
4. 保持回复简洁有力，每次发言控制在 200-400 字
5. 聚焦在可落地的具体建议上"#
        );

        if let Some(injection) = injection {
            prompt.push_str("\n\n");
            prompt.push_str(injection);
        }

        prompt
    }

    /// Context prompt built from the discussion record: outline fields plus
    /// a textual rendering of the recent rounds, ending with the header the
    /// current round's turns are appended under.
    pub fn context(record: &DiscussionRecord) -> String {
        let outline = &record.outline;
        let mut context = format!(
            "## 讨论大纲\n当前讨论主题：{}\n\n",
            outline.topic
        );

        if !outline.key_decisions.is_empty() {
            context.push_str("已达成结论：\n");
            for decision in &outline.key_decisions {
                let _ = writeln!(context, "- {decision}");
            }
            context.push('\n');
        }

        if !outline.open_questions.is_empty() {
            context.push_str("待解决问题：\n");
            for question in &outline.open_questions {
                let _ = writeln!(context, "- {question}");
            }
            context.push('\n');
        }

        let recent = Self::format_recent_rounds(record);
        if !recent.is_empty() {
            let _ = write!(context, "## 近期讨论摘要\n{recent}\n\n");
        }

        context.push_str("## 本轮最新发言\n");
        context
    }

    /// Chronological `speaker: summary` rendering of the recent rounds.
    pub fn format_recent_rounds(record: &DiscussionRecord) -> String {
        record
            .recent_rounds
            .iter()
            .map(|round| {
                let msgs = round
                    .messages
                    .iter()
                    .map(|m| format!("{}: {}", m.speaker, m.summary))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("Round {}:\n{}", round.round_number, msgs)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Rendering of the turns accumulated so far in the current round, so
    /// each subsequent speaker sees prior speakers' full output.
    pub fn format_current_round(messages: &[RoundMessage]) -> String {
        messages
            .iter()
            .map(|m| format!("**{}**: {}", m.speaker, m.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discussion::record::{MessageSummary, Outline, RoundSummary};

    fn record_with_rounds() -> DiscussionRecord {
        DiscussionRecord {
            outline: Outline {
                topic: "缓存选型".into(),
                key_decisions: vec!["用 Redis".into()],
                open_questions: vec!["预算?".into()],
                direction_changes: vec![],
            },
            recent_rounds: vec![RoundSummary {
                round_number: 1,
                participants: vec!["glm".into()],
                messages: vec![MessageSummary {
                    speaker: "glm".into(),
                    summary: "建议分层缓存".into(),
                    key_points: vec![],
                }],
                control_command: None,
            }],
        }
    }

    #[test]
    fn context_includes_all_outline_sections() {
        let context = DiscussionPrompt::context(&record_with_rounds());
        assert!(context.contains("当前讨论主题：缓存选型"));
        assert!(context.contains("- 用 Redis"));
        assert!(context.contains("- 预算?"));
        assert!(context.contains("Round 1:\nglm: 建议分层缓存"));
        assert!(context.ends_with("## 本轮最新发言\n"));
    }

    #[test]
    fn context_omits_empty_sections() {
        let record = DiscussionRecord::empty("t");
        let context = DiscussionPrompt::context(&record);
        assert!(!context.contains("已达成结论"));
        assert!(!context.contains("近期讨论摘要"));
    }

    #[test]
    fn system_prompt_appends_injection() {
        let base = DiscussionPrompt::discussant_system("GLM", None);
        let with = DiscussionPrompt::discussant_system("GLM", Some("请直言不讳。"));
        assert!(with.starts_with(&base));
        assert!(with.ends_with("请直言不讳。"));
    }

    #[test]
    fn current_round_renders_bold_speakers() {
        let messages = vec![
            crate::discussion::round::RoundMessage::user("开始"),
            crate::discussion::round::RoundMessage::model(&"glm".into(), "观点"),
        ];
        let rendered = DiscussionPrompt::format_current_round(&messages);
        assert_eq!(rendered, "**user**: 开始\n\n**glm**: 观点");
    }
}
