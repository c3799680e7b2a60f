//! Prompts for the recorder (summarizer) model.

/// Templates for the record-compaction call.
pub struct RecorderPrompt;

impl RecorderPrompt {
    /// System prompt: the recorder must answer with bare JSON.
    pub fn system() -> &'static str {
        "你是一个 JSON 输出助手，只输出有效的 JSON。"
    }

    /// Instruction prompt embedding the serialized current record and the
    /// round transcript, asking for the complete updated record.
    pub fn update(current_record_json: &str, round_messages: &str, recent_rounds_cap: usize) -> String {
        format!(
            r#"你是本次头脑风暴的记录员。你的任务是在每轮讨论结束后更新讨论记录。

当前讨论记录：
{current_record_json}

本轮所有发言：
{round_messages}

请根据本轮讨论更新记录，输出更新后的完整 JSON。规则：
1. outline.topic: 如果是新话题则更新，否则保持
2. outline.keyDecisions: 记录已形成共识的结论
3. outline.openQuestions: 记录尚未解决或有争议的问题
4. outline.directionChanges: 记录讨论方向的重大转变
5. recentRounds: 保留最近 {recent_rounds_cap} 轮，新增本轮摘要
6. 如果 recentRounds 超出 {recent_rounds_cap} 轮，将最早的一轮要点合并进 outline
7. 每条发言摘要控制在 1-3 句话，提取核心观点

请只输出有效的 JSON，不要有其他内容，不要用 markdown 代码块包裹。"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_prompt_embeds_record_and_cap() {
        let prompt = RecorderPrompt::update("{\"outline\":{}}", "user: hi", 5);
        assert!(prompt.contains("{\"outline\":{}}"));
        assert!(prompt.contains("user: hi"));
        assert!(prompt.contains("保留最近 5 轮"));
    }
}
