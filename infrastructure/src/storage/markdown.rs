//! Markdown transcript export.
//!
//! One file per session under the data directory. The transcript keeps
//! the full verbatim messages that the bounded record deliberately drops,
//! so nothing the models said is ever lost, only summarized in memory.

use async_trait::async_trait;
use roundtable_application::{StoreError, TranscriptExporter};
use roundtable_domain::{DiscussionRecord, RoundMessage, Session};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct MarkdownTranscript {
    data_dir: PathBuf,
}

impl MarkdownTranscript {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, session_id: &str) -> PathBuf {
        self.data_dir.join(format!("{session_id}.md"))
    }
}

/// Render one round as a Markdown section.
fn render_round(
    round_number: u32,
    messages: &[RoundMessage],
    record: &DiscussionRecord,
) -> String {
    let mut content = format!("\n## Round {round_number}\n\n");

    for message in messages {
        let speaker = if message.is_user() {
            "👤 用户".to_string()
        } else {
            format!("🤖 {}", message.speaker.to_uppercase())
        };
        content.push_str(&format!("**{speaker}**\n\n{}\n\n", message.content));
    }

    if let Some(summary) = record
        .recent_rounds
        .iter()
        .find(|r| r.round_number == round_number)
    {
        content.push_str("> 📝 **本轮摘要**：");
        let key_points: Vec<&str> = summary
            .messages
            .iter()
            .flat_map(|m| m.key_points.iter())
            .map(String::as_str)
            .collect();
        if key_points.is_empty() {
            let summaries: Vec<&str> =
                summary.messages.iter().map(|m| m.summary.as_str()).collect();
            content.push_str(&summaries.join(" "));
        } else {
            content.push_str(&key_points.join("；"));
        }
        content.push('\n');
    }

    content.push_str("\n---\n");
    content
}

#[async_trait]
impl TranscriptExporter for MarkdownTranscript {
    async fn create(&self, session: &Session) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir)?;
        let header = format!(
            "# 讨论：{}\n\n创建时间：{}\n\n---\n\n",
            session.title,
            session.created_at.format("%Y-%m-%d %H:%M:%S")
        );
        fs::write(self.path_for(&session.id), header)?;
        Ok(())
    }

    async fn append_round(
        &self,
        session_id: &str,
        round_number: u32,
        messages: &[RoundMessage],
        record: &DiscussionRecord,
    ) -> Result<(), StoreError> {
        let path = self.path_for(session_id);
        // Sessions created before export existed have no transcript file
        if !path.exists() {
            return Ok(());
        }
        let mut file = OpenOptions::new().append(true).open(path)?;
        file.write_all(render_round(round_number, messages, record).as_bytes())?;
        Ok(())
    }

    async fn read(&self, session_id: &str) -> Result<String, StoreError> {
        let path = self.path_for(session_id);
        if !path.exists() {
            return Ok(String::new());
        }
        Ok(fs::read_to_string(path)?)
    }

    async fn remove(&self, session_id: &str) -> Result<(), StoreError> {
        let path = self.path_for(session_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::{MessageSummary, ModelId, RoundSummary};

    fn record_with_summary(round_number: u32, key_points: Vec<String>) -> DiscussionRecord {
        let mut record = DiscussionRecord::empty("t");
        record.recent_rounds.push(RoundSummary {
            round_number,
            participants: vec![ModelId::new("glm")],
            messages: vec![MessageSummary {
                speaker: "glm".into(),
                summary: "总结了缓存方案".into(),
                key_points,
            }],
            control_command: None,
        });
        record
    }

    #[test]
    fn round_section_prefers_key_points() {
        let messages = vec![
            RoundMessage::user("怎么做缓存？"),
            RoundMessage::model(&ModelId::new("glm"), "用 LRU"),
        ];
        let record = record_with_summary(1, vec!["用 LRU".into(), "带 TTL".into()]);
        let section = render_round(1, &messages, &record);
        assert!(section.contains("## Round 1"));
        assert!(section.contains("**👤 用户**"));
        assert!(section.contains("**🤖 GLM**"));
        assert!(section.contains("本轮摘要**：用 LRU；带 TTL"));
    }

    #[test]
    fn round_section_falls_back_to_summaries() {
        let record = record_with_summary(2, vec![]);
        let section = render_round(2, &[], &record);
        assert!(section.contains("本轮摘要**：总结了缓存方案"));
    }

    #[test]
    fn round_without_summary_omits_the_block() {
        let record = DiscussionRecord::empty("t");
        let section = render_round(3, &[], &record);
        assert!(!section.contains("本轮摘要"));
    }

    #[tokio::test]
    async fn create_append_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = MarkdownTranscript::new(dir.path());
        let session = Session::new("abc123", "缓存设计");

        transcript.create(&session).await.unwrap();
        transcript
            .append_round(
                &session.id,
                1,
                &[RoundMessage::user("开始")],
                &record_with_summary(1, vec![]),
            )
            .await
            .unwrap();

        let content = transcript.read(&session.id).await.unwrap();
        assert!(content.starts_with("# 讨论：缓存设计"));
        assert!(content.contains("## Round 1"));

        transcript.remove(&session.id).await.unwrap();
        assert_eq!(transcript.read(&session.id).await.unwrap(), "");
    }

    #[tokio::test]
    async fn append_to_missing_transcript_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = MarkdownTranscript::new(dir.path());
        let record = DiscussionRecord::empty("t");
        transcript.append_round("ghost", 1, &[], &record).await.unwrap();
        assert_eq!(transcript.read("ghost").await.unwrap(), "");
    }
}
