//! OpenAI-compatible chat completions backend.
//!
//! Speaks the `chat/completions` envelope shared by Zhipu, Moonshot,
//! DashScope and OpenAI itself. Streaming responses arrive as SSE
//! `data:` lines carrying delta JSON, terminated by a `[DONE]` sentinel.

use super::env_value;
use crate::config::FileProviderConfig;
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use roundtable_application::{BackendError, ChatRequest, ModelBackend, StreamHandle};
use roundtable_domain::{ModelId, StreamEvent};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::debug;

pub struct OpenAiCompatBackend {
    id: ModelId,
    display_name: String,
    base_url: String,
    api_key_env: String,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAiCompatBackend {
    pub fn new(id: ModelId, config: &FileProviderConfig) -> Self {
        let display_name = config
            .display_name
            .clone()
            .unwrap_or_else(|| id.as_str().to_uppercase());
        Self {
            id,
            display_name,
            base_url: config.base_url.clone(),
            api_key_env: config.api_key_env.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            client: reqwest::Client::new(),
        }
    }

    fn request_body(&self, request: &ChatRequest) -> Value {
        let mut messages = vec![json!({
            "role": "system",
            "content": request.system_prompt,
        })];
        for message in &request.messages {
            messages.push(json!({
                "role": message.role.as_str(),
                "content": message.content,
            }));
        }
        json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": self.max_tokens,
            "stream": request.stream,
        })
    }
}

#[async_trait]
impl ModelBackend for OpenAiCompatBackend {
    fn id(&self) -> &ModelId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    async fn chat(&self, request: ChatRequest) -> Result<StreamHandle, BackendError> {
        let api_key = env_value(&self.api_key_env).ok_or_else(|| {
            BackendError::Unauthorized(format!(
                "environment variable {} is not set",
                self.api_key_env
            ))
        })?;

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(api_key)
            .json(&self.request_body(&request))
            .send()
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => BackendError::Unauthorized(body),
                _ => BackendError::RequestFailed(format!("{status}: {body}")),
            });
        }

        let (tx, rx) = mpsc::channel(64);
        if request.stream {
            tokio::spawn(relay_sse(response, tx));
        } else {
            let body: Value = response
                .json()
                .await
                .map_err(|e| BackendError::RequestFailed(e.to_string()))?;
            let text = completion_text(&body).ok_or(BackendError::EmptyResponse)?;
            let _ = tx.send(StreamEvent::Delta(text.clone())).await;
            let _ = tx.send(StreamEvent::Completed(text)).await;
        }
        Ok(StreamHandle::new(rx))
    }
}

/// Relay SSE chunks into the fragment channel until `[DONE]` or error.
async fn relay_sse(response: reqwest::Response, tx: mpsc::Sender<StreamEvent>) {
    let mut stream = response.bytes_stream().eventsource();
    let mut full_text = String::new();

    while let Some(event) = stream.next().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                return;
            }
        };
        if event.data.trim() == "[DONE]" {
            break;
        }
        let Some(delta) = delta_text(&event.data) else {
            // Keep-alives and role-only deltas carry no text
            debug!(data = %event.data, "skipping non-text SSE event");
            continue;
        };
        full_text.push_str(&delta);
        if tx.send(StreamEvent::Delta(delta)).await.is_err() {
            return;
        }
    }

    let _ = tx.send(StreamEvent::Completed(full_text)).await;
}

/// Extract the text delta from one SSE data payload.
fn delta_text(data: &str) -> Option<String> {
    let value: Value = serde_json::from_str(data).ok()?;
    let content = value
        .get("choices")?
        .get(0)?
        .get("delta")?
        .get("content")?
        .as_str()?;
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

/// Extract the full text from a non-streaming completion body.
fn completion_text(body: &Value) -> Option<String> {
    let content = body
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()?;
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderVendor;
    use roundtable_domain::ChatMessage;

    fn backend() -> OpenAiCompatBackend {
        OpenAiCompatBackend::new(
            ModelId::new("glm"),
            &FileProviderConfig {
                vendor: ProviderVendor::OpenaiCompat,
                display_name: Some("GLM".into()),
                base_url: "https://example.com/v4/chat/completions".into(),
                api_key_env: "TEST_KEY".into(),
                model: "glm-4-flash".into(),
                max_tokens: 1000,
            },
        )
    }

    #[test]
    fn request_body_prepends_system_prompt() {
        let body = backend().request_body(&ChatRequest {
            system_prompt: "rules".into(),
            messages: vec![ChatMessage::user("hello")],
            stream: true,
        });
        assert_eq!(body["model"], "glm-4-flash");
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "rules");
        assert_eq!(body["messages"][1]["role"], "user");
    }

    #[test]
    fn delta_text_reads_streaming_chunk() {
        let data = r#"{"choices":[{"delta":{"content":"你好"}}]}"#;
        assert_eq!(delta_text(data).as_deref(), Some("你好"));
    }

    #[test]
    fn delta_text_skips_role_only_chunk() {
        let data = r#"{"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(delta_text(data), None);
        assert_eq!(delta_text("not json"), None);
    }

    #[test]
    fn completion_text_reads_message_content() {
        let body: Value = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"done"}}]}"#,
        )
        .unwrap();
        assert_eq!(completion_text(&body).as_deref(), Some("done"));
        assert_eq!(completion_text(&json!({"choices": []})), None);
    }

    #[test]
    fn display_name_defaults_to_uppercased_id() {
        let mut config = FileProviderConfig::default();
        config.base_url = "https://example.com".into();
        let backend = OpenAiCompatBackend::new(ModelId::new("kimi"), &config);
        assert_eq!(backend.display_name(), "KIMI");
    }
}
