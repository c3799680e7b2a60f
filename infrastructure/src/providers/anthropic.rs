//! Anthropic messages API backend.
//!
//! Differs from the OpenAI envelope in three ways: authentication uses
//! the `x-api-key` header plus a pinned `anthropic-version`, the system
//! prompt is a top-level field rather than a message, and streaming text
//! arrives as `content_block_delta` events.

use super::env_value;
use crate::config::FileProviderConfig;
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use roundtable_application::{BackendError, ChatRequest, ModelBackend, StreamHandle};
use roundtable_domain::{ModelId, Role, StreamEvent};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicBackend {
    id: ModelId,
    display_name: String,
    base_url: String,
    api_key_env: String,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl AnthropicBackend {
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
        // The messages API only accepts user/assistant roles; anything
        // else is folded into a user message.
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|message| {
                let role = match message.role {
                    Role::Assistant => "assistant",
                    _ => "user",
                };
                json!({ "role": role, "content": message.content })
            })
            .collect();
        json!({
            "model": self.model,
            "system": request.system_prompt,
            "messages": messages,
            "max_tokens": self.max_tokens,
            "stream": request.stream,
        })
    }
}

#[async_trait]
impl ModelBackend for AnthropicBackend {
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
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
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
        if event.event == "message_stop" {
            break;
        }
        let Some(delta) = delta_text(&event.data) else {
            debug!(event = %event.event, "skipping non-text SSE event");
            continue;
        };
        full_text.push_str(&delta);
        if tx.send(StreamEvent::Delta(delta)).await.is_err() {
            return;
        }
    }

    let _ = tx.send(StreamEvent::Completed(full_text)).await;
}

/// Extract text from a `content_block_delta` payload.
fn delta_text(data: &str) -> Option<String> {
    let value: Value = serde_json::from_str(data).ok()?;
    if value.get("type")?.as_str()? != "content_block_delta" {
        return None;
    }
    let text = value.get("delta")?.get("text")?.as_str()?;
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Extract the full text from a non-streaming messages response.
fn completion_text(body: &Value) -> Option<String> {
    let text = body.get("content")?.get(0)?.get("text")?.as_str()?;
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderVendor;
    use roundtable_domain::ChatMessage;

    fn backend() -> AnthropicBackend {
        AnthropicBackend::new(
            ModelId::new("claude"),
            &FileProviderConfig {
                vendor: ProviderVendor::Anthropic,
                display_name: Some("Claude".into()),
                base_url: "https://api.anthropic.com/v1/messages".into(),
                api_key_env: "ANTHROPIC_API_KEY".into(),
                model: "claude-sonnet-4-20250514".into(),
                max_tokens: 1000,
            },
        )
    }

    #[test]
    fn request_body_lifts_system_prompt_out_of_messages() {
        let body = backend().request_body(&ChatRequest {
            system_prompt: "rules".into(),
            messages: vec![
                ChatMessage::user("question"),
                ChatMessage::assistant("answer"),
            ],
            stream: false,
        });
        assert_eq!(body["system"], "rules");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][1]["role"], "assistant");
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn delta_text_only_accepts_content_block_deltas() {
        let delta = r#"{"type":"content_block_delta","delta":{"type":"text_delta","text":"hi"}}"#;
        assert_eq!(delta_text(delta).as_deref(), Some("hi"));

        let other = r#"{"type":"message_delta","delta":{"stop_reason":"end_turn"}}"#;
        assert_eq!(delta_text(other), None);
    }

    #[test]
    fn completion_text_reads_first_content_block() {
        let body: Value =
            serde_json::from_str(r#"{"content":[{"type":"text","text":"done"}]}"#).unwrap();
        assert_eq!(completion_text(&body).as_deref(), Some("done"));
        assert_eq!(completion_text(&json!({"content": []})), None);
    }
}
