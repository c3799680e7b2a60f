//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly; the stock three-vendor setup is the
//! default so the binary runs with no config file at all (given the API
//! key environment variables).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("discussion.order cannot be empty")]
    EmptyOrder,

    #[error("discussion.recent_rounds cannot be 0")]
    InvalidRecentRounds,

    #[error("model '{0}' appears in discussion.order but has no [providers.{0}] entry")]
    UnknownModelInOrder(String),

    #[error("provider '{0}' has an empty base_url")]
    EmptyBaseUrl(String),
}

/// Which request/response envelope a provider speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderVendor {
    /// OpenAI-style `chat/completions` (Zhipu, Moonshot, DashScope, OpenAI)
    OpenaiCompat,
    /// Anthropic `messages` API
    Anthropic,
}

/// Raw discussion configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDiscussionConfig {
    /// Default speaking order (model ids)
    pub order: Vec<String>,
    /// Model that maintains the discussion record
    pub recorder: String,
    /// Sliding-window bound on recentRounds
    pub recent_rounds: usize,
}

impl Default for FileDiscussionConfig {
    fn default() -> Self {
        Self {
            order: vec!["glm".into(), "kimi".into(), "qwen".into()],
            recorder: "glm".into(),
            recent_rounds: roundtable_domain::DEFAULT_RECENT_ROUNDS_CAP,
        }
    }
}

/// Raw per-provider configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    pub vendor: ProviderVendor,
    /// Human-readable name used in prompts; defaults to the id uppercased
    pub display_name: Option<String>,
    pub base_url: String,
    /// Environment variable holding the API key (resolved per call)
    pub api_key_env: String,
    /// Vendor-side model name
    pub model: String,
    pub max_tokens: u32,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            vendor: ProviderVendor::OpenaiCompat,
            display_name: None,
            base_url: String::new(),
            api_key_env: String::new(),
            model: String::new(),
            max_tokens: 1000,
        }
    }
}

/// Raw storage configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Directory holding sessions.json and per-session Markdown files
    pub data_dir: PathBuf,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

/// Full configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub discussion: FileDiscussionConfig,
    pub providers: BTreeMap<String, FileProviderConfig>,
    pub storage: FileStorageConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        let mut providers = BTreeMap::new();
        providers.insert(
            "glm".to_string(),
            FileProviderConfig {
                vendor: ProviderVendor::OpenaiCompat,
                display_name: Some("GLM".into()),
                base_url: "https://open.bigmodel.cn/api/paas/v4/chat/completions".into(),
                api_key_env: "ZHIPU_API_KEY".into(),
                model: "glm-4-flash".into(),
                max_tokens: 1000,
            },
        );
        providers.insert(
            "kimi".to_string(),
            FileProviderConfig {
                vendor: ProviderVendor::OpenaiCompat,
                display_name: Some("Kimi".into()),
                base_url: "https://api.moonshot.cn/v1/chat/completions".into(),
                api_key_env: "MOONSHOT_API_KEY".into(),
                model: "moonshot-v1-8k".into(),
                max_tokens: 1000,
            },
        );
        providers.insert(
            "qwen".to_string(),
            FileProviderConfig {
                vendor: ProviderVendor::OpenaiCompat,
                display_name: Some("Qwen".into()),
                base_url:
                    "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions".into(),
                api_key_env: "DASHSCOPE_API_KEY".into(),
                model: "qwen-turbo".into(),
                max_tokens: 1000,
            },
        );

        Self {
            discussion: FileDiscussionConfig::default(),
            providers,
            storage: FileStorageConfig::default(),
        }
    }
}

impl FileConfig {
    /// Validate cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.discussion.order.is_empty() {
            return Err(ConfigValidationError::EmptyOrder);
        }
        if self.discussion.recent_rounds == 0 {
            return Err(ConfigValidationError::InvalidRecentRounds);
        }
        for id in &self.discussion.order {
            if !self.providers.contains_key(&id.to_lowercase()) {
                return Err(ConfigValidationError::UnknownModelInOrder(id.clone()));
            }
        }
        for (id, provider) in &self.providers {
            if provider.base_url.is_empty() {
                return Err(ConfigValidationError::EmptyBaseUrl(id.clone()));
            }
        }
        Ok(())
    }
}
