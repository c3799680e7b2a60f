//! Vendor model backends.
//!
//! Every vendor exposes the same capability through [`ModelBackend`];
//! the differences are confined to the request/response envelope of the
//! small per-vendor adapter. The engine never sees vendor identity.

mod anthropic;
mod openai_compat;

pub use anthropic::AnthropicBackend;
pub use openai_compat::OpenAiCompatBackend;

use crate::config::{ConfigValidationError, FileConfig, ProviderVendor};
use roundtable_application::ModelRegistry;
use roundtable_domain::ModelId;
use std::sync::Arc;
use thiserror::Error;

/// Errors building the backend registry
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    InvalidConfig(#[from] ConfigValidationError),
}

/// Build the model registry from configuration.
///
/// API keys are resolved from the environment per call, not here, so a
/// missing key surfaces as that participant's error event instead of a
/// startup failure.
pub fn build_registry(config: &FileConfig) -> Result<ModelRegistry, ProviderError> {
    config.validate()?;

    let order: Vec<ModelId> = config.discussion.order.iter().map(ModelId::new).collect();
    let mut registry = ModelRegistry::new(order, ModelId::new(&config.discussion.recorder));

    for (id, provider) in &config.providers {
        let id = ModelId::new(id);
        match provider.vendor {
            ProviderVendor::OpenaiCompat => {
                registry.register(Arc::new(OpenAiCompatBackend::new(id, provider)));
            }
            ProviderVendor::Anthropic => {
                registry.register(Arc::new(AnthropicBackend::new(id, provider)));
            }
        }
    }

    Ok(registry)
}

/// Read and clean an environment variable.
///
/// Strips surrounding quotes and trailing `# comment`s, the two common
/// `.env` file mistakes that otherwise poison an API key.
pub(crate) fn env_value(name: &str) -> Option<String> {
    let raw = std::env::var(name).ok()?;
    let mut value = raw.trim();

    if (value.starts_with('"') && value.ends_with('"') && value.len() >= 2)
        || (value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2)
    {
        value = value[1..value.len() - 1].trim();
    }

    if let Some(pos) = value.find(" #") {
        value = value[..pos].trim();
    }

    if value.is_empty() { None } else { Some(value.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_registry_covers_default_order() {
        let registry = build_registry(&FileConfig::default()).unwrap();
        for id in ["glm", "kimi", "qwen"] {
            assert!(registry.get(&ModelId::new(id)).is_some());
        }
        assert!(registry.recorder().is_some());
    }

    #[test]
    fn env_value_strips_quotes_and_comments() {
        // Each case gets its own variable; the environment is process-global.
        unsafe {
            std::env::set_var("RT_TEST_PLAIN", "  sk-abc  ");
            std::env::set_var("RT_TEST_QUOTED", "\"sk-abc\"");
            std::env::set_var("RT_TEST_COMMENT", "sk-abc # production key");
            std::env::set_var("RT_TEST_EMPTY", "   ");
        }
        assert_eq!(env_value("RT_TEST_PLAIN").as_deref(), Some("sk-abc"));
        assert_eq!(env_value("RT_TEST_QUOTED").as_deref(), Some("sk-abc"));
        assert_eq!(env_value("RT_TEST_COMMENT").as_deref(), Some("sk-abc"));
        assert_eq!(env_value("RT_TEST_EMPTY"), None);
        assert_eq!(env_value("RT_TEST_MISSING"), None);
    }
}
