//! Infrastructure layer for roundtable
//!
//! Adapters implementing the ports defined in the application layer:
//! vendor model backends, configuration file loading, and the
//! file-backed session store plus Markdown transcript export.

pub mod config;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileDiscussionConfig, FileProviderConfig,
    FileStorageConfig,
};
pub use providers::{ProviderError, build_registry};
pub use storage::{JsonSessionStore, MarkdownTranscript};
