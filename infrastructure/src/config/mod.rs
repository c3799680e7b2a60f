//! Configuration: raw TOML structures and the multi-source loader

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileDiscussionConfig, FileProviderConfig,
    FileStorageConfig, ProviderVendor,
};
pub use loader::ConfigLoader;
