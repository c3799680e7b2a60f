//! File-backed persistence: JSON session store and Markdown transcripts.

mod json_store;
mod markdown;

pub use json_store::JsonSessionStore;
pub use markdown::MarkdownTranscript;
