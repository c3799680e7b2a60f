//! Presentation layer for roundtable
//!
//! CLI definitions, the console round observer, and the interactive
//! discussion REPL.

pub mod cli;
pub mod output;
pub mod repl;

// Re-export commonly used types
pub use cli::commands::Cli;
pub use output::console::ConsolePresenter;
pub use repl::DiscussionRepl;
