//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for roundtable
#[derive(Parser, Debug)]
#[command(name = "roundtable")]
#[command(author, version, about = "Multi-model discussion - several LLMs debate a topic in turns")]
#[command(long_about = r#"
Roundtable runs a turn-based discussion between several hosted models.
Each round, every participant speaks in order, seeing what earlier
participants already said this round; afterwards a recorder model
compacts the round into a bounded discussion record.

Messages may start with a control command:
  @all <topic>    restate the topic for everyone
  @深入           push the discussion deeper
  @挑战           challenge the current direction
  @总结           summarize; no participant speaks this round
  @跳过 <model>   skip one participant this round
  @<model> <msg>  address a single participant

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./roundtable.toml   Project-level config
3. ~/.config/roundtable/config.toml   Global config

Example:
  roundtable "缓存方案选型"
  roundtable --session k2x8fa01
  roundtable --list
"#)]
pub struct Cli {
    /// Title for a new discussion session (ignored with --session)
    pub title: Option<String>,

    /// Resume an existing session by id
    #[arg(short, long, value_name = "ID")]
    pub session: Option<String>,

    /// List stored sessions and exit
    #[arg(short, long)]
    pub list: bool,

    /// Print a session's Markdown transcript and exit
    #[arg(long, value_name = "ID")]
    pub export: Option<String>,

    /// Delete a session (and its transcript) and exit
    #[arg(long, value_name = "ID")]
    pub delete: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,
}
