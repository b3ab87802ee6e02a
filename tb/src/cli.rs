//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// TaskBoard - task board with a task-aware chat assistant
#[derive(Debug, Parser)]
#[command(
    name = "tb",
    about = "Terminal task board with a chat assistant that knows your tasks",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Directory holding tasks.json (overrides storage.data-dir)
    #[arg(short = 'd', long = "data-dir", global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the board and chat (default)
    Tui,

    /// Print tasks grouped by column
    List,

    /// Ask the assistant one question about your tasks
    Ask {
        /// Question to send
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
}
