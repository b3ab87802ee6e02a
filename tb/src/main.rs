//! TaskBoard - terminal task board with a task-aware chat assistant
//!
//! CLI entry point.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use taskstore::{ClockIdSource, FileStorage, Status, Task, TaskStore, partition};
use tracing::{debug, info, warn};

use taskboard::chat::ChatEngine;
use taskboard::cli::{Cli, Command};
use taskboard::config::Config;
use taskboard::coordinator::Coordinator;
use taskboard::llm::create_client;
use taskboard::tui;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Can't log here yet, the subscriber isn't installed
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskboard")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("taskboard.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.storage.data_dir_path());
    info!(data_dir = %data_dir.display(), "TaskBoard starting");
    let store = open_store(&data_dir);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None | Some(Command::Tui) => {
            let coordinator = Coordinator::new(store, build_engine(&config));
            tui::run(coordinator).await
        }
        Some(Command::List) => {
            cmd_list(store.tasks());
            Ok(())
        }
        Some(Command::Ask { question }) => {
            let coordinator = Coordinator::new(store, build_engine(&config));
            cmd_ask(coordinator, &question.join(" ")).await
        }
    }
}

/// Open the task store under `data_dir`; load failures leave it empty
fn open_store(data_dir: &Path) -> TaskStore {
    debug!(data_dir = %data_dir.display(), "open_store: called");
    TaskStore::open(FileStorage::new(data_dir), ClockIdSource::new())
}

/// Chat engine from config, or the message explaining why there is none
fn build_engine(config: &Config) -> Result<ChatEngine, String> {
    debug!("build_engine: called");
    let resolved = config.llm.resolve().map_err(|e| {
        warn!(error = %e, "Chat disabled");
        e.to_string()
    })?;
    let client = create_client(&resolved).map_err(|e| {
        warn!(error = %e, "Failed to create LLM client");
        e.to_string()
    })?;
    info!(model = %client.model(), "LLM client ready");
    Ok(ChatEngine::new(client))
}

fn cmd_list(tasks: &[Task]) {
    debug!(count = tasks.len(), "cmd_list: called");
    let columns = partition(tasks);
    for status in Status::ALL {
        let column = &columns[status.index()];
        let header = format!("{} ({})", status, column.len());
        let header = match status {
            Status::Todo => header.yellow().bold(),
            Status::Doing => header.cyan().bold(),
            Status::Done => header.green().bold(),
        };
        println!("{}", header);
        if column.is_empty() {
            println!("  {}", "No tasks".dimmed());
        }
        for task in column {
            println!("  - {}: {}", task.title.bold(), task.description);
        }
        println!();
    }
}

async fn cmd_ask(mut coordinator: Coordinator, question: &str) -> Result<()> {
    debug!("cmd_ask: called");
    if !coordinator.ask(question).await {
        eyre::bail!("Question is empty");
    }
    if let Some(reply) = coordinator.chat.messages().last() {
        println!("{}", reply.content);
    }
    if let Some(error) = coordinator.chat.error() {
        eyre::bail!("{}", error);
    }
    Ok(())
}
