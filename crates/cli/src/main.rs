//! refdesk CLI
//!
//! Main entry point for the refdesk command-line tool: question answering
//! over a single reference document with intent routing.

mod commands;

use clap::{Parser, Subcommand};
use commands::{ChatCommand, IndexCommand};
use refdesk_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// refdesk - answer questions against a reference document
#[derive(Parser, Debug)]
#[command(name = "refdesk")]
#[command(about = "Intent-routed question answering over a reference document", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (default: ./refdesk.yaml)
    #[arg(short, long, global = true, env = "REFDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Model provider (openai, ollama, mock)
    #[arg(short, long, global = true, env = "REFDESK_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "REFDESK_MODEL")]
    model: Option<String>,

    /// Document source (file path or URL)
    #[arg(short, long, global = true)]
    document: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a query (or read queries line-by-line from stdin)
    Chat(ChatCommand),

    /// Build the document index and print its stats
    Index(IndexCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    let config = config.with_overrides(
        cli.config,
        cli.provider,
        cli.model,
        cli.document,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("refdesk starting");
    tracing::debug!("Provider: {}", config.llm.provider);
    tracing::debug!("Document: {}", config.assistant.document);

    let command_name = match &cli.command {
        Commands::Chat(_) => "chat",
        Commands::Index(_) => "index",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Chat(cmd) => cmd.execute(config).await,
        Commands::Index(cmd) => cmd.execute(config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
