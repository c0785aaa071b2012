//! Call Center Assist CLI
//!
//! Main entry point for the `assist` command-line tool.
//! Helps call-center agents answer member questions from call transcripts,
//! the FAQ knowledge store and the member data product.

mod commands;
mod output;

use assist_core::{
    config::AppConfig,
    logging::{self, LogFormat},
    AppResult,
};
use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, MemberCommand, PromptsCommand};
use std::path::PathBuf;

/// Call Center Assist - answers for agents on a live member call
#[derive(Parser, Debug)]
#[command(name = "assist")]
#[command(about = "Chat assistant for call-center agents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "ASSIST_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "ASSIST_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Completion model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Completion mode (api, sql)
    #[arg(long, global = true)]
    mode: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive chat session
    Chat(ChatCommand),

    /// Answer a single question
    Ask(AskCommand),

    /// Look up the member calling from a phone number
    Member(MemberCommand),

    /// Inspect prompt templates
    Prompts(PromptsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load configuration from the workspace, config file and environment
    let config = AppConfig::load_from(cli.workspace, cli.config)?;

    // Apply CLI overrides
    let mut config = config.with_overrides(
        None,
        cli.model,
        cli.mode,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );
    if let Some(format) = cli.log_format {
        config.log_format = Some(format);
    }

    // Initialize logging with final configuration
    let log_format = config
        .log_format
        .as_deref()
        .and_then(LogFormat::parse)
        .unwrap_or_default();
    logging::init_logging(config.log_level.as_deref(), config.no_color, log_format)?;

    tracing::info!("Call Center Assist starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Model: {} ({})", config.completion.model, config.completion.mode);

    config.validate()?;

    let command_name = match &cli.command {
        Commands::Chat(_) => "chat",
        Commands::Ask(_) => "ask",
        Commands::Member(_) => "member",
        Commands::Prompts(_) => "prompts",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Member(cmd) => cmd.execute(&config).await,
        Commands::Prompts(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
