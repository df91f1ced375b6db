//! shlist CLI
//!
//! Command-line interface for shlist - shopping lists kept on a remote service.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shlist_core::{Config, ServerId, ShlistError, SyncStore};

mod commands;
mod editor;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "shlist")]
#[command(about = "shlist - Shopping lists synced with a list service")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show active lists
    #[command(alias = "ls")]
    Lists {
        /// Load every page instead of the first
        #[arg(short, long)]
        all: bool,
    },
    /// Show completed lists
    History {
        /// Load every page instead of the first
        #[arg(short, long)]
        all: bool,
    },
    /// Create a new list
    #[command(alias = "add")]
    Create {
        /// List name
        name: String,
        /// Item to put on the list (repeatable)
        #[arg(short, long = "item", value_name = "ITEM")]
        items: Vec<String>,
        /// Show the list that would be sent without sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Mark an active list as completed
    #[command(alias = "done")]
    Complete {
        /// List ID
        id: ServerId,
    },
    /// Delete a completed list
    #[command(alias = "rm")]
    Delete {
        /// List ID
        id: ServerId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Replace a list's name and items (opens editor without --name)
    #[command(alias = "edit")]
    Update {
        /// List ID
        id: ServerId,
        /// New list name
        #[arg(short, long)]
        name: Option<String>,
        /// New item (repeatable)
        #[arg(short, long = "item", value_name = "ITEM")]
        items: Vec<String>,
    },
    /// Show this installation's client identifier
    Whoami,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Start an interactive shell (default)
    Shell,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, data_dir, request_timeout_secs, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    match run(cli, &output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ShlistError>() {
                Some(error) => output.notify_error(error),
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let config_path = cli.config.as_ref();

    // Config commands work even when the loaded config is unusable for requests
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);

    let store = Arc::new(SyncStore::open_with_config(&config)?);

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Lists { all } => commands::lists::active(store, all, output).await,
        Commands::History { all } => commands::lists::history(store, all, output).await,
        Commands::Create {
            name,
            items,
            dry_run,
        } => commands::lists::create(store, name, items, dry_run, output).await,
        Commands::Complete { id } => commands::lists::complete(store, id, output).await,
        Commands::Delete { id, yes } => commands::lists::delete(store, id, yes, output).await,
        Commands::Update { id, name, items } => {
            commands::lists::update(store, id, name, items, output).await
        }
        Commands::Whoami => commands::identity::whoami(&store, &config, output).await,
        Commands::Shell => commands::shell::run(store, output).await,
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging
///
/// Only initializes if SHLIST_LOG environment variable is set.
/// Logs to config.log_file when set, stderr otherwise.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("SHLIST_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "shlist_core={},shlist_cli={}",
        log_level, log_level
    ));

    match config.log_file {
        Some(ref log_path) => {
            let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
                    return;
                }
            };

            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file))
                .try_init();

            info!("Logging initialized to {:?}", log_path);
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
