// Copyright (c) 2026 Rota Maintainers
// SPDX-License-Identifier: AGPL-3.0

//! # Rota Scheduler CLI
//!
//! The `rota` binary hosts the scheduling API and administers its database
//! and configuration.
//!
//! ## Commands
//!
//! - `rota serve` - Run the HTTP API
//! - `rota migrate` - Apply pending database migrations
//! - `rota config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use rota_core::domain::scheduler_config::{LoggingConfig, SchedulerConfigManifest};

mod commands;

use commands::ConfigCommand;

/// Rota Scheduler - volunteer schedules, conflicts and swap requests
#[derive(Parser)]
#[command(name = "rota")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "ROTA_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Defaults to the configured level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduling HTTP API
    #[command(name = "serve")]
    Serve {
        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Apply pending database migrations and exit
    #[command(name = "migrate")]
    Migrate,

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal outside development
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let logging = logging_settings(cli.config.clone(), cli.log_level.clone());
    init_logging(&logging)?;

    match cli.command {
        Some(Commands::Serve { port }) => commands::serve::run(cli.config, port).await,
        Some(Commands::Migrate) => commands::migrate::run(cli.config).await,
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Logging settings from the configuration file, with the `--log-level`
/// flag taking precedence. An unreadable file falls back to defaults here;
/// the command itself reports the load error once logging is up.
fn logging_settings(config_path: Option<PathBuf>, level_flag: Option<String>) -> LoggingConfig {
    let mut logging = SchedulerConfigManifest::load_or_default(config_path)
        .map(|config| config.spec.observability.logging)
        .unwrap_or_default();
    if let Some(level) = level_flag {
        logging.level = level;
    }
    logging
}

/// Initialize tracing subscriber for logging
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&logging.level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.compact().init();
    }

    Ok(())
}
