//! release-bot CLI

#![allow(clippy::doc_markdown)]

mod cli;

use clap::{Parser, Subcommand};
use release_bot::error::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding log filter directives
const LOG_ENV: &str = "RELEASE_BOT_LOG";

#[derive(Parser)]
#[command(name = "release-bot")]
#[command(about = "Merge a batch of approved pull requests and halt on a broken release pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file
    #[arg(short, long, global = true, env = "RELEASE_BOT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the ready issues listed in a manifest
    Merge {
        /// JSON file with the issues to release
        #[arg(short, long)]
        manifest: PathBuf,

        /// Dry run - show what would be merged without making changes
        #[arg(long)]
        dry_run: bool,

        /// Preview the release and prompt for confirmation before merging
        #[arg(long)]
        confirm: bool,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file locations searched
    Path,
}

fn init_tracing(json: bool, verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("release_bot={level},warn")));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr).json())
            .try_init()
            .ok();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Merge {
            manifest,
            dry_run,
            confirm,
        } => {
            let options = cli::MergeOptions { dry_run, confirm };
            cli::run_merge(&manifest, cli.config.as_deref(), options).await
        }
        Commands::Config { action } => {
            let action = match action {
                ConfigAction::Show => cli::ConfigCommand::Show,
                ConfigAction::Path => cli::ConfigCommand::Path,
            };
            cli::run_config(action, cli.config.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.json, cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            anstream::eprintln!("{} {e}", cli::style::error_prefix());
            ExitCode::FAILURE
        }
    }
}
