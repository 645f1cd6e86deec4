//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod config_cmd;
mod extract;
mod scrape;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::{LoadOptions, Settings};

#[derive(Parser)]
#[command(name = "headscout")]
#[command(about = "Collect competitor heading structures and build an outline prompt")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true, env = "HEADSCOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch competitor pages and print their heading structures and the prompt
    Scrape {
        /// Competitor URLs, in priority order
        urls: Vec<String>,
        /// Read URLs from a file, one per line ('-' for stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Topic inserted into the prompt
        #[arg(short, long)]
        topic: Option<String>,
        /// Skip the browser tier and use plain HTTP only
        #[arg(long)]
        no_browser: bool,
        /// Print the batch result as JSON
        #[arg(long)]
        json: bool,
        /// Write the prompt (or JSON) to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract headings from a local HTML file
    Extract {
        /// HTML file ('-' for stdin)
        file: PathBuf,
        /// Print the structure as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether a saved page is a challenge or block page
    Check {
        /// HTML file ('-' for stdin)
        file: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file that would be loaded
    Path,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        ignore_env: false,
    };

    if let Commands::Config {
        command: ConfigCommands::Path,
    } = cli.command
    {
        return config_cmd::cmd_config_path(options.config_path.as_deref());
    }

    let settings = Settings::load(&options).context("Failed to load configuration")?;

    match cli.command {
        Commands::Scrape {
            urls,
            file,
            topic,
            no_browser,
            json,
            output,
        } => {
            let args = scrape::ScrapeArgs {
                urls,
                file,
                topic,
                use_browser: !no_browser,
                json,
                output,
            };
            scrape::cmd_scrape(&settings, args).await
        }
        Commands::Extract { file, json } => extract::cmd_extract(&settings, &file, json),
        Commands::Check { file } => check::cmd_check(&settings, &file),
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_cmd::cmd_config_show(&settings),
            ConfigCommands::Path => config_cmd::cmd_config_path(options.config_path.as_deref()),
        },
    }
}

/// Read a file, or stdin when the path is `-`.
pub(crate) fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        return std::io::read_to_string(std::io::stdin()).context("Failed to read stdin");
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
