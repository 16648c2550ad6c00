//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod dump;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "covid")]
#[command(about = "COVID-19 case statistics scraper and JSON API")]
#[command(version)]
pub struct Cli {
    /// Config file path (skips discovery)
    #[arg(short, long, global = true, env = "COVIDSCRAPE_CONFIG")]
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
    /// Start the JSON API server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default: from config, 0.0.0.0:8080)
        bind: Option<String>,
    },

    /// Fetch the per-country feed once and print it as JSON
    Feed {
        /// Country name ("All" for every country)
        #[arg(long)]
        country: Option<String>,
        /// Country code ("ALL" for every country)
        #[arg(long)]
        code: Option<String>,
        /// Output shape: list, dict, series, split, records, index
        #[arg(short = 't', long = "type", default_value = "list")]
        shape: String,
    },

    /// Scrape the regional tables once and print them as JSON
    Regions {
        /// Output shape: list, dict, series, split, records, index
        #[arg(short = 't', long = "type", default_value = "list")]
        shape: String,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let settings = load_settings_with_options(options).await?;

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.bind.clone());
            serve::cmd_serve(&settings, &bind).await
        }
        Commands::Feed {
            country,
            code,
            shape,
        } => dump::cmd_feed(&settings, country.as_deref(), code.as_deref(), &shape).await,
        Commands::Regions { shape } => dump::cmd_regions(&settings, &shape).await,
    }
}
