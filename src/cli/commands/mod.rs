//! CLI parser and dispatch.

mod autopilot;
mod bulk;
mod discover;
mod keywords;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::models::Platform;

#[derive(Parser)]
#[command(name = "mscout")]
#[command(about = "Marketplace product discovery, extraction and price tracking")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Marketplace (gmarket, domeggook, aliexpress); defaults to the configured one
    #[arg(short, long, global = true)]
    platform: Option<Platform>,

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
    /// Scrape product detail pages for a list of identifiers
    Bulk {
        /// Product identifiers
        ids: Vec<String>,
        /// File with one identifier per line
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Concurrent workers (clamped by the marketplace's pacing)
        #[arg(short, long, default_value = "5")]
        workers: usize,
        /// Output file (defaults to the configured output file)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Search a marketplace for a keyword and print listing identifiers
    Discover {
        keyword: String,
        /// Maximum identifiers returned
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print the rows of a domeggook category listing
    Listing {
        /// Category code, e.g. 01_02
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Run one discovery-and-analysis cycle over the stored keywords
    Autopilot {
        /// Concurrent detail workers (clamped by the marketplace's pacing)
        #[arg(short, long, default_value = "5")]
        workers: usize,
        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Manage tracked keywords
    Keywords {
        #[command(subcommand)]
        command: KeywordCommands,
    },

    /// Show stored keyword insights
    Insights {
        /// Only this keyword
        keyword: Option<String>,
    },
}

#[derive(Subcommand)]
enum KeywordCommands {
    /// Add a keyword
    Add { keyword: String },
    /// Remove a keyword
    Remove { keyword: String },
    /// List keywords
    List,
}

async fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from_path(&path)
            .await
            .map_err(|e| anyhow::anyhow!(e)),
        None => Ok(Config::load().await),
    }
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config).await?;
    let platform = cli.platform.unwrap_or(config.platform);

    match cli.command {
        Commands::Bulk {
            ids,
            input,
            workers,
            output,
            no_progress,
        } => {
            bulk::cmd_bulk(
                &config,
                platform,
                &ids,
                input.as_deref(),
                workers,
                output,
                !no_progress,
            )
            .await
        }
        Commands::Discover { keyword, limit } => {
            discover::cmd_discover(&config, platform, &keyword, limit).await
        }
        Commands::Listing { category, page } => {
            discover::cmd_listing(&config, category.as_deref(), page).await
        }
        Commands::Autopilot {
            workers,
            no_progress,
        } => autopilot::cmd_autopilot(&config, platform, workers, !no_progress).await,
        Commands::Keywords { command } => match command {
            KeywordCommands::Add { keyword } => keywords::cmd_keyword_add(&config, &keyword).await,
            KeywordCommands::Remove { keyword } => {
                keywords::cmd_keyword_remove(&config, &keyword).await
            }
            KeywordCommands::List => keywords::cmd_keyword_list(&config).await,
        },
        Commands::Insights { keyword } => {
            keywords::cmd_insights(&config, keyword.as_deref()).await
        }
    }
}
