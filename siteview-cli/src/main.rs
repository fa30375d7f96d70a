//! SiteView CLI - headless model inspection and viewer runs

#![warn(missing_docs)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{highlight, inspect, run, SourceArgs};

#[derive(Parser)]
#[command(name = "siteview")]
#[command(about = "Load, inspect and highlight construction models", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model document URL (overrides the configuration)
    #[arg(long, global = true, env = "SITEVIEW_MODEL_URL")]
    url: Option<String>,

    /// Read the model document from a local file instead of the network
    #[arg(long, global = true, conflicts_with = "url")]
    file: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the model and print its hierarchy
    Inspect {
        /// Print the hierarchy as JSON
        #[arg(long)]
        json: bool,
    },

    /// Highlight parts and report the material swap
    Highlight {
        /// Highlight every part with this status code (1-4)
        #[arg(long, conflicts_with = "ids")]
        status: Option<i64>,

        /// Highlight these node ids
        #[arg(long, value_delimiter = ',')]
        ids: Vec<u32>,
    },

    /// Mount the viewer and run the render loop for a while
    Run {
        /// How long to run, in milliseconds
        #[arg(long, default_value = "2000")]
        duration_ms: u64,

        /// Viewport size as WIDTHxHEIGHT
        #[arg(long, default_value = "1280x720")]
        size: String,

        /// Resize to WIDTHxHEIGHT halfway through
        #[arg(long)]
        resize: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let source = SourceArgs {
        config: cli.config,
        url: cli.url,
        file: cli.file,
    };

    // The viewer is single-threaded; everything runs on one local set
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async move {
            match cli.command {
                Commands::Inspect { json } => inspect::inspect(&source, json).await,
                Commands::Highlight { status, ids } => {
                    highlight::highlight(&source, status, ids).await
                }
                Commands::Run {
                    duration_ms,
                    size,
                    resize,
                } => run::run(&source, duration_ms, &size, resize.as_deref()).await,
            }
        })
        .await
}
