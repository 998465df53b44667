//! clickbox CLI: draw click markers onto recorded session videos.
//!
//! Usage:
//!   clickbox annotate [ROOT]     Annotate every session folder under ROOT
//!   clickbox plan <FOLDER>       Show the markers planned for one folder
//!   clickbox check               Check for ffmpeg/ffprobe

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clickbox_common::config::{AppConfig, OutOfRangePolicy};

mod commands;

#[derive(Parser)]
#[command(
    name = "clickbox",
    about = "Overlay click markers on screen recordings",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate every session folder under a root directory
    Annotate {
        /// Directory whose subdirectories are sessions
        /// [default: `output` next to the executable]
        root: Option<PathBuf>,

        /// Handling of clicks outside the video: keep|drop|clamp
        #[arg(long)]
        policy: Option<OutOfRangePolicy>,
    },

    /// Show the markers planned for one session folder without rendering
    Plan {
        /// Path to the session folder
        folder: PathBuf,

        /// Handling of clicks outside the video: keep|drop|clamp
        #[arg(long)]
        policy: Option<OutOfRangePolicy>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that the external media tools are available
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    clickbox_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Annotate { root, policy } => {
            if let Some(root) = root {
                config.output_root = Some(root);
            }
            if let Some(policy) = policy {
                config.out_of_range = policy;
            }
            commands::annotate::run(&config)
        }
        Commands::Plan {
            folder,
            policy,
            json,
        } => {
            if let Some(policy) = policy {
                config.out_of_range = policy;
            }
            commands::plan::run(&config, folder, json)
        }
        Commands::Check => commands::check::run(&config),
    }
}
