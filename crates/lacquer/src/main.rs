//! Lacquer CLI - static asset build pipeline.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "lacquer")]
#[command(about = "Static asset build pipeline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to lacquer.toml config file
    #[arg(short, long, default_value = "lacquer.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build all assets
    Build {
        /// Production profile: cleanup, minification, source maps, strict failures
        #[arg(long)]
        production: bool,
    },

    /// Watch sources and rebuild on change
    Watch {
        /// Production profile: minification, source maps, strict failures
        #[arg(long)]
        production: bool,

        /// Start the live-reload listener
        #[arg(long)]
        livereload: bool,

        /// Port for the live-reload listener
        #[arg(long, default_value = "35729")]
        port: u16,
    },

    /// Remove generated files from the output directories
    Clean,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command
    match cli.command {
        Commands::Build { production } => {
            commands::build::run(&cli.config, production)?;
        }
        Commands::Watch {
            production,
            livereload,
            port,
        } => {
            commands::watch::run(&cli.config, production, livereload, port).await?;
        }
        Commands::Clean => {
            commands::clean::run(&cli.config)?;
        }
    }

    Ok(())
}
