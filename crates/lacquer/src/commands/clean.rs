//! Cleanup command.

use std::path::Path;

use anyhow::Result;
use lacquer_pipeline::clean;

use super::build::load_config;

/// Run the clean command. Errors here are always fatal; a half-cleaned
/// output tree is worse than an unclean one.
pub fn run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    tracing::info!("Removing generated files from output directories...");
    clean::run(&config)?;

    Ok(())
}
