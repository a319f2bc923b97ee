//! Watch command.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use lacquer_pipeline::livereload::{self, ReloadHub, ReloadMessage};
use lacquer_pipeline::watch::PipelineWatcher;
use lacquer_pipeline::{Pipeline, Profile};

use super::build::load_config;

/// Run the watch command: rebuild the owning task for every source change,
/// until the process is terminated.
pub async fn run(
    config_path: &Path,
    production: bool,
    enable_livereload: bool,
    port: u16,
) -> Result<()> {
    let config = load_config(config_path)?;
    let pipeline = Arc::new(Pipeline::new(config, Profile::new(production)));

    // Only listen for live reloads when asked to
    let hub = if enable_livereload {
        let hub = ReloadHub::new();
        let listener = hub.clone();
        tokio::spawn(async move {
            if let Err(e) = livereload::serve(listener, port).await {
                tracing::error!("Live-reload listener failed: {}", e);
            }
        });
        Some(hub)
    } else {
        None
    };

    let (watcher, mut rx) = PipelineWatcher::new(pipeline.config())?;
    tracing::info!("Watching for changes...");

    while let Some(kind) = rx.recv().await {
        tracing::info!("Change detected, running {}", kind.name());

        match pipeline.run_task(kind) {
            Ok(_report) => {
                if let Some(hub) = &hub {
                    hub.send(ReloadMessage::Reload);
                }
            }
            Err(e) => {
                tracing::error!("{} failed: {}", kind.name(), e);
            }
        }
    }

    drop(watcher);

    Ok(())
}
