//! File watching.
//!
//! Registers a watch per source root and maps each change to the leaf task
//! that owns it. The watcher runs until the process is terminated.

use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

use crate::config::PipelineConfig;
use crate::runner::TaskKind;

/// Errors from setting up the watcher.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Failed to watch {path}: {message}")]
    Register { path: String, message: String },

    #[error("Failed to create watcher: {0}")]
    Create(String),
}

/// Watches the pipeline's source roots and reports which task to re-run.
pub struct PipelineWatcher {
    _watcher: RecommendedWatcher,
}

impl PipelineWatcher {
    /// Create a watcher over the configured source roots.
    ///
    /// Returns the watcher and a channel yielding the task to re-run for
    /// each (debounced) change.
    pub fn new(
        config: &PipelineConfig,
    ) -> Result<(Self, async_mpsc::Receiver<TaskKind>), WatchError> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(|e| WatchError::Create(e.to_string()))?;

        // scripts_dir covers the bundle directory nested under it
        let roots = [&config.styles_dir, &config.templates_dir, &config.scripts_dir];
        for root in roots {
            if root.exists() {
                watcher
                    .watch(root, RecursiveMode::Recursive)
                    .map_err(|e| WatchError::Register {
                        path: root.display().to_string(),
                        message: e.to_string(),
                    })?;
            }
        }

        // Forward events, debounced, classified to the owning task. Changes
        // landing inside the same window are coalesced into one run per
        // affected task, never dropped.
        let config = config.clone();
        std::thread::spawn(move || {
            let debounce_duration = Duration::from_millis(100);

            while let Ok(event) = sync_rx.recv() {
                let mut pending = Vec::new();
                collect_tasks(&event, &config, &mut pending);

                // The window stays open while events keep arriving
                while let Ok(event) = sync_rx.recv_timeout(debounce_duration) {
                    collect_tasks(&event, &config, &mut pending);
                }

                for kind in pending {
                    let _ = async_tx.blocking_send(kind);
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

/// Classify every path in `event` and record each affected task once.
fn collect_tasks(event: &notify::Event, config: &PipelineConfig, pending: &mut Vec<TaskKind>) {
    if !matches!(
        event.kind,
        notify::EventKind::Create(_) | notify::EventKind::Modify(_) | notify::EventKind::Remove(_)
    ) {
        return;
    }

    for path in &event.paths {
        if let Some(kind) = classify(path, config) {
            if !pending.contains(&kind) {
                pending.push(kind);
            }
        }
    }
}

/// Map a changed path to the leaf task that owns it.
fn classify(path: &Path, config: &PipelineConfig) -> Option<TaskKind> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    if path.starts_with(&config.bundle_dir) {
        return (ext == "js").then_some(TaskKind::Bundle);
    }

    if path.starts_with(&config.scripts_dir) {
        // Individual scripts are top level only
        return (ext == "js" && path.parent() == Some(config.scripts_dir.as_path()))
            .then_some(TaskKind::Scripts);
    }

    if path.starts_with(&config.styles_dir) {
        return (ext == "sass" || ext == "scss").then_some(TaskKind::Styles);
    }

    if path.starts_with(&config.templates_dir) {
        return (ext == "jinja").then_some(TaskKind::Templates);
    }

    None
}
