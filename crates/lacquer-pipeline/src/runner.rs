//! Pipeline orchestration.
//!
//! Owns the configuration, the resolved profile switches and the
//! unchanged-file caches, and runs the leaf tasks either individually (from
//! the watcher) or all at once. When cleanup is enabled it fully completes
//! before any leaf task starts; the leaf tasks themselves run in parallel
//! with no mutual ordering.

use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;

use crate::cache::BuildCache;
use crate::clean::{self, CleanError};
use crate::config::PipelineConfig;
use crate::profile::{Profile, Switches};
use crate::scripts::{self, ScriptError};
use crate::styles::{self, StyleError};
use crate::templates::{self, TemplateError};

/// The four leaf tasks of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Styles,
    Templates,
    Scripts,
    Bundle,
}

impl TaskKind {
    pub const ALL: [TaskKind; 4] = [
        TaskKind::Styles,
        TaskKind::Templates,
        TaskKind::Scripts,
        TaskKind::Bundle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Styles => "styles",
            TaskKind::Templates => "templates",
            TaskKind::Scripts => "scripts",
            TaskKind::Bundle => "scripts_tutti",
        }
    }
}

/// Per-task outcome counts. In fail-soft mode failures are counted here
/// instead of aborting the task.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaskReport {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Aggregate outcome of a full build.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuildSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Clean(#[from] CleanError),
}

/// The build pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    switches: Switches,
    root: PathBuf,
    template_cache: BuildCache,
    script_cache: BuildCache,
}

impl Pipeline {
    /// Create a pipeline for the given configuration and profile.
    pub fn new(config: PipelineConfig, profile: Profile) -> Self {
        Self {
            config,
            switches: profile.switches(),
            root: PathBuf::from("."),
            template_cache: BuildCache::new(),
            script_cache: BuildCache::new(),
        }
    }

    /// Set the project root the cleanup task runs git from.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn switches(&self) -> &Switches {
        &self.switches
    }

    /// Drop all unchanged-file cache state; the next run recompiles
    /// everything.
    pub fn reset_caches(&self) {
        self.template_cache.reset();
        self.script_cache.reset();
    }

    /// Run a single leaf task.
    pub fn run_task(&self, kind: TaskKind) -> Result<TaskReport, PipelineError> {
        let report = match kind {
            TaskKind::Styles => styles::run(&self.config, &self.switches)?,
            TaskKind::Templates => {
                templates::run(&self.config, &self.switches, &self.template_cache)?
            }
            TaskKind::Scripts => {
                scripts::run_individual(&self.config, &self.switches, &self.script_cache)?
            }
            TaskKind::Bundle => scripts::run_bundle(&self.config, &self.switches)?,
        };

        tracing::info!(
            "{}: {} processed, {} skipped, {} failed",
            kind.name(),
            report.processed,
            report.skipped,
            report.failed
        );

        Ok(report)
    }

    /// Run the cleanup task (when the profile enables it) followed by all
    /// four leaf tasks in parallel.
    pub fn run_all(&self) -> Result<BuildSummary, PipelineError> {
        let start = Instant::now();

        if self.switches.cleanup {
            // Must fully complete before any leaf task writes output
            clean::run_in(&self.config, &self.root)?;
        }

        let results: Vec<Result<TaskReport, PipelineError>> = TaskKind::ALL
            .par_iter()
            .map(|kind| self.run_task(*kind))
            .collect();

        let mut summary = BuildSummary::default();
        for result in results {
            let report = result?;
            summary.processed += report.processed;
            summary.skipped += report.skipped;
            summary.failed += report.failed;
        }
        summary.duration_ms = start.elapsed().as_millis() as u64;

        Ok(summary)
    }
}
