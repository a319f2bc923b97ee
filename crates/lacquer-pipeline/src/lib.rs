//! Static asset build pipeline for lacquer.
//!
//! Turns a directory of source assets (sass stylesheets, jinja templates,
//! scripts) into deployable output files under a development or production
//! build profile.

pub mod cache;
pub mod clean;
pub mod config;
pub mod livereload;
pub mod profile;
pub mod runner;
pub mod scripts;
pub mod sourcemap;
pub mod styles;
pub mod templates;
pub mod watch;

pub use config::PipelineConfig;
pub use profile::{Profile, Switches};
pub use runner::{BuildSummary, Pipeline, PipelineError, TaskKind, TaskReport};
