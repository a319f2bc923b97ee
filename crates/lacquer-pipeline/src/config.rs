//! Pipeline configuration.

use std::path::{Path, PathBuf};

/// Source roots and output destinations for the pipeline.
///
/// Each task owns a disjoint output directory, so tasks can run in parallel
/// without coordinating writes.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Source stylesheets (recursive)
    pub styles_dir: PathBuf,

    /// Source templates (recursive)
    pub templates_dir: PathBuf,

    /// Individual source scripts (top level only)
    pub scripts_dir: PathBuf,

    /// Scripts merged into the site-wide bundle (recursive)
    pub bundle_dir: PathBuf,

    /// Compiled CSS destination
    pub css_out: PathBuf,

    /// Compiled templates destination
    pub templates_out: PathBuf,

    /// Generated JS destination
    pub js_out: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            styles_dir: PathBuf::from("src/styles"),
            templates_dir: PathBuf::from("src/templates"),
            scripts_dir: PathBuf::from("src/scripts"),
            bundle_dir: PathBuf::from("src/scripts/tutti"),
            css_out: PathBuf::from("static/assets/css"),
            templates_out: PathBuf::from("templates"),
            js_out: PathBuf::from("static/assets/js/generated"),
        }
    }
}

impl PipelineConfig {
    /// All configured output directories, the set the cleanup task operates on.
    pub fn destinations(&self) -> [&Path; 3] {
        [&self.css_out, &self.templates_out, &self.js_out]
    }
}
