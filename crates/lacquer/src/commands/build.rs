//! Full build command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use lacquer_pipeline::{Pipeline, PipelineConfig, Profile};
use serde::Deserialize;

/// Configuration file structure (lacquer.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    sources: SourcesConfig,
    #[serde(default)]
    destinations: DestinationsConfig,
}

#[derive(Debug, Deserialize)]
struct SourcesConfig {
    #[serde(default = "default_styles")]
    styles: String,
    #[serde(default = "default_templates")]
    templates: String,
    #[serde(default = "default_scripts")]
    scripts: String,
    #[serde(default = "default_bundle")]
    bundle: String,
}

#[derive(Debug, Deserialize)]
struct DestinationsConfig {
    #[serde(default = "default_css_out")]
    css: String,
    #[serde(default = "default_templates_out")]
    templates: String,
    #[serde(default = "default_js_out")]
    js: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            styles: default_styles(),
            templates: default_templates(),
            scripts: default_scripts(),
            bundle: default_bundle(),
        }
    }
}

impl Default for DestinationsConfig {
    fn default() -> Self {
        Self {
            css: default_css_out(),
            templates: default_templates_out(),
            js: default_js_out(),
        }
    }
}

fn default_styles() -> String {
    "src/styles".to_string()
}
fn default_templates() -> String {
    "src/templates".to_string()
}
fn default_scripts() -> String {
    "src/scripts".to_string()
}
fn default_bundle() -> String {
    "src/scripts/tutti".to_string()
}
fn default_css_out() -> String {
    "static/assets/css".to_string()
}
fn default_templates_out() -> String {
    "templates".to_string()
}
fn default_js_out() -> String {
    "static/assets/js/generated".to_string()
}

/// Load configuration from lacquer.toml if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let file = if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        config
    } else {
        ConfigFile::default()
    };

    Ok(PipelineConfig {
        styles_dir: PathBuf::from(&file.sources.styles),
        templates_dir: PathBuf::from(&file.sources.templates),
        scripts_dir: PathBuf::from(&file.sources.scripts),
        bundle_dir: PathBuf::from(&file.sources.bundle),
        css_out: PathBuf::from(&file.destinations.css),
        templates_out: PathBuf::from(&file.destinations.templates),
        js_out: PathBuf::from(&file.destinations.js),
    })
}

/// Run the build command.
pub fn run(config_path: &Path, production: bool) -> Result<()> {
    tracing::info!(
        "Building assets ({} profile)...",
        if production { "production" } else { "development" }
    );

    let config = load_config(config_path)?;
    let pipeline = Pipeline::new(config, Profile::new(production));

    let summary = pipeline.run_all()?;

    tracing::info!(
        "Built {} files ({} skipped, {} failed) in {}ms",
        summary.processed,
        summary.skipped,
        summary.failed,
        summary.duration_ms
    );

    Ok(())
}
