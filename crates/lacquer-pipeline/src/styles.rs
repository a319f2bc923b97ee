//! Stylesheet compilation task.
//!
//! Compiles every sass stylesheet under the styles source root to compressed,
//! vendor-prefixed CSS in the css destination.

use std::fs;
use std::path::Path;

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use walkdir::WalkDir;

use crate::config::PipelineConfig;
use crate::profile::Switches;
use crate::runner::TaskReport;
use crate::sourcemap;

/// Errors from the style task.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("Failed to compile {path}: {message}")]
    Compile { path: String, message: String },

    #[error("Failed to post-process {path}: {message}")]
    PostProcess { path: String, message: String },

    #[error("Failed to write output: {0}")]
    Write(String),
}

/// Run the style task over every stylesheet in the source root.
///
/// Per-file errors are logged and skipped unless `strict`, in which case the
/// first error aborts the task.
pub fn run(config: &PipelineConfig, switches: &Switches) -> Result<TaskReport, StyleError> {
    fs::create_dir_all(&config.css_out).map_err(|e| StyleError::Write(e.to_string()))?;

    let mut report = TaskReport::default();

    for entry in WalkDir::new(&config.styles_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() || !is_stylesheet(path) {
            continue;
        }

        match compile_one(path, config, switches) {
            Ok(()) => report.processed += 1,
            Err(e) if switches.strict => return Err(e),
            Err(e) => {
                tracing::warn!("Style compile failed: {}", e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

fn is_stylesheet(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if ext != "sass" && ext != "scss" {
        return false;
    }

    // Underscore-prefixed partials are only ever @use'd from other sheets
    !path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("")
        .starts_with('_')
}

fn compile_one(
    path: &Path,
    config: &PipelineConfig,
    switches: &Switches,
) -> Result<(), StyleError> {
    let opts = grass::Options::default().style(grass::OutputStyle::Compressed);
    let css = grass::from_path(path, &opts).map_err(|e| StyleError::Compile {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let css = autoprefix(&css).map_err(|message| StyleError::PostProcess {
        path: path.display().to_string(),
        message,
    })?;

    let relative = path.strip_prefix(&config.styles_dir).unwrap_or(path);
    let out_path = config.css_out.join(relative).with_extension("css");

    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).map_err(|e| StyleError::Write(e.to_string()))?;
    }

    if switches.source_maps {
        let map_name = sourcemap::write_sibling(&out_path, &[path])
            .map_err(|e| StyleError::Write(e.to_string()))?;
        let trailer = sourcemap::css_trailer(&map_name);
        fs::write(&out_path, format!("{css}\n{trailer}"))
            .map_err(|e| StyleError::Write(e.to_string()))?;
    } else {
        fs::write(&out_path, css).map_err(|e| StyleError::Write(e.to_string()))?;
    }

    tracing::debug!("Compiled {}", out_path.display());

    Ok(())
}

/// Vendor-prefix and print the compiled CSS for the supported browser range.
fn autoprefix(css: &str) -> Result<String, String> {
    let stylesheet =
        StyleSheet::parse(css, ParserOptions::default()).map_err(|e| e.to_string())?;

    // Major versions covering the last three releases of each target browser
    let browsers = Browsers {
        chrome: Some(134 << 16),
        edge: Some(134 << 16),
        firefox: Some(136 << 16),
        safari: Some(17 << 16),
        ios_saf: Some(17 << 16),
        opera: Some(117 << 16),
        samsung: Some(27 << 16),
        ..Browsers::default()
    };

    let out = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            targets: Targets {
                browsers: Some(browsers),
                ..Targets::default()
            },
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;

    Ok(out.code)
}
