//! Script tasks: individual minified scripts and the site-wide bundle.

use std::fs;
use std::path::{Path, PathBuf};

use minify_js::{minify, Session, TopLevelMode};
use walkdir::WalkDir;

use crate::cache::BuildCache;
use crate::config::PipelineConfig;
use crate::profile::Switches;
use crate::runner::TaskReport;
use crate::sourcemap;

/// Name of the concatenated site-wide bundle.
pub const BUNDLE_NAME: &str = "tutti.min.js";

/// Errors from the script tasks.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to minify {path}: {message}")]
    Minify { path: String, message: String },

    #[error("Failed to write output: {0}")]
    Write(String),
}

/// Run the individual-scripts task: every top-level `.js` file in the scripts
/// source directory becomes a `.min.js` output. Unchanged files (per `cache`)
/// are skipped.
pub fn run_individual(
    config: &PipelineConfig,
    switches: &Switches,
    cache: &BuildCache,
) -> Result<TaskReport, ScriptError> {
    fs::create_dir_all(&config.js_out).map_err(|e| ScriptError::Write(e.to_string()))?;

    let mut report = TaskReport::default();

    // Top level only; subdirectories like tutti/ belong to the bundle task
    let entries = match fs::read_dir(&config.scripts_dir) {
        Ok(entries) => entries,
        Err(e) => {
            let err = ScriptError::Read {
                path: config.scripts_dir.display().to_string(),
                message: e.to_string(),
            };
            if switches.strict {
                return Err(err);
            }
            tracing::warn!("Script task skipped: {}", err);
            return Ok(report);
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("js"))
        .collect();
    files.sort();

    for path in files {
        match minify_one(&path, config, switches, cache) {
            Ok(true) => report.processed += 1,
            Ok(false) => report.skipped += 1,
            Err(e) if switches.strict => return Err(e),
            Err(e) => {
                tracing::warn!("Script processing failed: {}", e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Run the bundle task: concatenate every script under the bundle source
/// root, in directory-traversal order, into a single [`BUNDLE_NAME`] output.
///
/// The bundle is loaded on every page, so only code needed site-wide belongs
/// under the bundle source root.
pub fn run_bundle(config: &PipelineConfig, switches: &Switches) -> Result<TaskReport, ScriptError> {
    fs::create_dir_all(&config.js_out).map_err(|e| ScriptError::Write(e.to_string()))?;

    let mut report = TaskReport::default();
    let mut bundle = String::new();
    let mut sources: Vec<PathBuf> = Vec::new();

    for entry in WalkDir::new(&config.bundle_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("js") {
            continue;
        }

        match fs::read_to_string(path) {
            Ok(source) => {
                bundle.push_str(&source);
                if !source.ends_with('\n') {
                    bundle.push('\n');
                }
                sources.push(path.to_path_buf());
            }
            Err(e) => {
                let err = ScriptError::Read {
                    path: path.display().to_string(),
                    message: e.to_string(),
                };
                if switches.strict {
                    return Err(err);
                }
                tracing::warn!("Bundle input skipped: {}", err);
                report.failed += 1;
            }
        }
    }

    if sources.is_empty() {
        return Ok(report);
    }

    // Minification only runs in production, where errors are fatal anyway
    let code = if switches.minify {
        minify_source(&bundle, BUNDLE_NAME)?
    } else {
        bundle
    };

    let out_path = config.js_out.join(BUNDLE_NAME);
    let source_refs: Vec<&Path> = sources.iter().map(|p| p.as_path()).collect();
    write_output(&out_path, &code, &source_refs, switches)?;

    report.processed += 1;

    Ok(report)
}

/// Minify, rename and write a single script. Returns false on a cache hit.
fn minify_one(
    path: &Path,
    config: &PipelineConfig,
    switches: &Switches,
    cache: &BuildCache,
) -> Result<bool, ScriptError> {
    let source = fs::read_to_string(path).map_err(|e| ScriptError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    if cache.is_fresh(path, source.as_bytes()) {
        tracing::debug!("Unchanged, skipping {}", path.display());
        return Ok(false);
    }

    let code = if switches.minify {
        minify_source(&source, &path.display().to_string())?
    } else {
        source
    };

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("script");
    let out_path = config.js_out.join(format!("{stem}.min.js"));

    write_output(&out_path, &code, &[path], switches)?;

    tracing::debug!("Wrote {}", out_path.display());

    Ok(true)
}

/// Write a script output with its optional map sibling and permissions.
fn write_output(
    out_path: &Path,
    code: &str,
    sources: &[&Path],
    switches: &Switches,
) -> Result<(), ScriptError> {
    if switches.source_maps {
        let map_name = sourcemap::write_sibling(out_path, sources)
            .map_err(|e| ScriptError::Write(e.to_string()))?;
        let trailer = sourcemap::js_trailer(&map_name);
        fs::write(out_path, format!("{code}\n{trailer}\n"))
            .map_err(|e| ScriptError::Write(e.to_string()))?;
    } else {
        fs::write(out_path, code).map_err(|e| ScriptError::Write(e.to_string()))?;
    }

    if switches.restrict_permissions {
        restrict_permissions(out_path)?;
    }

    Ok(())
}

/// Owner read/write, group/other read.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), ScriptError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o644))
        .map_err(|e| ScriptError::Write(e.to_string()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), ScriptError> {
    Ok(())
}

fn minify_source(source: &str, label: &str) -> Result<String, ScriptError> {
    let session = Session::new();
    let mut out = Vec::new();

    minify(&session, TopLevelMode::Global, source.as_bytes(), &mut out).map_err(|e| {
        ScriptError::Minify {
            path: label.to_string(),
            message: format!("{e:?}"),
        }
    })?;

    String::from_utf8(out).map_err(|e| ScriptError::Minify {
        path: label.to_string(),
        message: e.to_string(),
    })
}
