//! Template compilation task.
//!
//! Compile-checks every jinja template under the templates source root and
//! emits it into the templates destination, pretty in development and
//! whitespace-compacted in production. Unchanged inputs are skipped via the
//! pipeline's build cache.

use std::fs;
use std::path::Path;

use minijinja::Environment;
use walkdir::WalkDir;

use crate::cache::BuildCache;
use crate::config::PipelineConfig;
use crate::profile::Switches;
use crate::runner::TaskReport;

/// Errors from the template task.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to compile {path}: {message}")]
    Compile { path: String, message: String },

    #[error("Failed to write output: {0}")]
    Write(String),
}

/// Run the template task. Unchanged files (per `cache`) are not reprocessed.
pub fn run(
    config: &PipelineConfig,
    switches: &Switches,
    cache: &BuildCache,
) -> Result<TaskReport, TemplateError> {
    fs::create_dir_all(&config.templates_out).map_err(|e| TemplateError::Write(e.to_string()))?;

    let mut report = TaskReport::default();

    for entry in WalkDir::new(&config.templates_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !path.is_file() || ext != "jinja" {
            continue;
        }

        match compile_one(path, config, switches, cache) {
            Ok(true) => report.processed += 1,
            Ok(false) => report.skipped += 1,
            Err(e) if switches.strict => return Err(e),
            Err(e) => {
                tracing::warn!("Template compile failed: {}", e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Compile a single template. Returns false when the cache reported the
/// content unchanged.
fn compile_one(
    path: &Path,
    config: &PipelineConfig,
    switches: &Switches,
    cache: &BuildCache,
) -> Result<bool, TemplateError> {
    let source = fs::read_to_string(path).map_err(|e| TemplateError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    if cache.is_fresh(path, source.as_bytes()) {
        tracing::debug!("Unchanged, skipping {}", path.display());
        return Ok(false);
    }

    check_syntax(path, &source)?;

    let output = if switches.pretty_templates {
        source
    } else {
        compact(&source)
    };

    let relative = path.strip_prefix(&config.templates_dir).unwrap_or(path);
    let out_path = config.templates_out.join(relative).with_extension("html");

    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).map_err(|e| TemplateError::Write(e.to_string()))?;
    }

    fs::write(&out_path, output).map_err(|e| TemplateError::Write(e.to_string()))?;

    tracing::debug!("Compiled {}", out_path.display());

    Ok(true)
}

/// Validate template syntax by compiling the source with minijinja.
fn check_syntax(path: &Path, source: &str) -> Result<(), TemplateError> {
    let name = path.display().to_string();
    let compile_err = |e: minijinja::Error| TemplateError::Compile {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut env = Environment::new();
    env.add_template_owned(name.clone(), source.to_string())
        .map_err(compile_err)?;
    env.get_template(&name).map_err(compile_err)?;

    Ok(())
}

/// Strip indentation and blank lines for compact production output.
fn compact(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        out.push_str(trimmed);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;
    use tempfile::tempdir;

    const TEMPLATE: &str = "<ul>\n  {% for item in items %}\n  <li>{{ item }}</li>\n  {% endfor %}\n</ul>\n";

    fn config_in(root: &Path) -> PipelineConfig {
        PipelineConfig {
            templates_dir: root.join("src/templates"),
            templates_out: root.join("out/templates"),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn compiles_templates_preserving_source_in_development() {
        let temp = tempdir().unwrap();
        let config = config_in(temp.path());
        fs::create_dir_all(&config.templates_dir).unwrap();
        fs::write(config.templates_dir.join("list.jinja"), TEMPLATE).unwrap();

        let cache = BuildCache::new();
        let report = run(&config, &Profile::new(false).switches(), &cache).unwrap();

        assert_eq!(report.processed, 1);
        let out = fs::read_to_string(config.templates_out.join("list.html")).unwrap();
        assert_eq!(out, TEMPLATE);
    }

    #[test]
    fn production_output_is_compacted() {
        let temp = tempdir().unwrap();
        let config = config_in(temp.path());
        fs::create_dir_all(&config.templates_dir).unwrap();
        fs::write(config.templates_dir.join("list.jinja"), TEMPLATE).unwrap();

        let cache = BuildCache::new();
        run(&config, &Profile::new(true).switches(), &cache).unwrap();

        let out = fs::read_to_string(config.templates_out.join("list.html")).unwrap();
        assert!(out.len() < TEMPLATE.len());
        assert!(!out.contains("  "));
        assert!(out.contains("{% for item in items %}"));
    }

    #[test]
    fn second_run_skips_unchanged_inputs() {
        let temp = tempdir().unwrap();
        let config = config_in(temp.path());
        fs::create_dir_all(&config.templates_dir).unwrap();
        fs::write(config.templates_dir.join("list.jinja"), TEMPLATE).unwrap();

        let cache = BuildCache::new();
        let switches = Profile::new(false).switches();

        let first = run(&config, &switches, &cache).unwrap();
        assert_eq!((first.processed, first.skipped), (1, 0));

        let second = run(&config, &switches, &cache).unwrap();
        assert_eq!((second.processed, second.skipped), (0, 1));
    }

    #[test]
    fn changed_content_recompiles() {
        let temp = tempdir().unwrap();
        let config = config_in(temp.path());
        fs::create_dir_all(&config.templates_dir).unwrap();
        let input = config.templates_dir.join("list.jinja");
        fs::write(&input, TEMPLATE).unwrap();

        let cache = BuildCache::new();
        let switches = Profile::new(false).switches();

        run(&config, &switches, &cache).unwrap();
        fs::write(&input, "<p>{{ changed }}</p>\n").unwrap();

        let report = run(&config, &switches, &cache).unwrap();
        assert_eq!((report.processed, report.skipped), (1, 0));
    }

    #[test]
    fn syntax_errors_fail_soft_in_development() {
        let temp = tempdir().unwrap();
        let config = config_in(temp.path());
        fs::create_dir_all(&config.templates_dir).unwrap();
        fs::write(
            config.templates_dir.join("bad.jinja"),
            "{% for item in items %}\n",
        )
        .unwrap();

        let cache = BuildCache::new();
        let report = run(&config, &Profile::new(false).switches(), &cache).unwrap();

        assert_eq!(report.failed, 1);
        assert!(!config.templates_out.join("bad.html").exists());
    }
}
