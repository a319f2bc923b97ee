//! Output cleanup task.
//!
//! Deletes generated files from the output directories by delegating to
//! `git clean` restricted to ignored files, so tracked and untracked-but-new
//! files survive. Cleanup errors are always fatal: a half-cleaned output tree
//! risks serving stale generated assets.

use std::path::Path;
use std::process::Command;

use crate::config::PipelineConfig;

/// Errors from the cleanup task. Never demoted to fail-soft.
#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    #[error("Failed to run git clean: {0}")]
    Spawn(String),

    #[error("git clean failed: {0}")]
    Failed(String),
}

/// Remove ignored (generated) files from every configured output directory.
pub fn run(config: &PipelineConfig) -> Result<(), CleanError> {
    run_in(config, Path::new("."))
}

/// Like [`run`], with an explicit working directory for the git invocation.
pub fn run_in(config: &PipelineConfig, workdir: &Path) -> Result<(), CleanError> {
    let mut cmd = Command::new("git");
    cmd.current_dir(workdir).arg("clean").arg("-f").arg("-X");

    // Always pass every destination: git quietly skips pathspecs that do
    // not exist, while an empty pathspec would sweep ignored files across
    // the whole repository.
    for dest in config.destinations() {
        cmd.arg(dest);
    }

    let output = cmd.output().map_err(|e| CleanError::Spawn(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(CleanError::Failed(stderr));
    }

    let removed = String::from_utf8_lossy(&output.stdout);
    for line in removed.lines() {
        tracing::info!("{}", line);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn git(workdir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .current_dir(workdir)
            .args(args)
            .status()
            .unwrap();
        assert!(status.success());
    }

    #[test]
    fn removes_only_ignored_files() {
        let temp = tempdir().unwrap();
        let root = temp.path();

        git(root, &["init", "-q"]);
        fs::write(root.join(".gitignore"), "*.css\n").unwrap();
        fs::create_dir_all(root.join("out/css")).unwrap();
        fs::write(root.join("out/css/.gitkeep"), "").unwrap();
        fs::write(root.join("out/css/stale.css"), "body{}").unwrap();
        fs::create_dir_all(root.join("out/js")).unwrap();
        fs::write(root.join("out/js/kept.js"), "var a;").unwrap();
        // Staged files count as tracked for git clean
        git(root, &["add", ".gitignore", "out/css/.gitkeep"]);

        let config = PipelineConfig {
            css_out: "out/css".into(),
            templates_out: "out/templates".into(),
            js_out: "out/js".into(),
            ..PipelineConfig::default()
        };

        run_in(&config, root).unwrap();

        // Ignored file is gone; untracked-but-not-ignored file stays
        assert!(!root.join("out/css/stale.css").exists());
        assert!(root.join("out/js/kept.js").exists());
    }

    #[test]
    fn missing_destinations_leave_the_rest_of_the_repo_alone() {
        let temp = tempdir().unwrap();
        let root = temp.path();

        git(root, &["init", "-q"]);
        fs::write(root.join(".gitignore"), ".env\n").unwrap();
        fs::write(root.join(".env"), "SECRET=1").unwrap();
        git(root, &["add", ".gitignore"]);

        // None of the output directories exist yet (fresh checkout)
        let config = PipelineConfig {
            css_out: "out/css".into(),
            templates_out: "out/templates".into(),
            js_out: "out/js".into(),
            ..PipelineConfig::default()
        };

        run_in(&config, root).unwrap();

        assert!(root.join(".env").exists());
    }

    #[test]
    fn failure_outside_a_repository_is_fatal() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("out/css")).unwrap();

        let config = PipelineConfig {
            css_out: "out/css".into(),
            templates_out: "out/templates".into(),
            js_out: "out/js".into(),
            ..PipelineConfig::default()
        };

        let result = run_in(&config, temp.path());

        assert!(matches!(result, Err(CleanError::Failed(_))));
    }
}
