//! Unchanged-file cache.
//!
//! Lets long-lived watch sessions skip recompiling files whose content has
//! not changed since the previous run. The cache lives for the process
//! lifetime and is owned by the pipeline, not stored as module state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Content-identity cache keyed by file path.
#[derive(Debug, Default)]
pub struct BuildCache {
    seen: Mutex<HashMap<PathBuf, blake3::Hash>>,
}

impl BuildCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `content` for `path` and report whether it is unchanged since
    /// the last call. A path seen for the first time is never fresh.
    pub fn is_fresh(&self, path: &Path, content: &[u8]) -> bool {
        let hash = blake3::hash(content);
        let mut seen = self.seen.lock().unwrap();
        match seen.insert(path.to_path_buf(), hash) {
            Some(previous) => previous == hash,
            None => false,
        }
    }

    /// Forget everything; the next run recompiles all inputs.
    pub fn reset(&self) {
        self.seen.lock().unwrap().clear();
    }
}
