//! Reconciliation of expected debuginfo files against local state

use super::path::{BuildId, DebuginfoPath};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Looks for debuginfo files in the system debug store and the cache
#[derive(Debug, Clone)]
pub struct LocalResolver {
    system_root: PathBuf,
    cache_dir: PathBuf,
}

impl LocalResolver {
    /// Resolver over the real system debug store (`/`) and `cache_dir`
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            system_root: PathBuf::from("/"),
            cache_dir: cache_dir.into(),
        }
    }

    /// Look for the system debug store under `root` instead of `/`
    pub fn with_system_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.system_root = root.into();
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Whether the debuginfo file is present in either location
    pub fn is_present(&self, path: &DebuginfoPath) -> bool {
        let system = path.under(&self.system_root);
        if system.exists() {
            debug!("found: {}", system.display());
            return true;
        }
        let cached = path.under(&self.cache_dir);
        if cached.exists() {
            debug!("found: {}", cached.display());
            return true;
        }
        debug!("not found: {}", cached.display());
        false
    }

    /// Debuginfo paths of `build_ids` that exist neither locally nor in the cache
    ///
    /// Reads the filesystem on every call; nothing is remembered between passes.
    pub fn filter_missing(&self, build_ids: &HashSet<BuildId>) -> Vec<DebuginfoPath> {
        build_ids
            .iter()
            .map(BuildId::debuginfo_path)
            .filter(|path| !self.is_present(path))
            .collect()
    }
}
