//! Per-run state shared by the pipeline stages

use crate::cleanup::WorkDir;
use crate::config::ToolsConfig;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Options and shared handles of one invocation
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Long-lived directory debuginfo files are extracted into
    pub cache_dir: PathBuf,
    /// Root the system debug store is looked up under
    pub system_root: PathBuf,
    /// Keep downloaded packages and the working directory
    pub keep_packages: bool,
    pub verbosity: u8,
    /// Never ask before downloading
    pub auto_yes: bool,
    pub tools: ToolsConfig,
    pub workdir: Arc<WorkDir>,
    /// Raised when a termination signal arrives
    pub cancel: Arc<AtomicBool>,
}

impl RunContext {
    pub fn new(cache_dir: impl Into<PathBuf>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            system_root: PathBuf::from("/"),
            keep_packages: false,
            verbosity: 0,
            auto_yes: false,
            tools: ToolsConfig::default(),
            workdir: Arc::new(WorkDir::new(workdir)),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Raise the cancel flag seen by blocking transfers
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}
