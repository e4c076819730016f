//! Configuration schema for debuginfo-install
//!
//! Configuration is stored at `~/.config/debuginfo-install/config.toml`.
//! Every key is optional; command line flags win over the file.

use crate::repo::DEFAULT_REPO_PATTERN;
use crate::tools::ToolCommand;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default directory debuginfo files are cached in
pub const DEFAULT_CACHE_DIR: &str = "/var/cache/abrt-di";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where debuginfo files are looked up and stored
    pub store: StoreConfig,

    /// Download behavior
    pub download: DownloadConfig,

    /// Repository selection
    pub repo: RepoConfig,

    /// External programs
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Cache directory packages are extracted into
    pub cache_dir: PathBuf,

    /// Root of the system debug store (`/usr/lib/debug` lives below it)
    pub system_root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            system_root: PathBuf::from("/"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Keep downloaded packages after extraction
    pub keep_packages: bool,

    /// Directory the per-run working directory is created in
    pub tmp_base: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            keep_packages: false,
            tmp_base: std::env::temp_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Package manager used to query repositories
    pub program: ToolCommand,

    /// Repositories whose id contains this are searched, others disabled
    pub pattern: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            program: ToolCommand::new("dnf"),
            pattern: DEFAULT_REPO_PATTERN.to_string(),
        }
    }
}

/// Programs used to inspect cores and unpack packages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub unstrip: ToolCommand,
    pub rpm2cpio: ToolCommand,
    pub cpio: ToolCommand,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            unstrip: ToolCommand::new("eu-unstrip"),
            rpm2cpio: ToolCommand::new("rpm2cpio"),
            cpio: ToolCommand::new("cpio"),
        }
    }
}
