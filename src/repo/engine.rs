//! Repository engine abstraction
//!
//! The package search, metadata handling and transport belong to the
//! system's package manager. This trait is the narrow surface the pipeline
//! needs from it, so the real backend can be swapped for a mock in tests.

use crate::error::DebuginfoResult;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;

/// A configured package repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    /// Repository id (e.g. "fedora-debuginfo")
    pub id: String,
    /// Whether the repository is currently enabled
    pub enabled: bool,
}

/// How metadata may be refreshed before searching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataPolicy {
    /// Use cached metadata, fetching only what is missing or expired
    PreferCache,
    /// Never touch the network
    CacheOnly,
}

/// Package located in repository metadata
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoPackage {
    pub name: String,
    pub epoch: u32,
    pub version: String,
    pub release: String,
    pub arch: String,
    /// Download size in bytes
    pub size: u64,
    /// Installed size in bytes
    pub installed_size: u64,
    /// Location relative to the repository base URL
    pub location: String,
    /// Id of the repository providing the package
    pub repo_id: String,
}

impl RepoPackage {
    /// `name-version-release.arch`, without the epoch
    pub fn nvra(&self) -> String {
        format!(
            "{}-{}-{}.{}",
            self.name, self.version, self.release, self.arch
        )
    }

    /// `name-epoch:version-release.arch`, as accepted by package queries
    pub fn nevra(&self) -> String {
        format!(
            "{}-{}:{}-{}.{}",
            self.name, self.epoch, self.version, self.release, self.arch
        )
    }

    /// File name the package is stored under once downloaded
    pub fn file_name(&self) -> String {
        match self.location.rsplit('/').next() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{}.rpm", self.nvra()),
        }
    }
}

impl fmt::Display for RepoPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch == 0 {
            f.write_str(&self.nvra())
        } else {
            f.write_str(&self.nevra())
        }
    }
}

/// Byte counts reported while a package body is transferred
pub type ProgressFn<'a> = &'a mut (dyn FnMut(u64, Option<u64>) + Send);

/// Operations required of the package manager backend
#[async_trait]
pub trait RepoEngine: Send + Sync {
    /// List all configured repositories
    async fn repos(&self) -> DebuginfoResult<Vec<Repo>>;

    /// Exclude a repository from subsequent operations
    async fn disable_repo(&self, id: &str) -> DebuginfoResult<()>;

    /// Include a repository, optionally tolerating it being unreachable
    async fn enable_repo(&self, id: &str, skip_if_unavailable: bool) -> DebuginfoResult<()>;

    /// Load package and file-list metadata of the enabled repositories
    async fn populate_metadata(&self, policy: MetadataPolicy) -> DebuginfoResult<()>;

    /// Packages providing `path`, in index order
    async fn search_file(&self, path: &Path) -> DebuginfoResult<Vec<RepoPackage>>;

    /// Download `package` to `dest`, reporting transferred bytes
    async fn download(
        &self,
        package: &RepoPackage,
        dest: &Path,
        progress: ProgressFn<'_>,
    ) -> DebuginfoResult<()>;

    /// Human-readable backend name
    fn engine_name(&self) -> &'static str;
}
