//! Locating the packages that provide missing debuginfo files

use super::engine::{MetadataPolicy, RepoEngine};
use super::plan::AcquisitionPlan;
use crate::debuginfo::DebuginfoPath;
use crate::error::DebuginfoResult;
use crate::ui::{TaskSpinner, UiContext};
use tracing::{debug, info};

/// Default substring identifying debuginfo repositories
pub const DEFAULT_REPO_PATTERN: &str = "debuginfo";

/// Maps missing debuginfo paths to providing packages
pub struct PackageLocator<'a> {
    engine: &'a dyn RepoEngine,
    pattern: &'a str,
}

impl<'a> PackageLocator<'a> {
    /// Create a locator searching repositories whose id contains `pattern`
    pub fn new(engine: &'a dyn RepoEngine, pattern: &'a str) -> Self {
        Self { engine, pattern }
    }

    /// Restrict the engine to debuginfo repositories
    ///
    /// Returns the ids of the repositories left enabled.
    pub async fn select_repos(&self) -> DebuginfoResult<Vec<String>> {
        let mut selected = Vec::new();
        for repo in self.engine.repos().await? {
            if repo.id.contains(self.pattern) {
                self.engine.enable_repo(&repo.id, true).await?;
                info!("enabled repo {}", repo.id);
                selected.push(repo.id);
            } else if repo.enabled {
                self.engine.disable_repo(&repo.id).await?;
                debug!("disabled repo {}", repo.id);
            }
        }
        Ok(selected)
    }

    /// Find a provider for every path in `paths`
    ///
    /// When several packages provide the same file the first one reported
    /// by the engine is used.
    pub async fn locate(
        &self,
        ui: &UiContext,
        paths: &[DebuginfoPath],
    ) -> DebuginfoResult<AcquisitionPlan> {
        self.select_repos().await?;

        // Metadata loading talks to remote mirrors and can take minutes
        let mut spinner = TaskSpinner::new(ui);
        spinner.start("Looking for needed packages in repositories");
        if let Err(e) = self.engine.populate_metadata(MetadataPolicy::PreferCache).await {
            spinner.stop_error("Loading repository metadata failed");
            return Err(e);
        }

        let mut matches = Vec::with_capacity(paths.len());
        for path in paths {
            debug!("looking for provider of {}", path);
            let provider = match self.engine.search_file(path.as_path()).await {
                Ok(found) => found.into_iter().next(),
                Err(e) => {
                    spinner.stop_error("Searching repository metadata failed");
                    return Err(e);
                }
            };
            match &provider {
                Some(package) => debug!("found pkg for {}: {}", path, package),
                None => debug!("not found pkg for {}", path),
            }
            matches.push((path.clone(), provider));
        }

        let plan = AcquisitionPlan::from_matches(matches);
        spinner.stop(&format!(
            "Searched repository metadata for {} files",
            paths.len()
        ));
        Ok(plan)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory engine shared by the pipeline tests

    use super::super::engine::{ProgressFn, Repo, RepoPackage};
    use super::*;
    use crate::error::DebuginfoError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct MockEngine {
        pub repos: Mutex<Vec<Repo>>,
        pub skip_if_unavailable: Mutex<Vec<String>>,
        pub index: HashMap<PathBuf, Vec<RepoPackage>>,
        pub failing_downloads: Vec<String>,
        pub downloads: Mutex<Vec<String>>,
        pub populated: Mutex<Vec<MetadataPolicy>>,
    }

    impl MockEngine {
        pub(crate) fn provide(mut self, path: &DebuginfoPath, package: RepoPackage) -> Self {
            self.index
                .entry(path.as_path().to_path_buf())
                .or_default()
                .push(package);
            self
        }

        pub(crate) fn downloaded(&self) -> Vec<String> {
            self.downloads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RepoEngine for MockEngine {
        async fn repos(&self) -> DebuginfoResult<Vec<Repo>> {
            Ok(self.repos.lock().unwrap().clone())
        }

        async fn disable_repo(&self, id: &str) -> DebuginfoResult<()> {
            for repo in self.repos.lock().unwrap().iter_mut().filter(|r| r.id == id) {
                repo.enabled = false;
            }
            Ok(())
        }

        async fn enable_repo(&self, id: &str, skip_if_unavailable: bool) -> DebuginfoResult<()> {
            for repo in self.repos.lock().unwrap().iter_mut().filter(|r| r.id == id) {
                repo.enabled = true;
            }
            if skip_if_unavailable {
                self.skip_if_unavailable.lock().unwrap().push(id.to_string());
            }
            Ok(())
        }

        async fn populate_metadata(&self, policy: MetadataPolicy) -> DebuginfoResult<()> {
            self.populated.lock().unwrap().push(policy);
            Ok(())
        }

        async fn search_file(&self, path: &Path) -> DebuginfoResult<Vec<RepoPackage>> {
            Ok(self.index.get(path).cloned().unwrap_or_default())
        }

        async fn download(
            &self,
            package: &RepoPackage,
            dest: &Path,
            progress: ProgressFn<'_>,
        ) -> DebuginfoResult<()> {
            self.downloads.lock().unwrap().push(package.name.clone());
            if self.failing_downloads.contains(&package.name) {
                return Err(DebuginfoError::Download {
                    package: package.to_string(),
                    reason: "mirror returned 404".to_string(),
                });
            }
            progress(0, Some(package.size));
            std::fs::write(dest, package.name.as_bytes())
                .map_err(|e| DebuginfoError::io("writing mock package", e))?;
            progress(package.size, Some(package.size));
            Ok(())
        }

        fn engine_name(&self) -> &'static str {
            "mock"
        }
    }
}
