//! Acquisition plan: which packages to fetch for which missing files

use super::engine::RepoPackage;
use crate::debuginfo::DebuginfoPath;
use std::collections::BTreeMap;

/// Packages selected for download and the files nobody provides
///
/// Built once from the search results of a single locate pass and not
/// modified afterwards. Each package appears once, listing every requested
/// path it satisfies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquisitionPlan {
    packages: BTreeMap<RepoPackage, Vec<DebuginfoPath>>,
    not_found: Vec<DebuginfoPath>,
}

impl AcquisitionPlan {
    /// Build the plan from `(path, first provider)` pairs
    pub fn from_matches<I>(matches: I) -> Self
    where
        I: IntoIterator<Item = (DebuginfoPath, Option<RepoPackage>)>,
    {
        let (packages, not_found) = matches.into_iter().fold(
            (BTreeMap::<RepoPackage, Vec<DebuginfoPath>>::new(), Vec::new()),
            |(mut packages, mut not_found), (path, provider)| {
                match provider {
                    Some(package) => packages.entry(package).or_default().push(path),
                    None => not_found.push(path),
                }
                (packages, not_found)
            },
        );
        Self {
            packages,
            not_found,
        }
    }

    /// Selected packages with the requested paths each one provides
    pub fn packages(&self) -> impl Iterator<Item = (&RepoPackage, &[DebuginfoPath])> {
        self.packages
            .iter()
            .map(|(package, paths)| (package, paths.as_slice()))
    }

    /// Requested paths without any provider
    pub fn not_found(&self) -> &[DebuginfoPath] {
        &self.not_found
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Total bytes to download, each package counted once
    pub fn download_size(&self) -> u64 {
        self.packages.keys().map(|p| p.size).sum()
    }

    /// Total installed bytes, each package counted once
    pub fn installed_size(&self) -> u64 {
        self.packages.keys().map(|p| p.installed_size).sum()
    }
}
