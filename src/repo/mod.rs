//! Repository access
//!
//! - `engine`: the contract required of the package manager
//! - `dnf`: that contract implemented on top of the dnf CLI
//! - `locate`: mapping missing files to providing packages
//! - `plan`: the resulting download plan

mod dnf;
mod engine;
mod locate;
mod plan;

pub use dnf::{parse_query_rows, parse_repolist, DnfEngine};
pub use engine::{MetadataPolicy, ProgressFn, Repo, RepoEngine, RepoPackage};
pub use locate::{PackageLocator, DEFAULT_REPO_PATTERN};
pub use plan::AcquisitionPlan;

#[cfg(test)]
pub(crate) use locate::mock::MockEngine;
