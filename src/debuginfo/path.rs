//! Build identifiers and the debuginfo paths derived from them

use crate::error::{DebuginfoError, DebuginfoResult};
use std::fmt;
use std::path::{Path, PathBuf};

/// Root of the build-id indexed debug store
pub const BUILD_ID_DIR: &str = "/usr/lib/debug/.build-id";

/// Suffix of a separate debuginfo file
pub const DEBUG_SUFFIX: &str = ".debug";

/// Hex build identifier of one compiled binary or library
///
/// Always at least three hex characters, so the two-level debug store path
/// can be derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildId(String);

impl BuildId {
    /// Validate and wrap a build identifier
    pub fn new(id: impl Into<String>) -> DebuginfoResult<Self> {
        let id = id.into();
        if id.len() < 3 || !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DebuginfoError::InvalidBuildId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Expected location of this binary's debuginfo file
    pub fn debuginfo_path(&self) -> DebuginfoPath {
        let (dir, file) = self.0.split_at(2);
        DebuginfoPath(PathBuf::from(format!(
            "{}/{}/{}{}",
            BUILD_ID_DIR, dir, file, DEBUG_SUFFIX
        )))
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Absolute path of a debuginfo file inside the debug store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DebuginfoPath(PathBuf);

impl DebuginfoPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// The same path relocated under `root` (a cache dir or a sysroot)
    pub fn under(&self, root: &Path) -> PathBuf {
        let relative = self.0.strip_prefix("/").unwrap_or(&self.0);
        root.join(relative)
    }
}

impl fmt::Display for DebuginfoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for DebuginfoPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}
