//! Error types for debuginfo-install
//!
//! All modules use `DebuginfoResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for debuginfo-install operations
pub type DebuginfoResult<T> = Result<T, DebuginfoError>;

/// All errors that can occur while resolving and installing debuginfo
#[derive(Error, Debug)]
pub enum DebuginfoError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // Core dump analysis errors
    #[error("Can't get build ids from {}", core.display())]
    NoBuildIds { core: PathBuf },

    #[error("Unparseable output from {tool}: {line:?}")]
    UnparseableOutput { tool: String, line: String },

    #[error("Invalid build id: {0:?}")]
    InvalidBuildId(String),

    // Repository errors
    #[error("Repository query failed: {command}: {stderr}")]
    RepoQuery { command: String, stderr: String },

    #[error("Downloading package {package} failed: {reason}")]
    Download { package: String, reason: String },

    #[error("Can't unpack {package}: {reason}")]
    Unpack { package: String, reason: String },

    #[error("Operation cancelled")]
    Cancelled,

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Failed to run {tool}")]
    ToolSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DebuginfoError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a tool spawn error
    pub fn tool_spawn(tool: impl Into<String>, source: std::io::Error) -> Self {
        Self::ToolSpawn {
            tool: tool.into(),
            source,
        }
    }

    /// Whether the failure happened before any network activity
    pub fn is_analysis_failure(&self) -> bool {
        matches!(
            self,
            Self::NoBuildIds { .. } | Self::UnparseableOutput { .. } | Self::InvalidBuildId(_)
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NoBuildIds { .. } => {
                Some("Check that the file is a core dump and that eu-unstrip (elfutils) is installed")
            }
            Self::ToolSpawn { .. } => Some("Install elfutils, rpm and cpio, or adjust [tools] in the config"),
            Self::RepoQuery { .. } => Some("Check that dnf is installed and the debuginfo repositories are reachable"),
            Self::Unpack { .. } => Some("Check free space and permissions of the cache directory"),
            _ => None,
        }
    }
}
