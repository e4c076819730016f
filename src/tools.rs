//! External tool invocation
//!
//! Every external program (eu-unstrip, rpm2cpio, cpio, dnf) is described by
//! a [`ToolCommand`]: the program plus an argument prefix placed before the
//! fixed arguments each caller appends. Children are killed when the future
//! driving them is dropped, which is how an interrupted run stops them.

use crate::error::{DebuginfoError, DebuginfoResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::debug;

/// An external program and its leading arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    /// Program name or path
    pub program: String,

    /// Arguments placed before the caller's arguments
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    /// Create a tool command without prefix arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Create a tool command with prefix arguments
    pub fn with_args<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a tokio command with the prefix and `extra` arguments applied
    pub fn command<I, S>(&self, extra: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).args(extra).kill_on_drop(true);
        cmd
    }

    /// Run the tool, capturing stdout and stderr
    pub async fn capture<I, S>(&self, extra: I) -> DebuginfoResult<ToolOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut cmd = self.command(extra);
        debug!("Executing: {:?}", cmd.as_std());

        let output = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DebuginfoError::tool_spawn(&self.program, e))?;

        Ok(ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished tool
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the tool exited with status zero
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Exit status for messages ("status 2", "signal")
    pub fn describe_status(&self) -> String {
        describe_status(self.status)
    }
}

/// Render an exit status for user-facing messages
pub fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}
