//! Working directory lifecycle and termination signals

use crate::error::{DebuginfoError, DebuginfoResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Per-run scratch directory holding downloaded packages
///
/// Owned by the current process. Created lazily before the first
/// download and removed once the run ends, whatever the outcome.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory and any missing parents
    pub fn ensure(&self) -> DebuginfoResult<()> {
        std::fs::create_dir_all(&self.path)
            .map_err(|e| DebuginfoError::io(format!("creating {}", self.path.display()), e))
    }

    /// Remove the directory with everything in it
    ///
    /// Safe to call any number of times; a directory that is already gone
    /// counts as removed.
    pub fn cleanup(&self) -> DebuginfoResult<()> {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => {
                debug!("removed {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DebuginfoError::io(
                format!("removing {}", self.path.display()),
                e,
            )),
        }
    }

    /// Remove the directory only if nothing was left in it
    ///
    /// Returns `Ok(false)` when the directory does not exist.
    pub fn remove_if_empty(&self) -> DebuginfoResult<bool> {
        match std::fs::remove_dir(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DebuginfoError::io(
                format!("removing {}", self.path.display()),
                e,
            )),
        }
    }
}

/// Termination request received from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// SIGINT, usually Ctrl-C at the terminal
    Interrupt,
    /// SIGTERM
    Terminate,
}

/// Handlers for the signals that end a run
///
/// Installed before the pipeline starts so a signal arriving early is not
/// lost to the default disposition.
pub struct SignalListener {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

impl SignalListener {
    pub fn install() -> DebuginfoResult<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())
                .map_err(|e| DebuginfoError::io("installing SIGINT handler", e))?,
            terminate: signal(SignalKind::terminate())
                .map_err(|e| DebuginfoError::io("installing SIGTERM handler", e))?,
        })
    }

    /// Wait until SIGINT or SIGTERM arrives
    pub async fn wait_for_signal(&mut self) -> Signal {
        let received = tokio::select! {
            _ = self.interrupt.recv() => Signal::Interrupt,
            _ = self.terminate.recv() => Signal::Terminate,
        };
        info!("got {:?}, cleaning up", received);
        received
    }
}
