//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Environment variable presetting the verbosity level
pub const VERBOSITY_ENV: &str = "ABRT_VERBOSE";

/// Install the debuginfo needed to analyze a core dump
///
/// Reads the build ids of every module loaded in the core, and downloads
/// and unpacks the debuginfo packages providing whatever is not installed
/// yet into the cache directory.
#[derive(Parser, Debug)]
#[command(name = "debuginfo-install")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Core dump to analyze
    #[arg(short = 'c', long = "core", value_name = "COREFILE")]
    pub core: PathBuf,

    /// Directory debuginfo files are cached in [default: /var/cache/abrt-di]
    #[arg(long = "cache", value_name = "CACHEDIR")]
    pub cache: Option<PathBuf>,

    /// Working directory for downloaded packages
    #[arg(long = "tmpdir", value_name = "TMPDIR")]
    pub tmpdir: Option<PathBuf>,

    /// Keep downloaded packages and the working directory
    #[arg(long = "keeprpms")]
    pub keep_rpms: bool,

    /// Download without asking
    #[arg(short = 'y')]
    pub yes: bool,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(long, env = "DEBUGINFO_INSTALL_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Verbosity from the environment preset plus every `-v`
    pub fn verbosity(&self) -> u8 {
        let preset = env_verbosity(std::env::var(VERBOSITY_ENV).ok().as_deref());
        preset.saturating_add(self.verbose)
    }
}

/// Parse a verbosity preset, ignoring anything that is not a number
pub fn env_verbosity(value: Option<&str>) -> u8 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}
