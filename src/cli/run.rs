//! The install pipeline driven by the command line

use crate::acquire::{AcquisitionOutcome, Downloader};
use crate::cleanup::Signal;
use crate::cli::args::Cli;
use crate::config::Config;
use crate::context::RunContext;
use crate::debuginfo::{self, DebuginfoPath, LocalResolver};
use crate::error::DebuginfoResult;
use crate::repo::{PackageLocator, RepoEngine};
use crate::ui::{self, Answers, UiContext};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What one run found and did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Distinct build ids referenced by the core
    pub referenced: usize,
    /// Debuginfo files missing before anything was downloaded
    pub missing_before: usize,
    /// Result of the download batch, if one was needed
    pub acquisition: Option<AcquisitionOutcome>,
    /// Debuginfo files still missing at the end
    pub still_missing: Vec<DebuginfoPath>,
}

/// Working directory used when `--tmpdir` is not given
///
/// Timestamped and suffixed with the pid so concurrent runs never share it.
pub fn default_tmpdir(base: &Path, now: DateTime<Local>, pid: u32) -> PathBuf {
    base.join(format!(
        "abrt-tmp-debuginfo-{}.{}",
        now.format("%Y-%m-%d-%H:%M:%S"),
        pid
    ))
}

/// Combine flags and configuration into the run context
pub fn build_context(cli: &Cli, config: &Config, verbosity: u8) -> RunContext {
    let cache_dir = cli
        .cache
        .clone()
        .unwrap_or_else(|| config.store.cache_dir.clone());
    let workdir = cli.tmpdir.clone().unwrap_or_else(|| {
        default_tmpdir(&config.download.tmp_base, Local::now(), std::process::id())
    });

    let mut ctx = RunContext::new(cache_dir, workdir);
    ctx.system_root = config.store.system_root.clone();
    ctx.keep_packages = cli.keep_rpms || config.download.keep_packages;
    ctx.verbosity = verbosity;
    ctx.auto_yes = cli.yes;
    ctx.tools = config.tools.clone();
    ctx
}

/// Make sure every debuginfo file `core` needs is installed
///
/// Build ids are read from the core, files already present are skipped,
/// the rest is located in repositories whose id contains `repo_pattern`,
/// then downloaded and unpacked. Files nobody provides are reported, not
/// treated as a failure.
pub async fn execute(
    core: &Path,
    ctx: &RunContext,
    ui: &UiContext,
    engine: &dyn RepoEngine,
    repo_pattern: &str,
    answers: Answers,
) -> DebuginfoResult<RunReport> {
    ui::status(ui, &format!("Analyzing corefile '{}'", core.display()));
    let build_ids = debuginfo::extract(&ctx.tools.unstrip, core).await?;

    let resolver = LocalResolver::new(&ctx.cache_dir).with_system_root(&ctx.system_root);
    let mut missing = resolver.filter_missing(&build_ids);
    if missing.is_empty() {
        ui::step_ok(
            ui,
            &format!("All {} debuginfo files are available", build_ids.len()),
        );
        return Ok(RunReport {
            referenced: build_ids.len(),
            missing_before: 0,
            acquisition: None,
            still_missing: Vec::new(),
        });
    }

    missing.sort();
    debug!("missing: {:?}", missing);
    ui::status(
        ui,
        &format!(
            "Coredump references {} debuginfo files, {} of them are not installed",
            build_ids.len(),
            missing.len()
        ),
    );

    let plan = PackageLocator::new(engine, repo_pattern)
        .locate(ui, &missing)
        .await?;
    let result = Downloader::new(engine, ctx, ui).download(&plan, answers).await;

    let mut still_missing = resolver.filter_missing(&build_ids);
    still_missing.sort();
    ui::missing_files(ui, &still_missing);

    Ok(RunReport {
        referenced: build_ids.len(),
        missing_before: missing.len(),
        acquisition: Some(result?),
        still_missing,
    })
}

/// Remove the working directory at the end of a run
///
/// Kept when packages are kept; a failure is reported, not returned.
pub fn finish(ctx: &RunContext, ui: &UiContext) {
    if ctx.keep_packages {
        debug!("keeping {}", ctx.workdir.path().display());
        return;
    }
    if let Err(e) = ctx.workdir.cleanup() {
        warn!("{}", e);
        ui::step_warn(
            ui,
            &format!("Can't remove '{}': {}", ctx.workdir.path().display(), e),
        );
    }
}

/// Tear down after SIGINT or SIGTERM
///
/// Raises the cancel flag for anything still polling it and removes the
/// working directory whatever `keep_packages` says. The caller exits right
/// after, so nothing here may wait on the pipeline.
pub fn interrupted(ctx: &RunContext, signal: Signal) {
    ctx.cancel();
    if let Err(e) = ctx.workdir.cleanup() {
        eprintln!("Can't remove '{}': {}", ctx.workdir.path().display(), e);
    }
    if signal == Signal::Interrupt {
        println!("\nExiting on user command");
    }
}
