//! Confirming and running a download batch

use super::unpack::Unpacker;
use crate::context::RunContext;
use crate::error::{DebuginfoError, DebuginfoResult};
use crate::repo::{AcquisitionPlan, RepoEngine, RepoPackage};
use crate::ui::{self, confirm, Answers, DownloadMeter, UiContext, PROMPT_RETRIES};
use tracing::{debug, info, warn};

/// Question asked before anything is downloaded
pub const CONFIRM_PROMPT: &str = "Is this ok? [y/N] ";

/// How a download batch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionOutcome {
    /// The plan had no packages
    NothingToDo,
    /// The user answered no; nothing was written
    Declined,
    /// Every package was attempted; `failed` could not be downloaded
    Completed { failed: Vec<RepoPackage> },
}

/// Downloads and unpacks the packages of an [`AcquisitionPlan`]
pub struct Downloader<'a> {
    engine: &'a dyn RepoEngine,
    ctx: &'a RunContext,
    ui: &'a UiContext,
}

impl<'a> Downloader<'a> {
    pub fn new(engine: &'a dyn RepoEngine, ctx: &'a RunContext, ui: &'a UiContext) -> Self {
        Self { engine, ctx, ui }
    }

    /// Run the batch, asking on `answers` first when a terminal is attached
    ///
    /// A failed download is reported and the batch goes on; the files it
    /// would have provided stay missing. A failed unpack stops the batch,
    /// removes the working directory and is returned as the error.
    pub async fn download(
        &self,
        plan: &AcquisitionPlan,
        answers: Answers,
    ) -> DebuginfoResult<AcquisitionOutcome> {
        ui::plan_summary(
            self.ui,
            plan.not_found().len(),
            plan.package_count(),
            plan.download_size(),
            plan.installed_size(),
        );
        if plan.is_empty() {
            return Ok(AcquisitionOutcome::NothingToDo);
        }

        if self.ui.should_confirm() && !confirm(answers, CONFIRM_PROMPT, PROMPT_RETRIES).await? {
            info!("download declined");
            return Ok(AcquisitionOutcome::Declined);
        }

        let unpacker = Unpacker::new(self.ctx, self.ui);
        let count = plan.package_count();
        let mut failed = Vec::new();

        for (index, (package, paths)) in plan.packages().enumerate() {
            if self.ctx.is_cancelled() {
                return Err(DebuginfoError::Cancelled);
            }
            debug!("{} provides {} requested files", package, paths.len());

            self.ctx.workdir.ensure()?;
            std::fs::create_dir_all(&self.ctx.cache_dir).map_err(|e| {
                DebuginfoError::io(format!("creating {}", self.ctx.cache_dir.display()), e)
            })?;

            let dest = unpacker.package_path(package);
            let mut meter = DownloadMeter::new(self.ui, index, count, &package.nvra());
            let result = self
                .engine
                .download(package, &dest, &mut |read: u64, total: Option<u64>| {
                    meter.update(read, total)
                })
                .await;

            if let Err(e) = result {
                meter.abandon();
                if self.ctx.is_cancelled() {
                    return Err(DebuginfoError::Cancelled);
                }
                warn!("{}", e);
                ui::step_error_detail(
                    self.ui,
                    &format!("Downloading package {} failed", package),
                    &e.to_string(),
                );
                failed.push(package.clone());
                continue;
            }
            meter.finish();

            if let Err(e) = unpacker.unpack(package).await {
                ui::step_error_detail(self.ui, "Unpacking failed, aborting download...", &e.to_string());
                if let Err(cleanup_err) = self.ctx.workdir.cleanup() {
                    warn!("{}", cleanup_err);
                }
                return Err(e);
            }
        }

        if !self.ctx.keep_packages {
            let workdir = self.ctx.workdir.path();
            ui::status(
                self.ui,
                &format!(
                    "All downloaded packages have been extracted, removing {}",
                    workdir.display()
                ),
            );
            if let Err(e) = self.ctx.workdir.remove_if_empty() {
                debug!("{}", e);
                ui::step_warn(
                    self.ui,
                    &format!(
                        "Can't remove {}, probably contains an error log",
                        workdir.display()
                    ),
                );
            }
        }

        Ok(AcquisitionOutcome::Completed { failed })
    }
}
