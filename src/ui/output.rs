//! Output functions for consistent CLI formatting

use super::context::UiContext;
use console::style;
use indicatif::HumanBytes;
use std::fmt::Display;

/// Display a plain status line
///
/// Status lines are printed in every mode; callers that consume our
/// output read them from the log.
pub fn status(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::info(message).ok();
    } else {
        println!("{}", message);
    }
}

/// Display a success step
pub fn step_ok(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::success(message).ok();
    } else {
        println!("{} {}", style("[OK]").green(), message);
    }
}

/// Display a warning step
pub fn step_warn(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::warning(message).ok();
    } else {
        println!("{} {}", style("[WARN]").yellow(), message);
    }
}

/// Display an error step with detail
pub fn step_error_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::error(format!("{}: {}", message, style(detail).red())).ok();
    } else {
        println!("{} {}: {}", style("[FAIL]").red(), message, detail);
    }
}

/// Display what a download batch is about to do
///
/// Zero counts are only shown when the user asked for verbose output.
pub fn plan_summary(
    ctx: &UiContext,
    not_found: usize,
    packages: usize,
    download_size: u64,
    installed_size: u64,
) {
    let verbose = ctx.verbosity() > 0;
    if verbose || not_found != 0 {
        step_warn(
            ctx,
            &format!("Can't find packages for {} debuginfo files", not_found),
        );
    }
    if verbose || packages != 0 {
        status(ctx, &format!("Found {} packages to download", packages));
        status(
            ctx,
            &format!(
                "Downloading {}, installed size: {}",
                HumanBytes(download_size),
                HumanBytes(installed_size)
            ),
        );
    }
}

/// Report files that are still missing after acquisition
pub fn missing_files<T: Display>(ctx: &UiContext, paths: &[T]) {
    for path in paths {
        step_warn(ctx, &format!("Missing debuginfo file: {}", path));
    }
}
