//! UI module for consistent CLI output
//!
//! Uses `cliclack` for styled log lines and spinners with automatic
//! fallback to plain output when stdout is not a terminal, which is the
//! common case when a crash-reporting daemon runs us.
//!
//! # Example
//!
//! ```rust,ignore
//! use debuginfo_install::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect().with_auto_yes(args.yes);
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Looking for needed packages in repositories");
//! // ... do work ...
//! spinner.stop("Found 3 packages");
//!
//! ui::plan_summary(&ctx, 0, 3, 4_000_000, 12_000_000);
//! ```

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{missing_files, plan_summary, status, step_error_detail, step_ok, step_warn};
pub use progress::{percent, DownloadMeter, ProgressThrottle, TaskSpinner, PLAIN_PROGRESS_INTERVAL};
pub use prompts::{ask_yes_no, confirm, Answers, PROMPT_RETRIES};
