//! Progress indicators with plain-output fallback

use super::context::UiContext;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Minimum spacing of progress lines when output is not a terminal
pub const PLAIN_PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

/// A task spinner with plain fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    /// Start the spinner with a message
    ///
    /// Without a terminal the message is printed once, so a log reader
    /// knows why the run appears to pause.
    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{}", message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else {
            println!("{} {}", style("[FAIL]").red(), message);
        }
    }
}

/// Decides which percentage updates are worth printing
///
/// Unchanged percentages are always dropped. With `interval` set, a line is
/// printed at most once per interval, except that 100% always goes through.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    last_pct: Option<u8>,
    last_emit: Option<Instant>,
    interval: Option<Duration>,
}

impl ProgressThrottle {
    /// Throttle that only drops repeated percentages
    pub fn unlimited() -> Self {
        Self {
            last_pct: None,
            last_emit: None,
            interval: None,
        }
    }

    /// Throttle that also spaces updates by `interval`
    pub fn every(interval: Duration) -> Self {
        Self {
            interval: Some(interval),
            ..Self::unlimited()
        }
    }

    /// Whether an update to `pct` at `now` should be shown
    pub fn should_emit(&mut self, pct: u8, now: Instant) -> bool {
        if self.last_pct == Some(pct) {
            return false;
        }
        self.last_pct = Some(pct);

        let Some(interval) = self.interval else {
            return true;
        };
        // The first update only starts the clock
        let last = *self.last_emit.get_or_insert(now);
        if pct == 100 || now < last || now.duration_since(last) >= interval {
            self.last_emit = Some(now);
            return true;
        }
        false
    }
}

/// Percentage of `read` out of `total`, capped at 100
pub fn percent(read: u64, total: Option<u64>) -> u8 {
    match total {
        Some(0) | None => 0,
        Some(total) => ((read.min(total) as u128 * 100) / total as u128) as u8,
    }
}

/// Per-package download progress
///
/// On a terminal the line is redrawn in place; otherwise full lines are
/// printed sparingly for whoever is reading the log.
pub struct DownloadMeter {
    label: String,
    bar: Option<ProgressBar>,
    throttle: ProgressThrottle,
    finished: bool,
}

impl DownloadMeter {
    /// Meter for package `index` (zero based) of `count`
    pub fn new(ctx: &UiContext, index: usize, count: usize, name: &str) -> Self {
        let label = format!("Downloading ({} of {}) {}", index + 1, count, name);
        let (bar, throttle) = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(100);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{prefix}: {pos:>3}% {bar:20.cyan/dim}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("━╸─"),
            );
            bar.set_prefix(label.clone());
            (Some(bar), ProgressThrottle::unlimited())
        } else {
            (None, ProgressThrottle::every(PLAIN_PROGRESS_INTERVAL))
        };
        Self {
            label,
            bar,
            throttle,
            finished: false,
        }
    }

    /// Record `read` bytes transferred out of `total`
    pub fn update(&mut self, read: u64, total: Option<u64>) {
        let pct = percent(read, total);
        if !self.throttle.should_emit(pct, Instant::now()) {
            return;
        }
        match &self.bar {
            Some(bar) => bar.set_position(u64::from(pct)),
            None => println!("{}: {:>3}%", self.label, pct),
        }
        if pct == 100 {
            self.finish();
        }
    }

    /// Leave the final line on screen
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if let Some(bar) = &self.bar {
            bar.finish();
        }
    }

    /// Remove the in-place line after a failed transfer
    pub fn abandon(&mut self) {
        self.finished = true;
        if let Some(bar) = &self.bar {
            bar.abandon();
        }
    }
}
