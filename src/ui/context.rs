//! UI context for detecting interactive vs machine-consumed output

use std::io::IsTerminal;

/// UI context that determines output behavior
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Whether stdout is an interactive terminal
    interactive: bool,
    /// Whether -y was passed (never ask for confirmation)
    auto_yes: bool,
    /// Diagnostic verbosity (-v count plus the environment preset)
    verbosity: u8,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        Self {
            interactive: Self::detect_interactive(),
            auto_yes: false,
            verbosity: 0,
        }
    }

    /// Create a non-interactive context (output consumed by another program)
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            auto_yes: false,
            verbosity: 0,
        }
    }

    /// Set auto-yes mode (skip the download confirmation)
    pub fn with_auto_yes(mut self, yes: bool) -> Self {
        self.auto_yes = yes;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Check if we're attached to an interactive terminal
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Check if prompts should be skipped
    pub fn auto_yes(&self) -> bool {
        self.auto_yes
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    /// Whether to ask before downloading
    ///
    /// Only a terminal can answer; when spawned by a crash-reporting daemon
    /// there is nobody to ask.
    pub fn should_confirm(&self) -> bool {
        self.interactive && !self.auto_yes
    }

    /// Check if we should use fancy output (spinners, in-place progress)
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }

    /// Detect if stdout is a terminal outside of CI
    fn detect_interactive() -> bool {
        if !std::io::stdout().is_terminal() {
            return false;
        }

        if std::env::var("CI").is_ok() {
            return false;
        }

        // Common CI environment indicators
        let ci_vars = ["GITHUB_ACTIONS", "GITLAB_CI", "JENKINS_URL", "BUILDKITE"];
        !ci_vars.iter().any(|var| std::env::var(var).is_ok())
    }

    #[cfg(test)]
    pub(crate) fn interactive_for_tests() -> Self {
        Self {
            interactive: true,
            auto_yes: false,
            verbosity: 0,
        }
    }
}
