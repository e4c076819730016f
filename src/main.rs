//! debuginfo-install - fetch the debuginfo a core dump needs
//!
//! CLI entry point: loads configuration, runs the install pipeline and
//! cleans up on completion or on SIGINT/SIGTERM.

use clap::Parser;
use console::style;
use debuginfo_install::cleanup::{Signal, SignalListener};
use debuginfo_install::cli::{self, Cli, RunReport};
use debuginfo_install::config::ConfigManager;
use debuginfo_install::error::DebuginfoResult;
use debuginfo_install::repo::{DnfEngine, RepoEngine};
use debuginfo_install::ui::{Answers, UiContext};
use std::io::{BufReader, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit status of a failed run
const EXIT_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbosity = cli.verbosity();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match verbosity {
        0 => EnvFilter::new("debuginfo_install=warn"),
        1 => EnvFilter::new("debuginfo_install=info"),
        _ => EnvFilter::new("debuginfo_install=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match run(cli, verbosity).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// How the pipeline and the signal listener raced
enum Ending {
    Finished(DebuginfoResult<RunReport>),
    Signalled(Signal),
}

async fn run(cli: Cli, verbosity: u8) -> DebuginfoResult<()> {
    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    debug!("Loading config from {}", config_manager.path().display());
    let config = config_manager.load().await?;

    let ctx = cli::build_context(&cli, &config, verbosity);
    let ui = UiContext::detect()
        .with_auto_yes(ctx.auto_yes)
        .with_verbosity(ctx.verbosity);
    debug!("Working directory: {}", ctx.workdir.path().display());

    let engine = DnfEngine::new(config.repo.program.clone(), Arc::clone(&ctx.cancel));
    debug!("Using repository engine: {}", engine.engine_name());

    let mut signals = SignalListener::install()?;
    let answers: Answers = Box::new(BufReader::new(std::io::stdin()));
    let pipeline = cli::execute(
        &cli.core,
        &ctx,
        &ui,
        &engine,
        &config.repo.pattern,
        answers,
    );

    // Leaving the select drops the pipeline, killing any running tool
    let ending = tokio::select! {
        result = pipeline => Ending::Finished(result),
        signal = signals.wait_for_signal() => Ending::Signalled(signal),
    };

    match ending {
        Ending::Finished(result) => {
            cli::finish(&ctx, &ui);
            result.map(|_| ())
        }
        Ending::Signalled(signal) => {
            cli::interrupted(&ctx, signal);
            // Runtime shutdown would wait for a pending stdin read or a
            // stalled transfer on the blocking pool
            let _ = std::io::stdout().flush();
            std::process::exit(0)
        }
    }
}
