//! `Taskdeck`: personal task list on the command line.
//!
//! Sessions and tasks are kept as JSON documents in the data directory.
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/taskdeck/config.toml`).
//!
//! ```bash
//! taskdeck login --name "Ali" --id TD1008
//! taskdeck add "Quarterly report" --due 2030-01-15
//! taskdeck list --search report
//! taskdeck stats
//! ```

use std::io;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use taskdeck::app::App;
use taskdeck::cli;
use taskdeck::clock::SystemClock;
use taskdeck::config::{CliArgs, ClientConfig};
use taskdeck::storage::{DurableStore, FileBackend};

fn main() -> ExitCode {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig {
                data_dir: cli
                    .data_dir
                    .clone()
                    .unwrap_or_else(|| ClientConfig::default().data_dir),
                ..ClientConfig::default()
            }
        }
    };

    // Logs go to a file so they never mix with command output.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(data_dir = %config.data_dir.display(), "taskdeck starting");

    let storage = DurableStore::new(FileBackend::new(config.data_dir.clone()));
    let mut app = App::open(storage, SystemClock, &config);

    let mut out = io::stdout().lock();
    match cli::run(&mut app, cli.command, &config, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::warn!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskdeck.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_env("TASKDECK_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}
