//! Console and per-run log file setup.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use console::style;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Name of the log file for a run started now.
pub fn log_file_name() -> PathBuf {
    PathBuf::from(format!("{}_app.log", chrono::Utc::now().timestamp()))
}

/// Install the global subscriber.
///
/// Console output goes to stderr at a level set by `verbose` (or `RUST_LOG`).
/// With `log_file`, INFO and above is also written to `<unix>_app.log` in
/// the working directory.
pub fn init(verbose: u8, log_file: bool) -> anyhow::Result<()> {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let console_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let file_layer = if log_file {
        let path = log_file_name();
        let file = File::create(&path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        println!("{} Created log file {}", style("ℹ").blue(), path.display());
        Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file))
                .with_filter(LevelFilter::INFO),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()?;
    Ok(())
}
