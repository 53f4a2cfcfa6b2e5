use std::path::PathBuf;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{Env, level_directive};

/// `<data dir>/globus-helper/logs`, falling back to the temp dir.
pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(env!("CARGO_PKG_NAME"))
        .join("logs")
}

/// Install the process-wide subscriber. Level comes from `GLOBUS_LOG_LEVEL`.
/// With `verbose`, everything at debug and above is additionally written to a
/// daily log file under [`log_dir`]; keep the returned guard alive until exit
/// so buffered lines are flushed.
///
/// Only the binary calls this. If a subscriber is already installed the call
/// leaves it in place.
pub fn init_logging(env: &Env, verbose: bool) -> Result<Option<WorkerGuard>> {
    let level = level_directive(env.log_level()).map_err(anyhow::Error::msg)?;
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(level));

    if !verbose {
        let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
        return Ok(None);
    }

    let dir = log_dir();
    std::fs::create_dir_all(&dir)?;
    let file_appender = tracing_appender::rolling::daily(&dir, "globus-helper.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(EnvFilter::new("debug"));

    let _ = tracing_subscriber::registry().with(stderr_layer).with(file_layer).try_init();
    tracing::debug!("verbose logging to {}", dir.display());
    Ok(Some(guard))
}
