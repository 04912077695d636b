//! Tracing setup for the terminal application.
//!
//! Log output goes to a daily rolling file so it never interleaves with the
//! streamed chat on stdout. `RUST_LOG` overrides the default `info` filter.

use std::path::Path;

use techdesk_core::error::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "techdesk.log";
const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber writing to `logs_dir`.
///
/// The returned guard must be kept alive for buffered lines to be flushed.
pub fn init_tracing(logs_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)?;

    let appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| techdesk_core::TechdeskError::internal(format!("Failed to init tracing: {e}")))?;

    Ok(guard)
}
