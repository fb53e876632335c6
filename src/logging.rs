use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// JSON logs to `path`, filtered by `RUST_LOG` or else `level`.
///
/// Stdout stays free for the console reporter.
pub fn init_file_logging(path: &Path, level: &str) -> Result<()> {
    let log_file = std::fs::File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))?;
    Ok(())
}
