//! Tracing subscriber setup.
//!
//! `RUST_LOG` overrides the default filter.

use mirror_core::Result;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";
const LOG_FILE_PREFIX: &str = "mirror.log";

fn make_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Writes logs to a daily-rotated file under `log_dir`.
///
/// The returned guard flushes pending lines on drop and must be held for
/// the lifetime of the program. Interactive frontends use this so log lines
/// never interleave with the prompt.
pub fn init_file_logging(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(make_filter(DEFAULT_FILTER))
        .with_target(true)
        .with_ansi(false)
        .with_writer(writer)
        .try_init();

    Ok(guard)
}

/// Writes logs to stderr, keeping stdout clean for command output.
pub fn init_stderr_logging(fallback: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(make_filter(fallback))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_logging_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("nested").join("logs");

        let guard = init_file_logging(&log_dir).unwrap();
        tracing::info!("logging initialised");
        drop(guard);

        assert!(log_dir.is_dir());
    }
}
