//! Tracing setup. The subscriber is installed once the initialization
//! options are known, writing to stderr (never stdout, which carries the
//! protocol) or to a log file when `logToFile` is enabled.

use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

static FILE_GUARD: OnceLock<Option<WorkerGuard>> = OnceLock::new();

pub const LOG_FILE_NAME: &str = "smithy-language-server.log";

/// Install the global subscriber. Idempotent: later calls (including from
/// tests spinning up multiple servers) are no-ops.
pub fn init(log_to_file: bool) {
    FILE_GUARD.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        if log_to_file {
            let appender =
                tracing_appender::rolling::never(std::env::temp_dir(), LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init();
            Some(guard)
        } else {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .try_init();
            None
        }
    });
}
