//! JSON trace logging to a file. Never stdout: the demo owns the terminal.

use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::Level;
use tracing_subscriber::fmt::time::UtcTime;

static TRACING_INIT: OnceLock<Option<PathBuf>> = OnceLock::new();

const TRACE_LOG_ENV: &str = "HUDKIT_TRACE_LOG";
const TRACE_LEVEL_ENV: &str = "HUDKIT_TRACE_LEVEL";

pub fn tracing_log_path() -> PathBuf {
    env::var(TRACE_LOG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("hudkit_trace.jsonl"))
}

/// `trace`..`error`, case-insensitive; anything else means debug.
fn parse_level(raw: Option<&str>) -> Level {
    raw.and_then(|value| value.trim().parse().ok())
        .unwrap_or(Level::DEBUG)
}

/// Install the global subscriber once. `no_logs` wins over `logs`.
///
/// Returns the log file path when logging is active.
pub fn init_tracing(logs: bool, no_logs: bool) -> Option<PathBuf> {
    if !logs || no_logs {
        return None;
    }

    TRACING_INIT
        .get_or_init(|| {
            let path = tracing_log_path();
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .ok()?;
            let level = parse_level(env::var(TRACE_LEVEL_ENV).ok().as_deref());
            let subscriber = tracing_subscriber::fmt()
                .json()
                .with_timer(UtcTime::rfc_3339())
                .with_max_level(level)
                .with_thread_names(true)
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok()?;
            Some(path)
        })
        .clone()
}
