//! Log setup for the CLI.
//!
//! Logs go to a daily-rotated file under `<root>/logs/` so they never mix
//! with command output. If the directory can't be created, warnings and
//! errors go to stderr instead.

use std::env;
use std::io;

use deepflow_core::StorageConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEBUG_ENV: &str = "DEEPFLOW_DEBUG_LOG";
const LOG_FILE_PREFIX: &str = "deepflow.log";

fn debug_enabled() -> bool {
    env::var(DEBUG_ENV)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false)
}

fn file_filter() -> EnvFilter {
    if debug_enabled() {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Installs the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init(storage: Option<&StorageConfig>) -> Option<WorkerGuard> {
    let logs_dir = storage.map(|s| s.logs_dir());
    let dir_ready = logs_dir
        .as_ref()
        .map(|dir| fs_err::create_dir_all(dir).is_ok())
        .unwrap_or(false);

    match logs_dir {
        Some(dir) if dir_ready => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_filter(file_filter()),
                )
                .init();
            Some(guard)
        }
        _ => {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_filter(EnvFilter::new("warn")),
                )
                .init();
            None
        }
    }
}
