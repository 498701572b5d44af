use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "cabinet_json=info,warn";
const LOG_FILE_PREFIX: &str = "cabinet-json.log";

/// Initializes console logging on stderr, plus JSON file logging when a
/// log directory is given. Keep the returned guard alive until exit so the
/// file writer flushes.
pub fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Respect RUST_LOG if set
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_writer, guard) = match log_dir.and_then(file_writer) {
        Some((writer, guard)) => (Some(writer), Some(guard)),
        None => (None, None),
    };
    let file_layer = file_writer.map(|writer| fmt::layer().json().with_writer(writer));
    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();
    guard
}

/// Daily-rolling writer into `dir`, or `None` with a notice on stderr when
/// the directory cannot be used. Runs before the subscriber exists.
fn file_writer(dir: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    let appender = fs::create_dir_all(dir)
        .map_err(|e| e.to_string())
        .and_then(|()| {
            RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .build(dir)
                .map_err(|e| e.to_string())
        });
    match appender {
        Ok(appender) => Some(tracing_appender::non_blocking(appender)),
        Err(e) => {
            eprintln!(
                "⚠️  Log directory {} unusable ({e}), logging to console only",
                dir.display()
            );
            None
        }
    }
}
