//! Structured logging setup shared by both drivers: an env-filtered
//! console layer always, plus an optional daily-rolling file sink when a
//! logging directory is configured.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Returns the file-appender guard; it must be kept alive for the
/// lifetime of the process or buffered log lines are dropped on exit.
pub fn init_tracing(logging_dir: Option<&str>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let mut layers = Vec::new();

    layers.push(
        tracing_subscriber::fmt::layer()
            .with_filter(EnvFilter::from_default_env())
            .boxed(),
    );

    let guard = logging_dir.map(|dir| {
        let file_appender = tracing_appender::rolling::daily(dir, "mcsentinel.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        layers.push(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_filter(LevelFilter::DEBUG)
                .boxed(),
        );

        guard
    });

    tracing_subscriber::registry().with(layers).init();

    guard
}
