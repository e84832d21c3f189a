//! Tracing setup: env filter + fmt layer writing to the log file sink.

pub mod file_sink;

pub use file_sink::{FileLogSink, LogSinkGuard};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. `RUST_LOG` overrides the default `info` level.
/// With `mirror_stderr`, events are also printed to the terminal.
pub fn init_tracing(sink: &FileLogSink, mirror_stderr: bool) {
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(sink.clone());
    let stderr_layer =
        mirror_stderr.then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(file_layer)
        .with(stderr_layer)
        .init();
}
