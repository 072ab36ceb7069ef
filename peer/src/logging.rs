//! Logging setup for embedding hosts.
//!
//! Output is either human-readable lines or newline-delimited JSON, chosen
//! by [`LogFormat`]. The `RUST_LOG` environment variable overrides the
//! configured filter when set; otherwise the caller-supplied `level` string
//! is used (e.g. `"info"`, `"debug,tablesync_peer=trace"`).

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Selects the output format for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Pretty-printed lines for local development.
    Human,
    /// Newline-delimited JSON for log aggregation pipelines.
    Json,
}

/// Initialise the global tracing subscriber.
///
/// # Panics
///
/// Panics if a global subscriber is already set, so call it once per
/// process; embedding hosts that install their own subscriber should skip
/// this entirely.
pub fn init_logging(format: LogFormat, level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Human => registry.with(fmt::layer().with_target(true)).init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true))
            .init(),
    }
}
