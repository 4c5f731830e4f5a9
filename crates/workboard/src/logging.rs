//! Log and trace output setup.
//!
//! Library code logs through the `log` facade and opens `tracing` spans at
//! the store boundary; both end up in one `tracing-subscriber` registry.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter override read before `RUST_LOG`.
pub const LOG_ENV_VAR: &str = "WORKBOARD_LOG";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to bridge log records: {0}")]
    LogBridge(#[from] log::SetLoggerError),

    #[error("Failed to install subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Filter from `WORKBOARD_LOG`, then `RUST_LOG`, then `default_filter`.
pub fn build_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Installs the global subscriber. Call once, at start-up.
pub fn init(default_filter: &str, json: bool) -> Result<(), LoggingError> {
    tracing_log::LogTracer::init()?;

    let filter = build_filter(default_filter);
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}
