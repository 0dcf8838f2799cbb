//! Structured logging for the runtime.
//!
//! Events go to stdout so CloudWatch captures them, one JSON object per line
//! unless text output is requested. `RUST_LOG` overrides the default filter.

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

pub const DEFAULT_LOG_FILTER: &str = "info";

pub fn init_logging(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let installed = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_target(true)
                    .with_ansi(false),
            )
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_ansi(false))
            .try_init(),
    };

    // A subscriber already installed (tests, repeated init) keeps running.
    if installed.is_err() {
        tracing::debug!("global subscriber already installed");
    }
}
