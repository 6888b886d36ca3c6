//! Logging setup on top of `tracing-subscriber`.
//!
//! Events go to stderr so stdout carries only the JSON report.
//! `RUST_LOG` wins over the `--log-level` fallback.

use std::io;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::LogFormatArg;
use crate::error::CliError;

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive, e.g. `warn` or `stockscope_core=debug`.
    pub level: String,
    pub format: LogFormatArg,
    pub with_target: bool,
}

impl LogConfig {
    pub fn new(level: impl Into<String>, format: LogFormatArg) -> Self {
        Self {
            level: level.into(),
            format,
            with_target: true,
        }
    }
}

pub fn init_logging(config: &LogConfig) -> Result<(), CliError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|error| CliError::Logging(error.to_string()))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.format {
        LogFormatArg::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_writer(io::stderr)
                    .with_target(config.with_target),
            )
            .try_init(),
        LogFormatArg::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_target(config.with_target),
            )
            .try_init(),
        LogFormatArg::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(io::stderr)
                    .with_target(config.with_target),
            )
            .try_init(),
    };
    result.map_err(|error| CliError::Logging(error.to_string()))?;

    tracing::debug!(format = ?config.format, level = %config.level, "logging initialized");
    Ok(())
}
