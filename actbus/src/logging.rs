//! Subscriber installation for applications embedding the bus.

use crate::config::ConfigError;
use serde::Deserialize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human readable output.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

/// `[logging]` settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive, used when `RUST_LOG` is unset.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "actbus=info".to_owned(),
            format: LogFormat::Compact,
        }
    }
}

impl LoggingConfig {
    /// The filter to install: `RUST_LOG` wins over the configured directive.
    pub fn env_filter(&self) -> Result<EnvFilter, ConfigError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => Ok(EnvFilter::try_new(&self.filter)?),
        }
    }
}

/// Install a global `tracing` subscriber.
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = config.env_filter()?;
    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match config.format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init()?,
    }

    Ok(())
}
