use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{FolioError, Result};

/// Installs the global subscriber writing to stderr. `RUST_LOG` wins over
/// `config.level`. `log` records from dependencies are forwarded into tracing.
///
/// Fails if a global subscriber or logger is already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| FolioError::Logging(format!("invalid log level '{}': {}", config.level, e)))?;

    let fmt_layer = match config.format {
        LogFormat::Json => fmt::layer()
            .with_writer(std::io::stderr)
            .json()
            .with_target(true)
            .with_current_span(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(fmt_layer).with(filter);

    LogTracer::init().map_err(|e| FolioError::Logging(e.to_string()))?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| FolioError::Logging(e.to_string()))?;
    Ok(())
}
