//! Logging initialization
//!
//! One console layer, always on, plus an optional rotating JSON file layer
//! controlled by the `[logging]` config section. Initialization happens once
//! at process startup; [`startup_settings`] resolves the level and file
//! options from the configuration file before any command runs, so a
//! `file_enabled = true` in `fhirstage.toml` takes effect for the whole run.

use crate::config::LoggingConfig;
use crate::domain::{Result, StageError};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Keeps the file writer's background thread alive; hold until exit
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Resolve the log level and file-output options for process startup
///
/// Reads the configuration file so the `[logging]` section (and any
/// `FHIRSTAGE_LOGGING_*` overrides applied by the loader) drive the file
/// layer. An explicit CLI level wins over `application.log_level`. When the
/// file is missing or invalid, falls back to console-only defaults — the
/// command itself re-loads the config and reports the error with the proper
/// exit code.
pub fn startup_settings(config_path: &str, cli_level: Option<&str>) -> (String, LoggingConfig) {
    match crate::config::load_config(config_path) {
        Ok(config) => {
            let level = cli_level.unwrap_or(&config.application.log_level).to_string();
            (level, config.logging)
        }
        Err(_) => (
            cli_level.unwrap_or("info").to_string(),
            LoggingConfig::default(),
        ),
    }
}

/// Install the global tracing subscriber
///
/// The returned guard must live until the process exits or buffered file
/// output is lost.
///
/// # Errors
///
/// Returns an error for an unknown level or an uncreatable log directory.
pub fn init_logging(log_level_str: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_level = parse_log_level(log_level_str)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fhirstage={log_level}")));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(env_filter.clone());

    let (file_layer, file_guard) = if config.file_enabled {
        std::fs::create_dir_all(&config.file_path).map_err(|e| {
            StageError::Configuration(format!(
                "Failed to create log directory {}: {e}",
                config.file_path
            ))
        })?;

        let rotation = match config.rotation.as_str() {
            "hourly" => Rotation::HOURLY,
            _ => Rotation::DAILY,
        };
        let appender = RollingFileAppender::new(rotation, &config.file_path, "fhirstage.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(writer)
            .with_filter(env_filter);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!(
        file_enabled = config.file_enabled,
        file_path = %config.file_path,
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(StageError::Configuration(format!(
            "Invalid log level: {level_str}. Must be one of: trace, debug, info, warn, error"
        ))),
    }
}
