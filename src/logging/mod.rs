//! Logging system initialization
//!
//! Uses the tracing ecosystem for structured logging with support for:
//! - Environment variable override (DEXTERITY_LOG)
//! - File output with daily rotation
//!
//! Only the file layer is installed: while the TUI is running it owns the
//! terminal, so console output would corrupt the interface.

use crate::config::LoggingConfig;
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Get the default log directory path
fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dexterity")
        .join("logs")
}

/// Initialize the logging system
///
/// # Environment Variables
/// - `DEXTERITY_LOG`: Override log filter (e.g., "dexterity=debug,dexterity::shell=trace")
pub fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_env("DEXTERITY_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("dexterity={}", config.level)));

    let file_layer = if config.file_output {
        let log_dir = config.file_path.clone().unwrap_or_else(default_log_dir);

        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            eprintln!("warning: failed to create log directory {log_dir:?}: {e}");
            None
        } else {
            let file_appender =
                RollingFileAppender::new(Rotation::DAILY, &log_dir, "dexterity.log");

            let file_layer = fmt::layer()
                .with_writer(file_appender)
                .with_target(true)
                .with_level(true)
                .with_ansi(false);

            Some(file_layer.boxed())
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    tracing::info!(level = %config.level, file_output = config.file_output, "logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_dir_ends_with_logs() {
        let dir = default_log_dir();
        assert!(dir.to_string_lossy().contains("dexterity"));
        assert!(dir.ends_with("logs"));
    }
}
