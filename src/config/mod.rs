//! Configuration management for dexterity
//!
//! This module handles loading, parsing, and managing configuration from:
//! 1. Embedded default_config.toml (compile-time defaults)
//! 2. User config at ~/.config/dexterity/config.toml (or platform-specific location)

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration embedded in binary
const DEFAULT_CONFIG: &str = include_str!("../../default_config.toml");

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub tui: TuiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Privileged shell settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Program spawned for the interactive session
    #[serde(default = "default_shell_program")]
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Per-command response timeout in seconds
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
    /// How long to wait for the first prompt after spawning
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl ShellConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: default_shell_program(),
            args: Vec::new(),
            command_timeout_secs: default_command_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// TUI behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    /// Input poll interval for the event loop in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
}

impl TuiConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable file output
    #[serde(default = "default_true")]
    pub file_output: bool,
    /// Log file directory path
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: true,
            file_path: None,
        }
    }
}

fn default_shell_program() -> String {
    "shizuku".to_string()
}

fn default_command_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_tick_rate() -> u64 {
    50
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Load configuration: embedded defaults overlaid by the user config,
    /// if one exists. A malformed user config is reported, not fatal.
    pub fn load() -> ConfigResult<Self> {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG)
            .map_err(|e| ConfigError::Parse(format!("embedded default config: {e}")))?;

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                let user_config = Self::load_from_file(&user_config_path)?;
                tracing::info!(path = %user_config_path.display(), "loaded user config");
                return Ok(user_config);
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))
    }

    /// The user config path (~/.config/dexterity/config.toml)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|config_dir| config_dir.join("dexterity").join("config.toml"))
    }

    /// Save configuration to the user config path
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::user_config_path().ok_or_else(|| {
            ConfigError::Serialize("could not determine user config directory".to_string())
        })?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(&config_path, toml_string)?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|_| Self {
            shell: ShellConfig::default(),
            tui: TuiConfig::default(),
            logging: LoggingConfig::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_embedded_default_config_is_valid() {
        let result: Result<AppConfig, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(result.is_ok(), "default config should be valid TOML");
    }

    #[test]
    fn test_default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.shell.program, "shizuku");
        assert_eq!(config.shell.command_timeout_secs, 30);
        assert_eq!(config.shell.connect_timeout_secs, 5);
        assert_eq!(config.tui.tick_rate_ms, 50);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file_output);
    }

    #[test]
    fn test_timeout_accessors() {
        let config = ShellConfig::default();
        assert_eq!(config.command_timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = AppConfig::default();
        let toml_string = toml::to_string(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_string).unwrap();

        assert_eq!(parsed.shell.program, config.shell.program);
        assert_eq!(parsed.shell.command_timeout_secs, config.shell.command_timeout_secs);
        assert_eq!(parsed.tui.tick_rate_ms, config.tui.tick_rate_ms);
    }

    #[test]
    fn test_partial_config_uses_field_defaults() {
        let config: AppConfig = toml::from_str("[shell]\nprogram = \"adb shell\"\n").unwrap();
        assert_eq!(config.shell.program, "adb shell");
        assert_eq!(config.shell.command_timeout_secs, 30);
        assert_eq!(config.tui.tick_rate_ms, 50);
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[shell]\ncommand_timeout_secs = 120").unwrap();

        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.shell.command_timeout_secs, 120);
        assert_eq!(config.shell.program, "shizuku");
    }

    #[test]
    fn test_load_from_file_rejects_bad_toml() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml [[").unwrap();

        let result = AppConfig::load_from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
