//! Error types for dexterity
//!
//! Centralized error handling using thiserror for type-safe errors.

use thiserror::Error;

/// Top-level error type
#[derive(Error, Debug)]
pub enum DexterityError {
    #[error("shell error: {0}")]
    Shell(#[from] ShellError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("TUI error: {0}")]
    Tui(#[from] TuiError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the interactive shell session
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("failed to spawn shell: {reason}")]
    SpawnFailed { reason: String },

    #[error("shell prompt not seen within {waited_secs}s of connecting")]
    ConnectTimeout { waited_secs: u64 },

    #[error("session is not connected")]
    NotConnected,

    #[error("command timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("shell closed its output stream")]
    Disconnected,

    #[error("shell I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("failed to serialize config: {0}")]
    Serialize(String),
}

/// Terminal setup/teardown errors
#[derive(Error, Debug)]
pub enum TuiError {
    #[error("terminal initialization failed: {0}")]
    InitFailed(String),

    #[error("crossterm error: {0}")]
    Crossterm(#[from] std::io::Error),
}

/// Result type alias for dexterity operations
pub type Result<T> = std::result::Result<T, DexterityError>;

/// Result type alias for shell session operations
pub type ShellResult<T> = std::result::Result<T, ShellError>;

/// Result type alias for config operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for terminal operations
pub type TuiResult<T> = std::result::Result<T, TuiError>;
