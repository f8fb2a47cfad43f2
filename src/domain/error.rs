//! Domain error types

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("\"{input}\" {reason} (use e.g. 45s, 2m, 1m30s)")]
pub struct DurationParseError {
    pub input: String,
    pub reason: &'static str,
}

/// Error when an unknown capture strategy is named
#[derive(Debug, Clone, Error)]
#[error("Invalid capture strategy: \"{input}\". Valid strategies are: cpal, ffmpeg")]
pub struct InvalidStrategyError {
    pub input: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
