//! Configuration errors.

use thiserror::Error;

/// Error raised while loading, validating or editing configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse {file}: {message} at line {line}, column {column}")]
    TomlParse {
        file: String,
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    Validation { field: String, reason: String },

    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create a validation error
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ConfigError::TomlParse { .. } => Some("Check the TOML syntax near the reported position"),
            ConfigError::Validation { .. } => {
                Some("Run 'libhub check' after fixing libhub.toml to validate it")
            },
            ConfigError::Io { .. } => None,
        }
    }
}
