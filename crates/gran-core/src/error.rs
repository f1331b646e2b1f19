//! Error types for gran-core

use thiserror::Error;

/// Core error type for Granulet
#[derive(Error, Debug)]
pub enum CoreError {
    /// G001: Configuration file not found
    #[error("[G001] Config file not found: {path}. Run 'gran init' first.")]
    ConfigNotFound { path: String },

    /// G002: Failed to parse configuration file
    #[error("[G002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// G003: Invalid configuration value
    #[error("[G003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// G004: A migration file with the allocated name already exists
    #[error("[G004] Migration file already exists: {path}")]
    MigrationExists { path: String },

    /// G005: Migration name cannot be used as a file name slug
    #[error("[G005] Invalid migration name '{name}': {reason}")]
    InvalidMigrationName { name: String, reason: String },

    /// G006: Daily sequence exhausted for the version date
    #[error("[G006] No migration sequence numbers left for {date} (maximum {max} per day)")]
    SequenceExhausted { date: String, max: u32 },

    /// G007: IO error with file path context
    #[error("[G007] Failed to access '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::ConfigParseError {
            message: err.to_string(),
        }
    }
}
