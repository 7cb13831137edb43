//! Error types and error handling for chunkwave.
//!
//! Two families live here. `ChunkwaveError` is what the library
//! surfaces to its callers (configuration problems, bad queries,
//! I/O while materializing chunks). `AnswerError` belongs to the
//! external answer boundary: it is recorded on a failed
//! `ProcessingResult` and never escapes a wave.

use thiserror::Error;

/// Result type alias for chunkwave operations
pub type Result<T> = std::result::Result<T, ChunkwaveError>;

/// Main error type for chunkwave
#[derive(Error, Debug)]
pub enum ChunkwaveError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl ChunkwaveError {
    /// Check if this error was raised by configuration validation
    pub fn is_config_error(&self) -> bool {
        matches!(self, ChunkwaveError::ConfigError(_))
    }

    /// Check if this is a bad request error (invalid input)
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            ChunkwaveError::InvalidQuery(_) | ChunkwaveError::ConfigError(_)
        )
    }
}

/// Failure reported by an external answer operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnswerError {
    #[error("answer failed: {0}")]
    Failed(String),

    #[error("answer operation unavailable: {0}")]
    Unavailable(String),

    #[error("answer timed out after {0}ms")]
    TimedOut(u64),

    #[error("answer worker panicked: {0}")]
    WorkerPanicked(String),
}

impl AnswerError {
    /// Shorthand for a generic failure
    pub fn failed(message: impl Into<String>) -> Self {
        AnswerError::Failed(message.into())
    }
}
