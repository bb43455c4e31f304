//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Uploaded input is missing, not a file, or not decodable
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input
        message: String,
    },

    /// A chunk of units could not be translated; the whole run is aborted
    #[error("Chunk translation failed for units {first}-{last}: {source}")]
    ChunkFailure {
        /// 1-based position of the first unit in the chunk
        first: usize,
        /// 1-based position of the last unit in the chunk
        last: usize,
        /// Underlying service error
        #[source]
        source: Box<TranslationError>,
    },

    /// Translation service answered with a non-success status
    #[error("Translation API error: {status} - {message}")]
    ServiceError {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        /// Transport error text
        message: String,
    },

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        /// What could not be read from the response
        message: String,
    },

    /// Request timeout
    #[error("Request timeout")]
    TimeoutError,

    /// File operation error
    #[error("File error: {path} - {message}")]
    FileError {
        /// Path of the file or directory
        path: String,
        /// Operating system error text
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Which setting is invalid
        message: String,
    },

    /// Wrapper for anyhow errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl TranslationError {
    /// Shorthand for an [`TranslationError::InvalidInput`]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        TranslationError::InvalidInput {
            message: message.into(),
        }
    }

    /// Whether this error came out of a chunk call to the translation service
    pub fn is_chunk_failure(&self) -> bool {
        matches!(self, TranslationError::ChunkFailure { .. })
    }
}

impl From<anyhow::Error> for TranslationError {
    fn from(err: anyhow::Error) -> Self {
        TranslationError::InternalError(err.to_string())
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
