//! Errors for ELM loading and indexing

use thiserror::Error;

/// Result type for ELM operations
pub type ElmResult<T> = Result<T, ElmError>;

/// Errors that can occur while loading or indexing an ELM library
#[derive(Debug, Error)]
pub enum ElmError {
    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document is not an ELM library
    #[error("Invalid ELM document: {message}")]
    InvalidDocument { message: String },

    /// Requested statement does not exist in the library
    #[error("Statement '{statement}' not found in library {library}")]
    StatementNotFound { library: String, statement: String },
}

impl ElmError {
    /// Create an invalid document error
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }

    /// Create a statement not found error
    pub fn statement_not_found(library: impl Into<String>, statement: impl Into<String>) -> Self {
        Self::StatementNotFound {
            library: library.into(),
            statement: statement.into(),
        }
    }
}
