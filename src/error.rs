/// Unified error types for the cinefile catalog core
use thiserror::Error;

/// Main error type for catalog operations
///
/// Display strings double as the user-facing failure taxonomy: the
/// repository renders them verbatim into `Resource::Error` messages.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Remote source answered with a non-success status
    #[error("HTTP {code}: {reason}")]
    HttpStatus { code: u16, reason: String },

    /// Transport-library / protocol-level failures
    #[error("HTTP Exception: {0}")]
    Protocol(String),

    /// Network unreachable, connect or timeout failures
    #[error("Network error: {0}")]
    Connectivity(String),

    /// Remote source answered 2xx with no usable document
    #[error("Empty response body")]
    EmptyBody,

    /// Malformed catalog payload (remote or cached)
    #[error("Malformed catalog payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Configuration validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal errors
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl CatalogError {
    /// Message rendered into `Resource::Error` at the repository boundary.
    ///
    /// The three transport classes and the empty-body case keep their own
    /// wording; everything else (storage, parse, internal) collapses into
    /// the unexpected bucket.
    pub fn resource_message(&self) -> String {
        match self {
            CatalogError::HttpStatus { .. }
            | CatalogError::Protocol(_)
            | CatalogError::Connectivity(_)
            | CatalogError::EmptyBody
            | CatalogError::Unexpected(_) => self.to_string(),
            CatalogError::Database(e) => format!("Unexpected error: {}", e),
            CatalogError::Malformed(e) => format!("Unexpected error: {}", e),
            CatalogError::Validation(msg) => format!("Unexpected error: {}", msg),
            CatalogError::Io(e) => format!("Unexpected error: {}", e),
        }
    }
}

/// Result type alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
