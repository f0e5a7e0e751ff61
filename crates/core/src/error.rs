//! Error types for the remates system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the remates system.
#[derive(Error, Debug)]
pub enum Error {
    /// Uploaded file is neither CSV nor XML.
    #[error("Formato de archivo no soportado")]
    UnsupportedFormat,

    /// CSV/XML content is structurally invalid.
    #[error("Archivo mal formado: {0}")]
    MalformedInput(String),

    /// XML document root is neither `root` nor `remate`.
    #[error("XML no tiene la estructura esperada (root o remate)")]
    MissingRootElement,

    /// XML document carries no category-group structure.
    #[error("XML no tiene tipos de lote")]
    MissingCategoryData,

    /// Backend rejected a read or write.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Backend could not be reached or opened.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Record not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a malformed-input error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedInput(msg.into())
    }

    /// Create a persistence error.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Error::Persistence(msg.into())
    }

    /// Create a backend-unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Error::BackendUnavailable(msg.into())
    }

    /// Create a not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Whether this error is the caller's fault (maps to HTTP 400) as
    /// opposed to an infrastructure failure (HTTP 500).
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedFormat
                | Error::MalformedInput(_)
                | Error::MissingRootElement
                | Error::MissingCategoryData
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_classification() {
        assert!(Error::UnsupportedFormat.is_user_error());
        assert!(Error::malformed("bad row").is_user_error());
        assert!(Error::MissingRootElement.is_user_error());
        assert!(Error::MissingCategoryData.is_user_error());
        assert!(!Error::persistence("insert failed").is_user_error());
        assert!(!Error::unavailable("no backend").is_user_error());
        assert!(!Error::not_found("a1").is_user_error());
    }
}
