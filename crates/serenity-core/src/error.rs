//! Error types for serenity.

use thiserror::Error;

/// Result type alias using serenity's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for serenity operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Local database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Local durable store failed outside of SQL (fallback file store, layout)
    #[error("Store error: {0}")]
    Store(String),

    /// Remote store operation failed (network or remote-side rejection)
    #[error("Remote error: {0}")]
    Remote(String),

    /// Cryptographic operation failed (no detail beyond the category)
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Authentication/authorization failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Remote(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_store() {
        let err = Error::Store("fallback file missing".to_string());
        assert_eq!(err.to_string(), "Store error: fallback file missing");
    }

    #[test]
    fn test_error_display_remote() {
        let err = Error::Remote("connection refused".to_string());
        assert_eq!(err.to_string(), "Remote error: connection refused");
    }

    #[test]
    fn test_error_display_crypto() {
        let err = Error::Crypto("decryption failed".to_string());
        assert_eq!(err.to_string(), "Crypto error: decryption failed");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing encryption secret".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: missing encryption secret"
        );
    }

    #[test]
    fn test_error_display_unauthorized() {
        let err = Error::Unauthorized("invalid token".to_string());
        assert_eq!(err.to_string(), "Unauthorized: invalid token");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
