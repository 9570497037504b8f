//! Error types for cryptographic operations.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// No secret was provided at all.
    #[error("Encryption secret is not configured")]
    MissingSecret,

    /// Secret shorter than the required minimum.
    #[error("Encryption secret too short (minimum {0} characters required)")]
    SecretTooShort(usize),

    /// Secret matches a known placeholder/default value.
    #[error("Encryption secret matches a known default value and must be replaced")]
    WeakSecret,

    /// Key derivation failed.
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// Encryption failed.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed - wrong key, tampered envelope, or corrupted data.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Envelope too short to contain salt and nonce.
    #[error("Envelope too short: {got} bytes, need at least {need}")]
    EnvelopeTooShort { got: usize, need: usize },

    /// Envelope is not valid base64.
    #[error("Invalid envelope encoding: {0}")]
    InvalidEncoding(String),

    /// Decrypted bytes are not valid UTF-8.
    #[error("Decrypted payload is not valid UTF-8")]
    InvalidUtf8,
}

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
