//! Key derivation using PBKDF2-HMAC-SHA256.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult};

/// Minimum secret length in characters.
pub const MIN_SECRET_LENGTH: usize = 32;

/// PBKDF2 iteration count. Fixed by the envelope format: every envelope
/// ever written was derived with this count, so changing it breaks
/// decryption of existing data.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes, as embedded in the envelope.
pub const SALT_LEN: usize = 16;

/// Secrets that ship in sample configs and must never reach production.
const DENY_LIST: &[&str] = &[
    "serenity-secret-key",
    "your-encryption-key",
    "your-encryption-key-here",
    "changeme",
    "change-me-in-production",
    "default-key",
    "test-key",
    "secret",
    "password",
];

/// Key wrapper with automatic zeroization on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; 32],
}

impl DerivedKey {
    /// Create a new derived key from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { key: bytes }
    }

    /// Get the key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive a 256-bit AES key from the secret and a per-envelope salt.
///
/// Deterministic for a given (secret, salt) pair: decryption re-derives
/// the key from the salt embedded in the envelope.
pub fn derive_key(secret: &str, salt: &[u8; SALT_LEN]) -> CryptoResult<DerivedKey> {
    if secret.is_empty() {
        return Err(CryptoError::MissingSecret);
    }

    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);

    Ok(DerivedKey { key })
}

/// Validate secret strength.
///
/// Rejects empty secrets, secrets under [`MIN_SECRET_LENGTH`] characters,
/// and any deny-listed placeholder value. Runs once per process lifetime at
/// service initialization; failure is a fatal configuration error, not a
/// retryable one.
pub fn validate_secret(secret: &str) -> CryptoResult<()> {
    if secret.is_empty() {
        return Err(CryptoError::MissingSecret);
    }
    if DENY_LIST.contains(&secret) {
        return Err(CryptoError::WeakSecret);
    }
    if secret.chars().count() < MIN_SECRET_LENGTH {
        return Err(CryptoError::SecretTooShort(MIN_SECRET_LENGTH));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_SECRET: &str = "a-sufficiently-long-operator-chosen-secret";

    #[test]
    fn test_derive_key_deterministic() {
        let salt = [42u8; SALT_LEN];

        let key1 = derive_key(GOOD_SECRET, &salt).unwrap();
        let key2 = derive_key(GOOD_SECRET, &salt).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_salts() {
        let salt1 = [1u8; SALT_LEN];
        let salt2 = [2u8; SALT_LEN];

        let key1 = derive_key(GOOD_SECRET, &salt1).unwrap();
        let key2 = derive_key(GOOD_SECRET, &salt2).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_secrets() {
        let salt = [7u8; SALT_LEN];

        let key1 = derive_key(GOOD_SECRET, &salt).unwrap();
        let key2 = derive_key("another-sufficiently-long-secret-value", &salt).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_empty_secret() {
        let salt = [0u8; SALT_LEN];
        assert!(matches!(
            derive_key("", &salt),
            Err(CryptoError::MissingSecret)
        ));
    }

    #[test]
    fn test_validate_secret_success() {
        assert!(validate_secret(GOOD_SECRET).is_ok());
    }

    #[test]
    fn test_validate_secret_empty() {
        assert!(matches!(
            validate_secret(""),
            Err(CryptoError::MissingSecret)
        ));
    }

    #[test]
    fn test_validate_secret_too_short() {
        assert!(matches!(
            validate_secret("short-but-not-denied"),
            Err(CryptoError::SecretTooShort(MIN_SECRET_LENGTH))
        ));
    }

    #[test]
    fn test_validate_secret_deny_list() {
        // Deterministic rejection, every time
        for _ in 0..3 {
            assert!(matches!(
                validate_secret("serenity-secret-key"),
                Err(CryptoError::WeakSecret)
            ));
        }
        assert!(matches!(
            validate_secret("changeme"),
            Err(CryptoError::WeakSecret)
        ));
    }

    #[test]
    fn test_derived_key_debug_redacted() {
        let key = DerivedKey::from_bytes([0u8; 32]);
        let debug_str = format!("{:?}", key);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains('0'));
    }
}
