//! The local-variant envelope cipher service.

use crate::cipher::{aes_gcm_decrypt, aes_gcm_encrypt, generate_nonce, generate_salt};
use crate::envelope::Envelope;
use crate::error::{CryptoError, CryptoResult};
use crate::kdf::{derive_key, validate_secret};

/// Authenticated envelope encryption with a process-held secret.
///
/// Construction validates the secret exactly once (minimum length and the
/// placeholder deny-list); a failed construction is terminal for the
/// process. Holders keep the `Err` and answer every later encrypt/decrypt
/// call with it instead of re-validating.
///
/// Every [`encrypt`](Self::encrypt) call derives a fresh key from a fresh
/// random salt, so the secret itself never has a single long-lived key, and
/// identical plaintexts never produce identical envelopes.
pub struct EnvelopeCipher {
    secret: String,
}

impl EnvelopeCipher {
    /// Validate the secret and build the cipher.
    pub fn new(secret: impl Into<String>) -> CryptoResult<Self> {
        let secret = secret.into();
        validate_secret(&secret)?;
        Ok(Self { secret })
    }

    /// Encrypt a UTF-8 plaintext into a base64 envelope string.
    pub fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
        let salt = generate_salt();
        let nonce = generate_nonce();
        let key = derive_key(&self.secret, &salt)?;

        let ciphertext = aes_gcm_encrypt(key.as_bytes(), &nonce, plaintext.as_bytes())?;

        Ok(Envelope {
            salt,
            nonce,
            ciphertext,
        }
        .encode())
    }

    /// Decrypt a base64 envelope string produced by [`encrypt`](Self::encrypt).
    ///
    /// Fails on malformed envelopes, tag mismatch (tampering or wrong
    /// secret), and non-UTF-8 plaintext; never returns partial data.
    pub fn decrypt(&self, encoded: &str) -> CryptoResult<String> {
        let envelope = Envelope::decode(encoded)?;
        let key = derive_key(&self.secret, &envelope.salt)?;

        let plaintext = aes_gcm_decrypt(key.as_bytes(), &envelope.nonce, &envelope.ciphertext)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)
    }
}

impl std::fmt::Debug for EnvelopeCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeCipher")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
