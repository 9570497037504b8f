//! The self-describing envelope format.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Salt (16 bytes)                              │
//! ├──────────────────────────────────────────────┤
//! │ Nonce (12 bytes)                             │
//! ├──────────────────────────────────────────────┤
//! │ Ciphertext + GCM tag (16 bytes)              │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The whole bundle is base64-encoded into a single string. Decryption
//! needs nothing beyond the secret: salt and nonce travel inside the
//! envelope at fixed offsets.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::cipher::NONCE_LEN;
use crate::error::{CryptoError, CryptoResult};
use crate::kdf::SALT_LEN;

/// Minimum decoded envelope length: salt + nonce. Anything shorter is
/// rejected before key derivation is attempted.
pub const MIN_ENVELOPE_LEN: usize = SALT_LEN + NONCE_LEN;

/// Decoded envelope parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Concatenate and base64-encode into the wire/storage string.
    pub fn encode(&self) -> String {
        let mut raw = Vec::with_capacity(MIN_ENVELOPE_LEN + self.ciphertext.len());
        raw.extend_from_slice(&self.salt);
        raw.extend_from_slice(&self.nonce);
        raw.extend_from_slice(&self.ciphertext);
        BASE64.encode(raw)
    }

    /// Decode a base64 envelope string and split it at the fixed offsets.
    pub fn decode(encoded: &str) -> CryptoResult<Self> {
        let raw = BASE64
            .decode(encoded.trim())
            .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;

        if raw.len() < MIN_ENVELOPE_LEN {
            return Err(CryptoError::EnvelopeTooShort {
                got: raw.len(),
                need: MIN_ENVELOPE_LEN,
            });
        }

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&raw[..SALT_LEN]);

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&raw[SALT_LEN..MIN_ENVELOPE_LEN]);

        Ok(Self {
            salt,
            nonce,
            ciphertext: raw[MIN_ENVELOPE_LEN..].to_vec(),
        })
    }
}
