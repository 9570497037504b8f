//! # serenity-crypto
//!
//! Envelope encryption for serenity's sensitive payloads (crisis plans,
//! audit-event detail).
//!
//! ## Cryptographic Primitives
//!
//! - **Symmetric cipher**: AES-256-GCM (AEAD)
//! - **Key derivation**: PBKDF2-HMAC-SHA256, 100,000 iterations, fresh
//!   16-byte salt per encryption
//! - **Random generation**: OS CSPRNG
//!
//! ## Envelope Format
//!
//! ```text
//! base64( salt (16 bytes) ‖ nonce (12 bytes) ‖ ciphertext + tag )
//! ```
//!
//! The envelope is self-describing: decryption needs only the secret, never
//! side-channel metadata. Tampering anywhere in the envelope is detected by
//! the GCM authentication tag (or by key re-derivation from a corrupted
//! salt), and decryption never returns partial plaintext.
//!
//! ## Example
//!
//! ```rust
//! use serenity_crypto::EnvelopeCipher;
//!
//! let cipher = EnvelopeCipher::new("an-operator-chosen-secret-of-32+-chars").unwrap();
//!
//! let envelope = cipher.encrypt(r#"{"warningSigns":["isolation"]}"#).unwrap();
//! let plaintext = cipher.decrypt(&envelope).unwrap();
//! assert_eq!(plaintext, r#"{"warningSigns":["isolation"]}"#);
//! ```
//!
//! Secret validation happens once, at construction: empty secrets, secrets
//! under 32 characters, and known placeholder values are rejected with a
//! fatal configuration error.

pub mod cipher;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod service;

// Re-export commonly used types
pub use envelope::{Envelope, MIN_ENVELOPE_LEN};
pub use error::{CryptoError, CryptoResult};
pub use kdf::{derive_key, validate_secret, DerivedKey, MIN_SECRET_LENGTH, PBKDF2_ITERATIONS};
pub use service::EnvelopeCipher;
