//! The two deployment variants of the payload cipher.
//!
//! Identical contract, different trust boundaries: `LocalPayloadCipher`
//! holds the secret in this process (best-effort protection, since anyone
//! who can read process memory can read the secret); `HttpPayloadCipher`
//! forwards to the encryption API over an authenticated channel and never
//! sees the secret at all. Crisis-plan and audit data use the remote
//! variant in production.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use serenity_core::defaults::REMOTE_TIMEOUT_SECS;
use serenity_core::{Error, PayloadCipher, Result};
use serenity_crypto::{CryptoError, EnvelopeCipher};

// =============================================================================
// LOCAL VARIANT
// =============================================================================

/// In-process payload cipher over a validated secret.
pub struct LocalPayloadCipher {
    inner: EnvelopeCipher,
}

impl std::fmt::Debug for LocalPayloadCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalPayloadCipher").finish_non_exhaustive()
    }
}

impl LocalPayloadCipher {
    /// Validate the secret and build the cipher. Validation failure is a
    /// fatal configuration error.
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let inner = EnvelopeCipher::new(secret).map_err(|e| match e {
            CryptoError::MissingSecret
            | CryptoError::SecretTooShort(_)
            | CryptoError::WeakSecret => Error::Config(e.to_string()),
            other => Error::Crypto(other.to_string()),
        })?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl PayloadCipher for LocalPayloadCipher {
    async fn encrypt(&self, plaintext: &str) -> Result<String> {
        self.inner
            .encrypt(plaintext)
            .map_err(|e| Error::Crypto(e.to_string()))
    }

    async fn decrypt(&self, envelope: &str) -> Result<String> {
        self.inner
            .decrypt(envelope)
            .map_err(|e| Error::Crypto(e.to_string()))
    }
}

// =============================================================================
// REMOTE VARIANT
// =============================================================================

#[derive(Serialize)]
struct EncryptRequest<'a> {
    data: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EncryptResponse {
    encrypted_data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DecryptRequest<'a> {
    encrypted_data: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DecryptResponse {
    decrypted_data: String,
}

/// Client of the remote encryption API. The secret lives on the server;
/// this process only ever sees envelopes.
pub struct HttpPayloadCipher {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpPayloadCipher {
    /// Build a client for the encryption API base URL and bearer credential.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REMOTE_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Remote(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }
}

#[async_trait]
impl PayloadCipher for HttpPayloadCipher {
    async fn encrypt(&self, plaintext: &str) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/encrypt-data", self.base_url))
            .bearer_auth(&self.token)
            .json(&EncryptRequest { data: plaintext })
            .send()
            .await?;

        if !response.status().is_success() {
            // The server never explains crypto failures; neither do we
            return Err(Error::Crypto(format!(
                "encryption service returned status {}",
                response.status()
            )));
        }

        let body: EncryptResponse = response.json().await?;
        Ok(body.encrypted_data)
    }

    async fn decrypt(&self, envelope: &str) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/decrypt-data", self.base_url))
            .bearer_auth(&self.token)
            .json(&DecryptRequest {
                encrypted_data: envelope,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Crypto(format!(
                "decryption service returned status {}",
                response.status()
            )));
        }

        let body: DecryptResponse = response.json().await?;
        Ok(body.decrypted_data)
    }
}

impl std::fmt::Debug for HttpPayloadCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPayloadCipher")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
