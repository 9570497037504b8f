//! Encrypt/decrypt HTTP handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::AppState;

// =============================================================================
// REQUEST/RESPONSE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct EncryptRequest {
    /// Plaintext payload. Callers pass JSON-stringified records.
    pub data: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptResponse {
    pub encrypted_data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptRequest {
    pub encrypted_data: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptResponse {
    pub decrypted_data: String,
}

type HandlerError = (StatusCode, Json<serde_json::Value>);

fn bad_request(field: &str) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": "missing_field",
            "error_description": format!("Required field '{field}' is missing")
        })),
    )
}

/// Generic 500 without crypto detail: tampered, wrong key, and unconfigured
/// secret all collapse to the same opaque failure for callers.
fn internal_error(kind: &str) -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": kind })),
    )
}

// =============================================================================
// HANDLERS
// =============================================================================

/// Encrypt an opaque payload.
///
/// POST /encrypt-data
pub async fn encrypt_data(
    State(state): State<AppState>,
    Json(req): Json<EncryptRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let Some(data) = req.data.filter(|d| !d.is_empty()) else {
        return Err(bad_request("data"));
    };

    let cipher = state.cipher().map_err(|e| {
        error!(
            subsystem = "api",
            component = "routes",
            op = "encrypt",
            error = %e,
            "Encryption secret failed validation at startup"
        );
        internal_error("encryption_unavailable")
    })?;

    let encrypted = cipher.encrypt(&data).map_err(|e| {
        error!(
            subsystem = "api",
            component = "routes",
            op = "encrypt",
            error = %e,
            "Encryption failed"
        );
        internal_error("encryption_failed")
    })?;

    Ok(Json(EncryptResponse {
        encrypted_data: encrypted,
    }))
}

/// Decrypt an envelope produced by `/encrypt-data`.
///
/// POST /decrypt-data
pub async fn decrypt_data(
    State(state): State<AppState>,
    Json(req): Json<DecryptRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let Some(encrypted) = req.encrypted_data.filter(|d| !d.is_empty()) else {
        return Err(bad_request("encryptedData"));
    };

    let cipher = state.cipher().map_err(|e| {
        error!(
            subsystem = "api",
            component = "routes",
            op = "decrypt",
            error = %e,
            "Encryption secret failed validation at startup"
        );
        internal_error("decryption_unavailable")
    })?;

    let decrypted = cipher.decrypt(&encrypted).map_err(|e| {
        // Malformed envelope and tag mismatch are not distinguished in the
        // response
        warn!(
            subsystem = "api",
            component = "routes",
            op = "decrypt",
            error = %e,
            "Decryption failed"
        );
        internal_error("decryption_failed")
    })?;

    Ok(Json(DecryptResponse {
        decrypted_data: decrypted,
    }))
}

/// Liveness probe.
///
/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
