//! # serenity-api
//!
//! HTTP surface of the Encrypted Payload Service (the remote deployment
//! variant): the server holds the encryption secret, callers hold only a
//! bearer credential and move plaintext/envelopes over the authenticated
//! channel.
//!
//! Endpoints:
//! - `POST /encrypt-data` `{ "data": ... }` → `{ "encryptedData": ... }`
//! - `POST /decrypt-data` `{ "encryptedData": ... }` → `{ "decryptedData": ... }`
//! - `GET /health`
//!
//! The secret is validated once at startup. When validation fails the
//! service still comes up with the failure latched, so every
//! encrypt/decrypt request answers 500 without re-attempting validation.
//! A misconfigured deployment is loudly visible instead of silently
//! absent.

pub mod auth;
pub mod routes;

use std::sync::Arc;

use axum::{
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use serenity_core::defaults::BODY_LIMIT_BYTES;
use serenity_crypto::{CryptoError, EnvelopeCipher};

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Shared state: the once-validated cipher (or its terminal failure) and
/// the accepted service tokens.
#[derive(Clone)]
pub struct AppState {
    cipher: Arc<Result<EnvelopeCipher, CryptoError>>,
    tokens: Arc<Vec<String>>,
}

impl AppState {
    /// Validate the secret once and latch the outcome.
    pub fn new(secret: &str, tokens: Vec<String>) -> Self {
        Self {
            cipher: Arc::new(EnvelopeCipher::new(secret)),
            tokens: Arc::new(tokens),
        }
    }

    /// The validated cipher, or the latched validation failure.
    pub fn cipher(&self) -> Result<&EnvelopeCipher, &CryptoError> {
        self.cipher.as_ref().as_ref()
    }

    /// Whether the presented bearer token is an issued service token.
    pub fn accepts_token(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Whether startup secret validation succeeded.
    pub fn cipher_ready(&self) -> bool {
        self.cipher.is_ok()
    }
}

/// Build the router over injected state. Pure, so integration tests drive
/// it directly with `tower::ServiceExt::oneshot`.
pub fn build_router(state: AppState) -> Router {
    // Any origin: the endpoints are called from app contexts that present
    // no stable origin, and the bearer credential is the actual gate
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected = Router::new()
        .route("/encrypt-data", post(routes::encrypt_data))
        .route("/decrypt-data", post(routes::decrypt_data))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .merge(protected)
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "api-unit-test-secret-of-adequate-len-01";

    #[test]
    fn test_state_latches_validation_failure() {
        let state = AppState::new("serenity-secret-key", vec!["tok".into()]);
        assert!(!state.cipher_ready());
        // Stays failed on every inspection, no re-validation path exists
        assert!(state.cipher().is_err());
        assert!(state.cipher().is_err());
    }

    #[test]
    fn test_state_accepts_only_issued_tokens() {
        let state = AppState::new(SECRET, vec!["alpha".into(), "beta".into()]);
        assert!(state.accepts_token("alpha"));
        assert!(state.accepts_token("beta"));
        assert!(!state.accepts_token("gamma"));
    }
}
