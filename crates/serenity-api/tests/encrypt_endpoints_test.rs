//! Integration tests for the encrypt/decrypt endpoints.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use serenity_api::{build_router, AppState};

const SECRET: &str = "integration-test-secret-of-adequate-len";
const TOKEN: &str = "service-token-1";

fn app() -> axum::Router {
    build_router(AppState::new(SECRET, vec![TOKEN.into()]))
}

fn post(uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_needs_no_credential() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_credential_is_unauthorized() {
    let response = app()
        .oneshot(post("/encrypt-data", None, r#"{"data":"x"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_credential_is_unauthorized() {
    let response = app()
        .oneshot(post("/decrypt-data", Some("not-issued"), r#"{"encryptedData":"x"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_data_field_is_bad_request() {
    let response = app()
        .oneshot(post("/encrypt-data", Some(TOKEN), "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "missing_field");
}

#[tokio::test]
async fn missing_encrypted_data_field_is_bad_request() {
    let response = app()
        .oneshot(post("/decrypt-data", Some(TOKEN), "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn encrypt_then_decrypt_roundtrips() {
    let app = app();
    let plaintext = r#"{"personalTriggers":["arguments"],"warningSigns":["isolation"]}"#;

    let response = app
        .clone()
        .oneshot(post(
            "/encrypt-data",
            Some(TOKEN),
            &serde_json::json!({ "data": plaintext }).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );

    let body = json_body(response).await;
    let envelope = body["encryptedData"].as_str().unwrap().to_string();
    assert_ne!(envelope, plaintext);

    let response = app
        .oneshot(post(
            "/decrypt-data",
            Some(TOKEN),
            &serde_json::json!({ "encryptedData": envelope }).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["decryptedData"], plaintext);
}

#[tokio::test]
async fn two_encryptions_of_same_payload_differ() {
    let app = app();
    let request_body = r#"{"data":"same payload"}"#;

    let mut envelopes = Vec::new();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post("/encrypt-data", Some(TOKEN), request_body))
            .await
            .unwrap();
        let body = json_body(response).await;
        envelopes.push(body["encryptedData"].as_str().unwrap().to_string());
    }
    assert_ne!(envelopes[0], envelopes[1]);
}

#[tokio::test]
async fn malformed_envelope_is_internal_error_without_detail() {
    let response = app()
        .oneshot(post(
            "/decrypt-data",
            Some(TOKEN),
            r#"{"encryptedData":"AAAA"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(body["error"], "decryption_failed");
    // No crypto detail leaks into the response
    assert!(body.get("error_description").is_none());
}

#[tokio::test]
async fn weak_secret_disables_both_endpoints() {
    let app = build_router(AppState::new("serenity-secret-key", vec![TOKEN.into()]));

    for (uri, body) in [
        ("/encrypt-data", r#"{"data":"x"}"#),
        ("/decrypt-data", r#"{"encryptedData":"x"}"#),
    ] {
        let response = app
            .clone()
            .oneshot(post(uri, Some(TOKEN), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

#[tokio::test]
async fn preflight_is_answered_permissively() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/encrypt-data")
                .header(header::ORIGIN, "https://app.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn responses_carry_request_id() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
