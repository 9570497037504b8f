//! serenity-api - HTTP server for the encrypted-payload service.

use std::net::SocketAddr;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use serenity_api::{build_router, AppState};
use serenity_core::defaults::SERVER_PORT;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "serenity_api=info,serenity_crypto=info,tower_http=warn".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let secret = std::env::var("SERENITY_ENCRYPTION_SECRET").unwrap_or_default();
    let tokens: Vec<String> = std::env::var("SERENITY_API_TOKENS")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect();

    if tokens.is_empty() {
        warn!(
            subsystem = "api",
            component = "main",
            "No service tokens configured (SERENITY_API_TOKENS); every request will be rejected"
        );
    }

    let state = AppState::new(&secret, tokens);
    if let Err(e) = state.cipher() {
        // Fatal configuration error, latched: the server stays up so the
        // misconfiguration is observable, but every cipher call answers 500
        error!(
            subsystem = "api",
            component = "main",
            error = %e,
            "Encryption secret failed validation; encrypt/decrypt disabled"
        );
    }

    let port: u16 = std::env::var("SERENITY_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(SERVER_PORT);

    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        subsystem = "api",
        component = "main",
        op = "startup",
        %addr,
        "serenity-api listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
