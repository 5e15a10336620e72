//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request-level errors are rendered by
//! the identity crate through `kernel::error::AppError`.

use anyhow::Context;
use axum::{
    Router, http,
    http::{Method, header},
};
use identity::models::Provider;
use identity::{AuthConfig, PgCredentialStore, auth_router};
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_api=info,identity=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection (bounded retry, fatal when exhausted)
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let store = PgCredentialStore::connect(&database_url)
        .await
        .context("Credential store unavailable")?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(store.pool())
        .await?;

    tracing::info!("Migrations completed");

    let auth_config = auth_config_from_env()?;
    tracing::info!(
        providers = ?auth_config.enabled_providers,
        "Federated providers enabled"
    );

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/auth", auth_router(store, auth_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port = parse_port(env::var("PORT").ok().as_deref())?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Identity configuration from the environment
fn auth_config_from_env() -> anyhow::Result<AuthConfig> {
    let base = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        AuthConfig::default()
    };

    let session_secret = match env::var("SESSION_SECRET") {
        Ok(secret_b64) => parse_session_secret(&secret_b64)?,
        Err(_) if cfg!(debug_assertions) => base.session_secret,
        Err(_) => anyhow::bail!("SESSION_SECRET must be set in production"),
    };

    let providers = enabled_providers(|key| env::var(key).is_ok_and(|v| !v.is_empty()));

    Ok(AuthConfig {
        session_secret,
        ..base
    }
    .with_providers(providers))
}

/// Decode a base64 secret of exactly 32 bytes
fn parse_session_secret(secret_b64: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = platform::crypto::from_base64(secret_b64.trim())
        .context("SESSION_SECRET is not valid base64")?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| anyhow::anyhow!("SESSION_SECRET must be 32 bytes, got {}", b.len()))
}

/// A provider is enabled when its client credential is configured
fn enabled_providers(is_set: impl Fn(&str) -> bool) -> Vec<Provider> {
    [
        (Provider::Google, "GOOGLE_CLIENT_ID"),
        (Provider::Facebook, "FACEBOOK_CLIENT_ID"),
        (Provider::Twitter, "TWITTER_CONSUMER_KEY"),
    ]
    .into_iter()
    .filter(|(_, key)| is_set(key))
    .map(|(provider, _)| provider)
    .collect()
}

fn parse_port(raw: Option<&str>) -> anyhow::Result<u16> {
    match raw {
        Some(raw) => raw.parse().with_context(|| format!("Invalid PORT: {raw}")),
        None => Ok(DEFAULT_PORT),
    }
}
