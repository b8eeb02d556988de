// src/main.rs
use axum::{extract::Extension, middleware, Router};
use dotenv::dotenv;
use reqwest::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod auth;
mod common;
mod cors_middleware;
mod relay;
mod services;
mod users;

use auth::google::GoogleVerifier;
use auth::TokenService;
use common::AppState;
use cors_middleware::CorsConfig;
use services::{OpenAIService, UpstreamService};
use users::UserDirectory;

/// Request timeout on the shared HTTP client; bounds how long a stalled
/// upstream can hold a request handler.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounded startup wait for the AI backend.
const STARTUP_ATTEMPTS: u32 = 10;
const STARTUP_DELAY: Duration = Duration::from_secs(1);

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/compass.db".to_string());
    let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
        warn!("JWT_SECRET is not set; using an insecure default. Do not deploy like this.");
        "PLEASE_CHANGE_ME".to_string()
    });
    let google_client_id = env::var("GOOGLE_CLIENT_ID").unwrap_or_else(|_| {
        warn!("GOOGLE_CLIENT_ID is not set; Google tokens will fail the audience check.");
        "Placeholder".to_string()
    });
    let flask_url = env::var("FLASK_URL").unwrap_or_else(|_| "http://flask:5000".to_string());
    let openai_api_key = env::var("OPENAI_API_KEY").ok();
    let openai_model = env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
    let cors_origin =
        env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let roadmap_language = env::var("ROADMAP_LANGUAGE").unwrap_or_else(|_| "czech".to_string());

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let http_client = Client::builder().timeout(HTTP_TIMEOUT).build()?;

    let upstream = UpstreamService::new(http_client.clone(), flask_url);
    // Fail fast at boot if the AI backend is down; failures after boot are
    // soft per-request errors.
    upstream
        .wait_until_ready(STARTUP_ATTEMPTS, STARTUP_DELAY)
        .await?;

    let tokens = TokenService::new(jwt_secret);
    let google = GoogleVerifier::new(http_client.clone(), google_client_id);
    let directory = UserDirectory::new(pool);
    let openai = Arc::new(OpenAIService::new(http_client, openai_api_key, openai_model));

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        tokens,
        google,
        directory,
        upstream,
        openai,
        roadmap_language,
    };

    let shared = Arc::new(RwLock::new(app_state));
    let cors = CorsConfig::new(&cors_origin)?;

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .merge(auth::auth_routes())
        .merge(users::users_routes())
        .merge(relay::relay_routes())
        .fallback(common::error::not_found)
        .layer(middleware::from_fn(cors_middleware::apply_cors))
        .layer(Extension(cors))
        .layer(Extension(shared))
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
