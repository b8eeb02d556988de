//! Relay routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the relay router
///
/// # Routes
/// - `GET /__prompt__` - authenticated pass-through to the AI backend
/// - `POST /__generate_roadmap__` - roadmap generation (optional auth)
pub fn relay_routes() -> Router {
    Router::new()
        .route("/__prompt__", get(handlers::prompt))
        .route("/__generate_roadmap__", post(handlers::generate_roadmap))
}
