//! User routes

use axum::{routing::post, Router};

use super::handlers;

/// Creates and returns the users router
///
/// # Routes
/// - `POST /__save_onboarding__` - persist onboarding answers (Bearer auth)
pub fn users_routes() -> Router {
    Router::new().route("/__save_onboarding__", post(handlers::save_onboarding))
}
