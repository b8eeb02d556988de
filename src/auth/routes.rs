//! Authentication routes

use axum::{routing::post, Router};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /__signup_google__` - Google sign-up (409 for existing users)
/// - `POST /__signin_google__` - Google sign-in (upsert)
/// - `POST /__signup__` - password sign-up
/// - `POST /__signin__` - password sign-in
pub fn auth_routes() -> Router {
    Router::new()
        .route("/__signup_google__", post(handlers::signup_google))
        .route("/__signin_google__", post(handlers::signin_google))
        .route("/__signup__", post(handlers::signup))
        .route("/__signin__", post(handlers::signin))
}
