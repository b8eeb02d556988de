//! Authentication handlers
//!
//! Sign-up and sign-in for both credential variants. The conflict policy is
//! deliberately split per route: sign-up routes reject an already-known
//! external id with 409, sign-in routes accept it and return the existing
//! account.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::models::{AuthRequest, AuthResponse, GoogleLoginRequest};
use super::password::{hash_password, verify_password};
use crate::common::{parse_json_body, safe_email_log, ApiError, AppState};
use crate::users::DirectoryError;

const PROVIDER_GOOGLE: &str = "google";
const PROVIDER_PASSWORD: &str = "password";

/// POST /__signup_google__
///
/// Verifies the Google ID token, creates the account and mints a session
/// token. An existing account for the same Google subject is a 409.
pub async fn signup_google(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    payload: Result<Json<GoogleLoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let body = parse_json_body(payload)?;
    let state = state_lock.read().await.clone();

    let identity = state
        .google
        .verify(&body.id_token)
        .await
        .ok_or_else(|| ApiError::Unauthorized("invalid google token".to_string()))?;

    match state
        .directory
        .create(PROVIDER_GOOGLE, &identity.subject, &identity.email, None)
        .await
    {
        Ok(user_id) => {
            info!(
                user_id,
                email = %safe_email_log(&identity.email),
                "new account created via Google sign-up"
            );
        }
        Err(DirectoryError::Conflict) => {
            warn!(
                email = %safe_email_log(&identity.email),
                "Google sign-up for existing user"
            );
            return Err(ApiError::Conflict("user already exists".to_string()));
        }
        Err(DirectoryError::Database(e)) => return Err(ApiError::DatabaseError(e)),
    }

    let token = state.tokens.issue(&identity.subject)?;
    Ok(Json(AuthResponse {
        token,
        username: Some(identity.email),
    }))
}

/// POST /__signin_google__
///
/// Verifies the Google ID token and upserts: first sign-in creates the row,
/// later sign-ins return the existing one.
pub async fn signin_google(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    payload: Result<Json<GoogleLoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let body = parse_json_body(payload)?;
    let state = state_lock.read().await.clone();

    let identity = state
        .google
        .verify(&body.id_token)
        .await
        .ok_or_else(|| ApiError::Unauthorized("invalid google token".to_string()))?;

    let (user_id, existed) = state
        .directory
        .upsert_on_signin(PROVIDER_GOOGLE, &identity.subject, &identity.email)
        .await
        .map_err(|e| match e {
            // the display handle is taken by a different account
            DirectoryError::Conflict => ApiError::Conflict("user already exists".to_string()),
            DirectoryError::Database(e) => ApiError::DatabaseError(e),
        })?;

    info!(
        user_id,
        existed,
        email = %safe_email_log(&identity.email),
        "Google sign-in successful"
    );

    let token = state.tokens.issue(&identity.subject)?;
    Ok(Json(AuthResponse {
        token,
        username: Some(identity.email),
    }))
}

/// POST /__signup__
pub async fn signup(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let body = parse_json_body(payload)?;
    if body.username.is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".to_string(),
        ));
    }

    let state = state_lock.read().await.clone();
    let password_hash = hash_password(&body.password);

    match state
        .directory
        .create(
            PROVIDER_PASSWORD,
            &body.username,
            &body.username,
            Some(&password_hash),
        )
        .await
    {
        Ok(user_id) => {
            info!(user_id, "new account created via password sign-up");
        }
        Err(DirectoryError::Conflict) => {
            return Err(ApiError::Conflict("user already exists".to_string()));
        }
        Err(DirectoryError::Database(e)) => return Err(ApiError::DatabaseError(e)),
    }

    let token = state.tokens.issue(&body.username)?;
    Ok(Json(AuthResponse {
        token,
        username: None,
    }))
}

/// POST /__signin__
pub async fn signin(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let body = parse_json_body(payload)?;
    let state = state_lock.read().await.clone();

    let user = state
        .directory
        .find_by_username(&body.username)
        .await
        .map_err(ApiError::DatabaseError)?;

    // Unknown username and wrong password are indistinguishable to the caller.
    let user = match user {
        Some(u)
            if u.password_hash
                .as_deref()
                .map(|hash| verify_password(&body.password, hash))
                .unwrap_or(false) =>
        {
            u
        }
        _ => {
            warn!("password sign-in failed");
            return Err(ApiError::Unauthorized("invalid credentials".to_string()));
        }
    };

    info!(user_id = user.id, "password sign-in successful");

    let token = state.tokens.issue(&user.provider_id)?;
    Ok(Json(AuthResponse {
        token,
        username: None,
    }))
}
