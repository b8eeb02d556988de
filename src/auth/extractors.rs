//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::common::{safe_token_log, ApiError, AppState};

/// Identity extracted from a verified session token.
///
/// A missing Authorization header rejects with 401; a present but invalid
/// (bad signature, wrong issuer, expired) token rejects with 403. The
/// subject is the external identity id the token was minted for; no
/// database lookup happens here, so handlers that need the row decide for
/// themselves what an unknown user means.
#[derive(Debug)]
pub struct AuthedUser {
    pub subject: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        let header_value = match parts.headers.get(AUTHORIZATION) {
            Some(value) => value,
            None => {
                warn!("authentication failed: missing Authorization header");
                return Err(ApiError::Unauthorized("missing auth".into()));
            }
        };

        // A header that is present but not decodable text is an invalid
        // credential, not a missing one
        let token = match header_value.to_str() {
            Ok(t) => t,
            Err(_) => {
                warn!("authentication failed: undecodable Authorization header");
                return Err(ApiError::Forbidden("invalid token".into()));
            }
        };

        // Accept "Bearer <token>" or a raw token
        let bare_token = token.strip_prefix("Bearer ").unwrap_or(token);

        match app_state.tokens.verify(bare_token) {
            Some(subject) => Ok(AuthedUser { subject }),
            None => {
                warn!(
                    token = %safe_token_log(bare_token),
                    "authentication failed: invalid session token"
                );
                Err(ApiError::Forbidden("invalid token".into()))
            }
        }
    }
}
