//! Onboarding persistence handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Json};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::models::SaveOnboardingRequest;
use crate::auth::AuthedUser;
use crate::common::{parse_json_body, ApiError, AppState};

/// POST /__save_onboarding__
///
/// Persists the onboarding quiz answers for the authenticated user. An
/// unknown external id is a 404 rather than a silent no-op, so the client
/// learns the write was lost.
pub async fn save_onboarding(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    payload: Result<Json<SaveOnboardingRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = parse_json_body(payload)?;

    let onboarding = match body.onboarding {
        Value::Null => Value::Array(Vec::new()),
        value @ Value::Array(_) => value,
        _ => {
            return Err(ApiError::BadRequest(
                "onboarding must be an array".to_string(),
            ))
        }
    };

    let state = state_lock.read().await.clone();
    let updated = state
        .directory
        .save_onboarding(&authed.subject, &onboarding)
        .await
        .map_err(ApiError::DatabaseError)?;

    if !updated {
        warn!("onboarding update for unknown user");
        return Err(ApiError::NotFound("user not found".to_string()));
    }

    info!("onboarding saved");
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
