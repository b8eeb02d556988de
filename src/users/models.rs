//! User directory models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User database row. `provider_id` is the external identity id: the
/// Google `sub` for Google accounts, the username itself for password
/// accounts. It never changes after insert.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub provider: String,
    pub provider_id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub onboarding: Option<String>,
    pub created_at: Option<String>,
}

/// Body of /__save_onboarding__.
#[derive(Deserialize)]
pub struct SaveOnboardingRequest {
    #[serde(default)]
    pub onboarding: serde_json::Value,
}
