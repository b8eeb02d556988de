//! Authentication data models

use serde::{Deserialize, Serialize};

/// Body of the Google sign-up/sign-in routes.
#[derive(Deserialize)]
pub struct GoogleLoginRequest {
    #[serde(rename = "idToken")]
    pub id_token: String,
}

/// Body of the password sign-up/sign-in routes.
#[derive(Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// Successful authentication payload. The Google routes echo the display
/// handle back; the password routes return only the token.
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}
