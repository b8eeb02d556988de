// Helper functions for safe logging and request body handling

use axum::extract::rejection::JsonRejection;
use axum::Json;
use tracing::warn;

use super::error::ApiError;

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 {
            // chars, not bytes: these strings are attacker-controlled and
            // slicing by byte index panics on multi-byte input
            let first: String = parts[0].chars().take(1).collect();
            format!("{}***@{}", first, parts[1])
        } else {
            "***@***.***".to_string()
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
pub fn safe_token_log(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}

/// Unwraps an axum JSON body, converting any rejection (unparseable body,
/// wrong content type, missing fields) into an explicit 400 instead of the
/// framework's default plain-text response.
pub fn parse_json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            warn!(error = %rejection, "rejecting malformed request body");
            Err(ApiError::BadRequest("malformed request body".to_string()))
        }
    }
}
