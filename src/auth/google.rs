//! Google ID-token verification
//!
//! Signature validation is delegated to Google's tokeninfo endpoint
//! (https://developers.google.com/identity/sign-in/web/backend-auth); this
//! layer validates the returned payload: subject and email present, token
//! not expired, audience equal to our client id, issuer trusted. Every
//! failure collapses to `None` so callers see a single unauthenticated
//! outcome.

use chrono::Utc;
use reqwest::Client;
use tracing::{debug, error, warn};

use crate::common::safe_email_log;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

const TRUSTED_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Identity resolved from a verified Google ID token. Transient value,
/// never persisted.
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    /// Google's stable subject identifier for the account.
    pub subject: String,
    pub email: String,
}

#[derive(Clone)]
pub struct GoogleVerifier {
    http: Client,
    client_id: String,
    tokeninfo_url: String,
}

impl GoogleVerifier {
    pub fn new(http: Client, client_id: impl Into<String>) -> Self {
        Self {
            http,
            client_id: client_id.into(),
            tokeninfo_url: TOKENINFO_URL.to_string(),
        }
    }

    /// Verifies an opaque ID token string. Returns the resolved identity,
    /// or `None` on any verification failure.
    pub async fn verify(&self, id_token: &str) -> Option<GoogleIdentity> {
        let url = format!("{}?id_token={}", self.tokeninfo_url, id_token);

        let resp = match self.http.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "HTTP error contacting Google tokeninfo endpoint");
                return None;
            }
        };

        if !resp.status().is_success() {
            warn!(http_status = %resp.status(), "Google tokeninfo rejected id token");
            return None;
        }

        let payload: serde_json::Value = match resp.json().await {
            Ok(j) => j,
            Err(e) => {
                warn!(error = %e, "failed to parse Google tokeninfo response");
                return None;
            }
        };

        debug!("Google tokeninfo responded, resolving payload");
        resolve_payload(&payload, &self.client_id, Utc::now().timestamp())
    }
}

/// Payload validation, factored out of the network call so it is unit
/// testable. `now` is a unix timestamp.
pub fn resolve_payload(
    payload: &serde_json::Value,
    client_id: &str,
    now: i64,
) -> Option<GoogleIdentity> {
    let sub = payload.get("sub").and_then(|v| v.as_str())?;
    let email = payload.get("email").and_then(|v| v.as_str())?;

    // tokeninfo returns numeric fields as strings
    let exp = payload
        .get("exp")
        .and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))?;
    if exp < now {
        warn!(token_exp = exp, "Google token has expired");
        return None;
    }

    let aud = payload.get("aud").and_then(|v| v.as_str())?;
    if aud != client_id {
        warn!(token_audience = %aud, "Google token audience mismatch");
        return None;
    }

    let iss = payload.get("iss").and_then(|v| v.as_str())?;
    if !TRUSTED_ISSUERS.contains(&iss) {
        warn!(token_issuer = %iss, "Google token issuer not trusted");
        return None;
    }

    let email_verified = payload
        .get("email_verified")
        .map(|v| v.as_bool().unwrap_or_else(|| v.as_str() == Some("true")));
    if email_verified == Some(false) {
        warn!(email = %safe_email_log(email), "Google token carries an unverified email");
    }

    Some(GoogleIdentity {
        subject: sub.to_string(),
        email: email.to_string(),
    })
}
