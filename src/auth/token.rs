//! Session token issuing and verification
//!
//! Stateless HS256 bearer tokens with a single identity claim. A token is
//! valid when the signature checks out against the configured secret, the
//! issuer matches and it has not expired; any other state is invalid and
//! there are no transitions between the two except the passage of time.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::common::ApiError;

/// Issuer claim stamped into every session token.
pub const TOKEN_ISSUER: &str = "compass-api";

/// Session token lifetime in seconds.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub exp: usize,
}

/// Issues and verifies session tokens. Holds only the read-only signing
/// secret, so it is safe to call from any number of handlers concurrently.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
}

impl TokenService {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Mints a session token for the given subject, expiring in one hour.
    pub fn issue(&self, subject: &str) -> Result<String, ApiError> {
        self.issue_at(subject, Utc::now())
    }

    /// Clock-injected variant of [`TokenService::issue`]; lets tests mint
    /// already-expired tokens without sleeping.
    pub fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> Result<String, ApiError> {
        let exp = (now + Duration::seconds(TOKEN_TTL_SECS)).timestamp() as usize;
        let claims = Claims {
            sub: subject.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            exp,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            error!(error = %e, "JWT encoding error");
            ApiError::InternalServer("jwt error".to_string())
        })
    }

    /// Checks signature, issuer equality and expiry (zero leeway). Any
    /// failure collapses to `None`; callers never learn which check failed.
    pub fn verify(&self, token: &str) -> Option<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.leeway = 0;

        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => Some(data.claims.sub),
            Err(e) => {
                warn!(error = %e, "session token validation failed");
                None
            }
        }
    }
}
