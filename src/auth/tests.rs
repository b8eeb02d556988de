//! Tests for auth module
//!
//! These tests verify core authentication functionality including:
//! - Session token issuing and verification
//! - Google tokeninfo payload resolution
//! - Password hashing

#[cfg(test)]
mod tests {
    use super::super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde_json::json;

    // ---- session tokens ----

    #[test]
    fn token_round_trip_returns_subject() {
        let tokens = TokenService::new("test_secret_key");
        let token = tokens.issue("alice").expect("issue token");

        assert_eq!(tokens.verify(&token), Some("alice".to_string()));
    }

    #[test]
    fn expired_token_fails_verification() {
        let tokens = TokenService::new("test_secret_key");
        // issued two hours ago, TTL is one hour
        let token = tokens
            .issue_at("alice", Utc::now() - Duration::seconds(7200))
            .expect("issue token");

        assert_eq!(tokens.verify(&token), None);
    }

    #[test]
    fn tampered_signature_fails_verification() {
        let tokens = TokenService::new("test_secret_key");
        let token = tokens.issue("alice").expect("issue token");

        let mut tampered = token.clone();
        let last = tampered.pop().expect("non-empty token");
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert_eq!(tokens.verify(&tampered), None);
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let issuer = TokenService::new("secret_one");
        let verifier = TokenService::new("secret_two");
        let token = issuer.issue("alice").expect("issue token");

        assert_eq!(verifier.verify(&token), None);
    }

    #[test]
    fn wrong_issuer_fails_verification() {
        let secret = "test_secret_key";
        let claims = token::Claims {
            sub: "alice".to_string(),
            iss: "someone-else".to_string(),
            exp: (Utc::now() + Duration::seconds(3600)).timestamp() as usize,
        };
        let foreign = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encode token");

        let tokens = TokenService::new(secret);
        assert_eq!(tokens.verify(&foreign), None);
    }

    // ---- Google tokeninfo payload resolution ----

    fn valid_payload() -> serde_json::Value {
        json!({
            "sub": "google-subject-123",
            "email": "alice@example.com",
            "aud": "client-id-1",
            "iss": "accounts.google.com",
            "exp": (Utc::now() + Duration::seconds(3600)).timestamp(),
            "email_verified": "true",
        })
    }

    #[test]
    fn valid_payload_resolves_identity() {
        let now = Utc::now().timestamp();
        let identity =
            google::resolve_payload(&valid_payload(), "client-id-1", now).expect("identity");

        assert_eq!(identity.subject, "google-subject-123");
        assert_eq!(identity.email, "alice@example.com");
    }

    #[test]
    fn audience_mismatch_is_rejected() {
        let now = Utc::now().timestamp();
        assert!(google::resolve_payload(&valid_payload(), "another-client", now).is_none());
    }

    #[test]
    fn expired_google_token_is_rejected() {
        let mut payload = valid_payload();
        payload["exp"] = json!(Utc::now().timestamp() - 60);
        let now = Utc::now().timestamp();

        assert!(google::resolve_payload(&payload, "client-id-1", now).is_none());
    }

    #[test]
    fn string_exp_from_tokeninfo_is_accepted() {
        // tokeninfo returns numeric fields as strings
        let mut payload = valid_payload();
        let exp = (Utc::now() + Duration::seconds(3600)).timestamp();
        payload["exp"] = json!(exp.to_string());
        let now = Utc::now().timestamp();

        assert!(google::resolve_payload(&payload, "client-id-1", now).is_some());
    }

    #[test]
    fn missing_subject_is_rejected() {
        let mut payload = valid_payload();
        payload.as_object_mut().expect("object").remove("sub");
        let now = Utc::now().timestamp();

        assert!(google::resolve_payload(&payload, "client-id-1", now).is_none());
    }

    #[test]
    fn untrusted_issuer_is_rejected() {
        let mut payload = valid_payload();
        payload["iss"] = json!("https://evil.example.com");
        let now = Utc::now().timestamp();

        assert!(google::resolve_payload(&payload, "client-id-1", now).is_none());
    }

    // ---- bearer extraction ----

    use axum::extract::FromRequestParts;
    use axum::http::{header::AUTHORIZATION, Request, StatusCode};
    use axum::response::IntoResponse;
    use reqwest::Client;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use crate::common::migrations::run_migrations;
    use crate::common::{ApiError, AppState};
    use crate::services::{OpenAIService, UpstreamService};
    use crate::users::UserDirectory;

    const EXTRACTOR_SECRET: &str = "test_secret_key";

    async fn test_state() -> Arc<RwLock<AppState>> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        run_migrations(&pool).await.expect("migrations");

        let http = Client::new();
        let state = AppState {
            tokens: TokenService::new(EXTRACTOR_SECRET),
            google: google::GoogleVerifier::new(http.clone(), "client-id-1"),
            directory: UserDirectory::new(pool),
            upstream: UpstreamService::new(http.clone(), "http://localhost:5000"),
            openai: Arc::new(OpenAIService::new(http, None, "gpt-4o-mini".to_string())),
            roadmap_language: "czech".to_string(),
        };
        Arc::new(RwLock::new(state))
    }

    async fn extract_authed_user(authorization: Option<&str>) -> Result<AuthedUser, ApiError> {
        let mut builder = Request::builder().uri("/__prompt__");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let request = builder
            .extension(test_state().await)
            .body(())
            .expect("request");
        let (mut parts, _) = request.into_parts();

        AuthedUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn missing_authorization_header_is_401() {
        let err = extract_authed_user(None).await.expect_err("must reject");

        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn foreign_signature_is_403() {
        let foreign = TokenService::new("another_secret")
            .issue("alice")
            .expect("issue token");

        let err = extract_authed_user(Some(&format!("Bearer {}", foreign)))
            .await
            .expect_err("must reject");

        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn multibyte_garbage_token_is_403() {
        let err = extract_authed_user(Some("Bearer €€€"))
            .await
            .expect_err("must reject");

        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn valid_bearer_token_resolves_subject() {
        let token = TokenService::new(EXTRACTOR_SECRET)
            .issue("google-subject-123")
            .expect("issue token");

        let authed = extract_authed_user(Some(&format!("Bearer {}", token)))
            .await
            .expect("must accept");

        assert_eq!(authed.subject, "google-subject-123");
    }

    // ---- password hashing ----

    #[test]
    fn password_hash_matches_known_vector() {
        assert_eq!(
            password::hash_password("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }

    #[test]
    fn password_verification() {
        let hash = password::hash_password("hunter2");

        assert!(password::verify_password("hunter2", &hash));
        assert!(!password::verify_password("hunter3", &hash));
    }
}
