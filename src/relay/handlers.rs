// src/relay/handlers.rs
//! Upstream relay handlers: AI prompt pass-through and roadmap generation

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Json, Query};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::auth::AuthedUser;
use crate::common::{parse_json_body, ApiError, AppState};
use crate::services::openai::OpenAIError;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PromptQuery {
    #[serde(default)]
    pub prompt: String,
    pub session: Option<String>,
    /// JSON-encoded onboarding answers, passed through to the backend.
    pub onboarding: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoadmapRequest {
    pub profession: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /__prompt__
///
/// Authenticated pass-through: forwards the prompt, session id and
/// onboarding context to the AI backend and relays its status and body
/// unchanged. Upstream failures are a generic 500.
pub async fn prompt(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(params): Query<PromptQuery>,
) -> Result<Response, ApiError> {
    let session = params.session.unwrap_or_else(|| "default".to_string());
    let onboarding: serde_json::Value = match params.onboarding {
        Some(raw) => serde_json::from_str(&raw)
            .map_err(|_| ApiError::BadRequest("onboarding must be valid JSON".to_string()))?,
        None => serde_json::Value::Array(Vec::new()),
    };

    debug!(subject = %authed.subject, session = %session, "relaying prompt to AI backend");

    let state = state_lock.read().await.clone();
    let reply = state
        .upstream
        .forward_prompt(&params.prompt, &session, &onboarding)
        .await
        .map_err(|_| ApiError::Upstream("AI backend error".to_string()))?;

    let status =
        StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = Response::builder().status(status);
    if let Some(content_type) = reply.content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }

    builder
        .body(Body::from(reply.body))
        .map_err(|_| ApiError::InternalServer("response build failed".to_string()))
}

/// POST /__generate_roadmap__
///
/// Builds a structured prompt from the requested profession and the
/// `X-Onboarding-Data` header, asks the model for a roadmap and returns
/// the unfenced output verbatim — the model is instructed to emit a JSON
/// array of steps, and the client parses it as such.
pub async fn generate_roadmap(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: Option<AuthedUser>,
    headers: HeaderMap,
    payload: Result<Json<RoadmapRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = parse_json_body(payload)?;
    let profession = body
        .profession
        .unwrap_or_else(|| "Frontend Developer".to_string());
    let onboarding_json = headers
        .get("X-Onboarding-Data")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("[]");

    let state = state_lock.read().await.clone();
    let prompt = build_roadmap_prompt(&profession, onboarding_json, &state.roadmap_language);

    info!(profession = %profession, "generating roadmap");

    let content = state
        .openai
        .chat_completion(&prompt)
        .await
        .map_err(|e| match e {
            OpenAIError::NotConfigured => {
                ApiError::InternalServer("AI model not configured".to_string())
            }
            _ => ApiError::Upstream("AI backend error".to_string()),
        })?;

    let unfenced = strip_code_fences(&content);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(unfenced))
        .map_err(|_| ApiError::InternalServer("response build failed".to_string()))
}

// ============================================================================
// Helpers
// ============================================================================

/// Builds the roadmap prompt. The step shape is dictated to the model so
/// the reply parses as a JSON array.
pub fn build_roadmap_prompt(profession: &str, onboarding_json: &str, language: &str) -> String {
    format!(
        "Use the following structured user onboarding information to personalize the roadmap:\n\
         \n\
         {onboarding_json}\n\
         \n\
         Generate a roadmap for the profession \"{profession}\".\n\
         Each roadmap step should include:\n\
         - id\n\
         - title\n\
         - description\n\
         - category (foundation/intermediate/advanced/expert)\n\
         - estimated_duration\n\
         - resources: for each resource, provide an object with\n\
           - name: the resource name\n\
           - url: the link to the resource\n\
         Return the output as valid JSON array of steps. Do it in {language}."
    )
}

/// Strips a leading ```json (or bare ```) fence and a trailing ``` fence,
/// leaving the payload untouched otherwise.
pub fn strip_code_fences(text: &str) -> String {
    let mut out = text.trim();
    if let Some(rest) = out.strip_prefix("```json") {
        out = rest.trim_start();
    } else if let Some(rest) = out.strip_prefix("```") {
        out = rest.trim_start();
    }
    if let Some(rest) = out.strip_suffix("```") {
        out = rest.trim_end();
    }
    out.to_string()
}
