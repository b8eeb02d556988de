// src/cors_middleware.rs
//! Uniform cross-origin response policy
//!
//! Every outgoing response, success or error, matched route or fallback,
//! carries the same three CORS headers. OPTIONS requests are answered
//! immediately with 200 so preflights never reach the handlers.

use axum::{
    extract::{Extension, Request},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Allowed origin, parsed once at startup.
#[derive(Clone)]
pub struct CorsConfig {
    allow_origin: HeaderValue,
}

impl CorsConfig {
    pub fn new(origin: &str) -> Result<Self, header::InvalidHeaderValue> {
        Ok(Self {
            allow_origin: HeaderValue::from_str(origin)?,
        })
    }
}

/// Middleware applying the cross-origin policy to every response
pub async fn apply_cors(
    Extension(config): Extension<CorsConfig>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::OK.into_response();
        set_cors_headers(&mut response, &config);
        return response;
    }

    let mut response = next.run(request).await;
    set_cors_headers(&mut response, &config);
    response
}

fn set_cors_headers(response: &mut Response, config: &CorsConfig) {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        config.allow_origin.clone(),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
}
