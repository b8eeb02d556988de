// src/services/upstream.rs
//! Client for the upstream AI backend (Flask service)

use reqwest::Client;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    RequestFailed(String),
}

/// Upstream reply, relayed back to the client unmodified.
pub struct UpstreamReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Thin relay to the AI backend. The shared reqwest client carries a
/// request timeout, so a stalled upstream cannot hold a handler forever.
#[derive(Clone)]
pub struct UpstreamService {
    http: Client,
    base_url: String,
}

impl UpstreamService {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Forwards a prompt to the AI backend and relays status and body
    /// verbatim. Transport failures (unreachable, timeout) are collapsed
    /// into [`UpstreamError::RequestFailed`].
    pub async fn forward_prompt(
        &self,
        prompt: &str,
        session: &str,
        onboarding: &serde_json::Value,
    ) -> Result<UpstreamReply, UpstreamError> {
        let url = format!("{}/__ai__", self.base_url);
        let body = serde_json::json!({
            "prompt": prompt,
            "session": session,
            "onboarding": onboarding,
        });

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, url = %url, "AI backend unreachable");
                UpstreamError::RequestFailed(e.to_string())
            })?;

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp
            .bytes()
            .await
            .map_err(|e| {
                error!(error = %e, "failed reading AI backend response body");
                UpstreamError::RequestFailed(e.to_string())
            })?
            .to_vec();

        Ok(UpstreamReply {
            status,
            content_type,
            body,
        })
    }

    /// Startup gate: the AI backend must answer with 200 before the server
    /// starts accepting traffic. Bounded retries, then fatal — failures
    /// after boot are handled per request instead.
    pub async fn wait_until_ready(&self, attempts: u32, delay: Duration) -> anyhow::Result<()> {
        for attempt in 1..=attempts {
            match self.http.get(&self.base_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    info!(attempt, "AI backend is reachable");
                    return Ok(());
                }
                Ok(resp) => {
                    warn!(attempt, http_status = %resp.status(), "AI backend not ready");
                }
                Err(e) => {
                    warn!(attempt, error = %e, "waiting for AI backend");
                }
            }
            tokio::time::sleep(delay).await;
        }

        anyhow::bail!("AI backend not reachable after {} attempts", attempts)
    }
}
