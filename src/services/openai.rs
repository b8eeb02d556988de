// src/services/openai.rs
//! Chat-completions client for roadmap generation

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
pub enum OpenAIError {
    #[error("API key not configured")]
    NotConfigured,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

pub struct OpenAIService {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAIService {
    pub fn new(client: Client, api_key: Option<String>, model: String) -> Self {
        Self {
            client,
            api_key,
            base_url: "https://api.openai.com".to_string(),
            model,
        }
    }

    /// Sends a single user message to the chat-completions API and returns
    /// the first choice's content.
    pub async fn chat_completion(&self, prompt: &str) -> Result<String, OpenAIError> {
        let api_key = self.api_key.as_deref().ok_or(OpenAIError::NotConfigured)?;

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.7,
        };

        debug!(model = %self.model, "sending chat completion request");

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "OpenAI request failed");
                OpenAIError::RequestFailed(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(http_status = %status, body = %body, "OpenAI returned an error");
            return Err(OpenAIError::RequestFailed(format!("status {}", status)));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| OpenAIError::InvalidResponse(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            info!(
                model = %self.model,
                tokens_used = usage.total_tokens,
                "chat completion finished"
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| OpenAIError::InvalidResponse("no choices in response".to_string()))
    }
}
