//! HTTP client for the hosted AI gateway (OpenAI-compatible chat completions).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://ai.gateway.lovable.dev/v1";
const DEFAULT_MODEL: &str = "google/gemini-2.5-pro";

#[derive(Debug, Clone, Error)]
pub enum AiGatewayError {
    #[error("gateway api key not configured")]
    MissingApiKey,
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("rate limited")]
    RateLimited,
    #[error("gateway payment required")]
    PaymentRequired,
    #[error("invalid gateway api key")]
    InvalidApiKey,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("json error: {0}")]
    Serde(String),
}

/// A chat message in the completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: i64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

/// Result of one completion call
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    /// Actual usage as reported by the provider; `None` when it omits the
    /// usage block and the caller must fall back to its own estimate.
    pub total_tokens: Option<i64>,
}

/// Seam over the gateway so tests can substitute a canned backend.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<Completion, AiGatewayError>;
}

/// Gateway client
#[derive(Debug, Clone)]
pub struct AiGatewayClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AiGatewayClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
    const TEMPERATURE: f32 = 0.7;
    const MAX_TOKENS: u32 = 4096;

    pub fn new(
        api_key: String,
        base_url: Option<String>,
        model: Option<String>,
    ) -> Result<Self, AiGatewayError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("corrupt-ware/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AiGatewayError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    async fn send_request(&self, request: &ChatRequest) -> Result<ChatResponse, AiGatewayError> {
        let res = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        match res.status() {
            s if s.is_success() => res
                .json::<ChatResponse>()
                .await
                .map_err(|e| AiGatewayError::Serde(e.to_string())),
            StatusCode::UNAUTHORIZED => Err(AiGatewayError::InvalidApiKey),
            StatusCode::PAYMENT_REQUIRED => Err(AiGatewayError::PaymentRequired),
            StatusCode::TOO_MANY_REQUESTS => Err(AiGatewayError::RateLimited),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                Err(AiGatewayError::Http { status, body })
            }
        }
    }
}

#[async_trait]
impl CompletionBackend for AiGatewayClient {
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<Completion, AiGatewayError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(prompt)],
            temperature: Self::TEMPERATURE,
            max_tokens: Self::MAX_TOKENS,
        };

        let response = self.send_request(&request).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AiGatewayError::Serde("no choices in response".to_string()))?;

        Ok(Completion {
            text,
            total_tokens: response.usage.map(|u| u.total_tokens),
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> AiGatewayError {
    if e.is_timeout() {
        AiGatewayError::Timeout
    } else {
        AiGatewayError::Transport(e.to_string())
    }
}
