use anyhow::{anyhow, Context, Result};
use async_openai::{
    config::{Config, OpenAIConfig},
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
        CreateChatCompletionResponse,
    },
};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use super::AnalysisError;

/// Token counts reported by the provider for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Raw response from a remote analysis call
#[derive(Debug, Clone)]
pub struct RemoteResponse {
    pub text: String,
    pub tokens_used: Option<TokenUsage>,
}

/// Transport seam for Tier-2 analysis
///
/// Implementations issue exactly one request per call and report failures
/// through the [`AnalysisError`] taxonomy; retries, model fallback and
/// splitting belong to the batch analyzer.
#[async_trait]
pub trait RemoteAnalyzer: Send + Sync {
    async fn call_model(&self, model: &str, prompt: &str) -> Result<RemoteResponse, AnalysisError>;
}

/// Configuration for the OpenAI-compatible client
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_base: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            max_tokens: 8192,
            temperature: 1.0,
            timeout_seconds: 120,
        }
    }
}

/// Remote analyzer speaking the OpenAI chat-completions protocol
///
/// Works against any compatible endpoint (Gemini, OpenAI, local gateways);
/// the model id is chosen per call by the fallback chain. Each call is a
/// single HTTP attempt so that a 429 reaches the batch analyzer as
/// [`AnalysisError::RateLimited`] instead of being retried here.
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    openai: OpenAIConfig,
    config: LlmConfig,
}

impl OpenAiCompatClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `config` - Endpoint and generation settings
    /// * `api_key` - API key for the provider
    pub fn new(config: LlmConfig, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(anyhow!("API key must not be empty"));
        }

        tracing::info!(
            "Initializing remote analyzer client: api_base={}, timeout={}s",
            config.api_base,
            config.timeout_seconds
        );

        let openai = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(config.api_base.clone());
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            openai,
            config,
        })
    }

    /// Replace the underlying HTTP client (proxy, TLS or pool settings)
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    async fn send(&self, request: &CreateChatCompletionRequest) -> reqwest::Result<(StatusCode, String)> {
        let response = self
            .http
            .post(self.openai.url("/chat/completions"))
            .headers(self.openai.headers())
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

#[async_trait]
impl RemoteAnalyzer for OpenAiCompatClient {
    async fn call_model(&self, model: &str, prompt: &str) -> Result<RemoteResponse, AnalysisError> {
        let request = CreateChatCompletionRequest {
            model: model.to_string(),
            messages: vec![ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage {
                    content: ChatCompletionRequestUserMessageContent::Text(prompt.to_string()),
                    name: None,
                },
            )],
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
            ..Default::default()
        };

        tracing::debug!(
            "Sending prompt to {} (length: {} chars)",
            model,
            prompt.len()
        );

        let (status, body) = tokio::time::timeout(
            Duration::from_secs(self.config.timeout_seconds),
            self.send(&request),
        )
        .await
        .map_err(|_| {
            AnalysisError::Transient(format!(
                "request timed out after {}s",
                self.config.timeout_seconds
            ))
        })?
        .map_err(|e| AnalysisError::Transient(format!("http error: {}", e)))?;

        if !status.is_success() {
            return Err(AnalysisError::from_http_failure(status.as_u16(), &body));
        }

        let response: CreateChatCompletionResponse = serde_json::from_str(&body)?;
        let text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AnalysisError::MalformedResponse("Empty response from model".to_string()))?;

        Ok(RemoteResponse {
            text,
            tokens_used: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            }),
        })
    }
}
