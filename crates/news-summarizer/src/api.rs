//! API-based summarizer using OpenAI-compatible or Anthropic endpoints.

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use news_types::{SummarizerProvider, SummarizerSettings};

use super::prompt::{build_prompt, try_parse_response, SYSTEM_PROMPT};
use super::{ClusterSummary, Summarizer, SummarizerError};

/// Configuration for API-based summarizer.
#[derive(Debug, Clone)]
pub struct ApiSummarizerConfig {
    pub provider: SummarizerProvider,

    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Model to use (e.g., "gpt-3.5-turbo", "claude-3-haiku-20240307")
    pub model: String,

    pub api_key: SecretString,

    pub temperature: f32,

    pub max_tokens: u32,

    /// Articles included in one prompt
    pub max_articles: usize,

    /// Request timeout
    pub timeout: Duration,

    /// Maximum attempts per summary, including the first
    pub max_retries: u32,

    /// First backoff delay between attempts
    pub initial_backoff: Duration,
}

impl ApiSummarizerConfig {
    /// Create config for OpenAI API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::for_provider(SummarizerProvider::Openai, api_key, model)
    }

    /// Create config for Claude API.
    pub fn claude(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::for_provider(SummarizerProvider::Anthropic, api_key, model)
    }

    fn for_provider(
        provider: SummarizerProvider,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            base_url: provider.default_base_url().to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            temperature: 0.3,
            max_tokens: 200,
            max_articles: 3,
            timeout: Duration::from_secs(60),
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }

    /// Build from settings, resolving the API key from the provider's
    /// environment variable when it is not configured.
    pub fn from_settings(settings: &SummarizerSettings) -> Result<Self, SummarizerError> {
        let api_key = settings.resolved_api_key().ok_or_else(|| {
            SummarizerError::ConfigError(format!(
                "no API key configured; set summarizer.api_key or {}",
                settings.provider.api_key_env()
            ))
        })?;

        Ok(Self {
            base_url: settings.resolved_base_url(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            max_articles: settings.max_articles,
            timeout: Duration::from_secs(settings.timeout_secs),
            max_retries: settings.max_retries,
            ..Self::for_provider(settings.provider, api_key, settings.model.clone())
        })
    }

    /// Override the base URL (custom endpoints, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// API-based summarizer implementation.
pub struct ApiSummarizer {
    client: Client,
    config: ApiSummarizerConfig,
}

impl ApiSummarizer {
    /// Create a new API summarizer.
    pub fn new(config: ApiSummarizerConfig) -> Result<Self, SummarizerError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SummarizerError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiSummarizerConfig {
        &self.config
    }

    /// Call the API with retry logic.
    async fn call_api(&self, prompt: &str) -> Result<String, SummarizerError> {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.config.initial_backoff,
            max_elapsed_time: Some(Duration::from_secs(120)),
            ..Default::default()
        };

        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Calling summarization API");

            match self.make_request(prompt).await {
                Ok(response) => return Ok(response),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    if attempts >= self.config.max_retries {
                        error!(error = %e, "Max retries exceeded");
                        return Err(e);
                    }

                    match backoff.next_backoff() {
                        Some(duration) => {
                            warn!(
                                error = %e,
                                retry_in_ms = duration.as_millis(),
                                "API call failed, retrying"
                            );
                            tokio::time::sleep(duration).await;
                        }
                        None => {
                            error!(error = %e, "Backoff exhausted");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    /// Make a single API request.
    async fn make_request(&self, prompt: &str) -> Result<String, SummarizerError> {
        match self.config.provider {
            SummarizerProvider::Openai => self.make_openai_request(prompt).await,
            SummarizerProvider::Anthropic => self.make_anthropic_request(prompt).await,
        }
    }

    /// Make OpenAI-compatible API request.
    async fn make_openai_request(&self, prompt: &str) -> Result<String, SummarizerError> {
        #[derive(Serialize)]
        struct OpenAIRequest<'a> {
            model: &'a str,
            messages: Vec<OpenAIMessage<'a>>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Serialize)]
        struct OpenAIMessage<'a> {
            role: &'static str,
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            choices: Vec<OpenAIChoice>,
        }

        #[derive(Deserialize)]
        struct OpenAIChoice {
            message: OpenAIMessageResponse,
        }

        #[derive(Deserialize)]
        struct OpenAIMessageResponse {
            content: Option<String>,
        }

        let request = OpenAIRequest {
            model: &self.config.model,
            messages: vec![
                OpenAIMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                OpenAIMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!("{}/chat/completions", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        let response = check_status(response).await?;

        let response_body: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| SummarizerError::ParseError(e.to_string()))?;

        response_body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| SummarizerError::ParseError("No choices in response".to_string()))
    }

    /// Make Anthropic API request.
    async fn make_anthropic_request(&self, prompt: &str) -> Result<String, SummarizerError> {
        #[derive(Serialize)]
        struct AnthropicRequest<'a> {
            model: &'a str,
            system: &'static str,
            max_tokens: u32,
            temperature: f32,
            messages: Vec<AnthropicMessage<'a>>,
        }

        #[derive(Serialize)]
        struct AnthropicMessage<'a> {
            role: &'static str,
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct AnthropicResponse {
            content: Vec<AnthropicContent>,
        }

        #[derive(Deserialize)]
        struct AnthropicContent {
            #[serde(default)]
            text: String,
        }

        let request = AnthropicRequest {
            model: &self.config.model,
            system: SYSTEM_PROMPT,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/messages", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.config.api_key.expose_secret())
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        let response = check_status(response).await?;

        let response_body: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| SummarizerError::ParseError(e.to_string()))?;

        response_body
            .content
            .first()
            .map(|c| c.text.trim().to_string())
            .ok_or_else(|| SummarizerError::ParseError("No content in response".to_string()))
    }
}

fn map_send_error(e: reqwest::Error) -> SummarizerError {
    if e.is_timeout() {
        SummarizerError::Timeout
    } else {
        SummarizerError::ApiError(e.to_string())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SummarizerError> {
    if response.status() == 429 {
        return Err(SummarizerError::RateLimitExceeded);
    }

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(SummarizerError::ApiError(format!(
            "HTTP {}: {}",
            status, body
        )));
    }

    Ok(response)
}

#[async_trait]
impl Summarizer for ApiSummarizer {
    async fn summarize(&self, articles: &[String]) -> Result<ClusterSummary, SummarizerError> {
        if articles.is_empty() {
            return Err(SummarizerError::NoArticles);
        }

        let prompt = build_prompt(articles, self.config.max_articles);
        let response = self.call_api(&prompt).await?;

        match try_parse_response(&response) {
            Some(summary) => {
                debug!(title = %summary.title, "Generated cluster summary");
                Ok(summary)
            }
            None => {
                warn!(response = %response, "Response missing title or summary line");
                Ok(ClusterSummary::fallback())
            }
        }
    }
}
