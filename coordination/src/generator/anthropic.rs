//! Anthropic Messages API backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CompletionBackend, GenerationError};

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";
pub const DEFAULT_MAX_TOKENS: u32 = 300;
/// Upper bound on a single upstream call; expiry surfaces as `Upstream { 500 }`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upstream provider settings plus the optional credential.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// `None` selects the mock path.
    pub api_key: Option<String>,
    pub api_url: String,
    pub api_version: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl AnthropicConfig {
    /// The credential, treating an empty or whitespace-only key as absent.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

pub struct AnthropicBackend {
    api_key: String,
    config: AnthropicConfig,
    client: reqwest::Client,
}

impl AnthropicBackend {
    pub fn new(api_key: impl Into<String>, config: AnthropicConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            api_key: api_key.into(),
            config,
            client,
        })
    }
}

#[async_trait]
impl CompletionBackend for AnthropicBackend {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, system: &str, user_content: &str) -> Result<String, GenerationError> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system,
            messages: [UserMessage {
                role: "user",
                content: user_content,
            }],
        };

        tracing::debug!(
            model = %self.config.model,
            content_len = user_content.len(),
            "sending request to Anthropic API"
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.config.api_version)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Anthropic API request failed");
                GenerationError::transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "Anthropic API error");
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Anthropic API returned an unreadable body");
            GenerationError::transport(e)
        })?;

        let text = parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .filter(|text| !text.is_empty())
            .ok_or(GenerationError::EmptyUpstreamResponse)?;

        tracing::debug!(
            response_len = text.len(),
            model = parsed.model.as_deref().unwrap_or("unknown"),
            "received AI response"
        );
        Ok(text)
    }
}
