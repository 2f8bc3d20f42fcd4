//! HTTP client for the remote reasoning service
//!
//! Model-agnostic: speaks either the Anthropic or an OpenAI-compatible wire
//! format, picked from the URL. The request timeout is a hard bound; the
//! decision cycle awaits this call and nothing else, so a hung service only
//! ever costs one cycle.

use crate::core::error::{KoroError, Result};
use crate::providers::ReasoningService;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MAX_TOKENS: u32 = 1024;

/// API wire format
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAi,
}

/// Async client for the reasoning service
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(api_key: String, api_url: String, model: String, timeout: Duration) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            api_format,
            timeout,
        }
    }

    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAi
        }
    }

    /// Create a client from environment variables
    ///
    /// Required: KORO_LLM_API_KEY
    /// Optional: KORO_LLM_API_URL, KORO_LLM_MODEL, KORO_LLM_TIMEOUT_SECS
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("KORO_LLM_API_KEY")
            .map_err(|_| KoroError::Reasoning("KORO_LLM_API_KEY not set".into()))?;
        let api_url =
            std::env::var("KORO_LLM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let model = std::env::var("KORO_LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let timeout = std::env::var("KORO_LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self::new(
            api_key,
            api_url,
            model,
            Duration::from_secs(timeout),
        ))
    }

    async fn complete_anthropic(&self, system: &str, user: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system: system.into(),
            messages: vec![Message {
                role: "user".into(),
                content: user.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .timeout(self.timeout)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| KoroError::Reasoning(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(KoroError::Reasoning(format!("API error: {}", error_text)));
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| KoroError::Reasoning(e.to_string()))?;

        completion
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| KoroError::Reasoning("Empty response".into()))
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<String> {
        let request = OpenAiRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system.into(),
                },
                Message {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| KoroError::Reasoning(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(KoroError::Reasoning(format!("API error: {}", error_text)));
        }

        let completion: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| KoroError::Reasoning(e.to_string()))?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| KoroError::Reasoning("Empty response".into()))
    }
}

#[async_trait]
impl ReasoningService for LlmClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(system, user).await,
            ApiFormat::OpenAi => self.complete_openai(system, user).await,
        }
    }
}

// Anthropic wire format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible wire format
#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            LlmClient::detect_api_format("https://api.anthropic.com/v1/messages"),
            ApiFormat::Anthropic
        );
        assert_eq!(
            LlmClient::detect_api_format("https://api.deepseek.com/chat/completions"),
            ApiFormat::OpenAi
        );
    }

    #[test]
    fn test_client_creation() {
        let client = LlmClient::new(
            "test-key".into(),
            "https://api.example.com".into(),
            "test-model".into(),
            Duration::from_secs(5),
        );
        assert_eq!(client.api_format, ApiFormat::OpenAi);
        assert_eq!(client.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_env_missing_key() {
        if std::env::var("KORO_LLM_API_KEY").is_err() {
            assert!(LlmClient::from_env().is_err());
        }
    }
}
