//! Text-generation providers used for post classification.
//!
//! The rest of the pipeline only sees [`LlmProvider::classify`], so tests can
//! swap in a stub without touching the network.

use async_trait::async_trait;
use inkhaven_core::{AppConfig, CoreError, LlmError};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Default Anthropic API endpoint
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Current API version
const ANTHROPIC_VERSION: &str = "2023-06-01";

const PROVIDER_NAME: &str = "anthropic";

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Send a single-turn prompt and return the reply text.
    async fn classify(&self, prompt: &str) -> Result<String, CoreError>;
}

#[derive(Debug, Clone)]
pub struct ClaudeProvider {
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
    http_client: Client,
}

impl ClaudeProvider {
    pub fn new(api_key: String, model: String, max_tokens: u32) -> Result<Self, CoreError> {
        Self::with_timeout(api_key, model, max_tokens, Duration::from_secs(60))
    }

    pub fn with_timeout(
        api_key: String,
        model: String,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            model,
            max_tokens,
            base_url: ANTHROPIC_API_URL.to_string(),
            http_client,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        let api_key = config.require_api_key()?.to_string();
        let provider = Self::with_timeout(
            api_key,
            config.classifier.model.clone(),
            config.classifier.max_tokens,
            config.request_timeout(),
        )?;

        Ok(match &config.classifier.api_base_url {
            Some(url) => provider.with_base_url(url.clone()),
            None => provider,
        })
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request_body(&self, prompt: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        })
    }
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn classify(&self, prompt: &str) -> Result<String, CoreError> {
        let body = self.build_request_body(prompt);
        debug!("Sending {} prompt characters to {}", prompt.len(), self.model);

        let response = self
            .http_client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());
        let body_text = response.text().await.map_err(map_transport_error)?;

        if !(200..300).contains(&status) {
            return Err(parse_http_error(status, &body_text, retry_after).into());
        }

        Ok(parse_response_text(&body_text)?)
    }
}

fn map_transport_error(error: reqwest::Error) -> CoreError {
    if error.is_timeout() {
        LlmError::RequestTimeout {
            provider: PROVIDER_NAME.to_string(),
        }
        .into()
    } else {
        CoreError::Network(error)
    }
}

pub fn parse_http_error(status: u16, body: &str, retry_after: Option<u64>) -> LlmError {
    let provider = PROVIDER_NAME.to_string();
    match status {
        401 | 403 => LlmError::AuthenticationFailed { provider },
        408 | 504 => LlmError::RequestTimeout { provider },
        429 => LlmError::RateLimitExceeded {
            provider,
            retry_after: retry_after.unwrap_or(60),
        },
        503 | 529 => LlmError::ServiceUnavailable { provider },
        _ => LlmError::RequestFailed {
            provider,
            status_code: status,
            message: body.chars().take(200).collect(),
        },
    }
}

/// Claude API response format
#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Text of the first text block in a Messages API response body.
pub fn parse_response_text(body: &str) -> Result<String, LlmError> {
    let response: ClaudeResponse =
        serde_json::from_str(body).map_err(|e| LlmError::InvalidResponseFormat {
            provider: PROVIDER_NAME.to_string(),
            details: e.to_string(),
        })?;

    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .ok_or_else(|| LlmError::EmptyResponse {
            provider: PROVIDER_NAME.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_provider() -> ClaudeProvider {
        ClaudeProvider::new(
            "sk-test".to_string(),
            "claude-sonnet-4-5-20250929".to_string(),
            150,
        )
        .unwrap()
    }

    #[test]
    fn test_provider_creation() {
        let provider = test_provider();
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.model(), "claude-sonnet-4-5-20250929");
        assert_eq!(provider.base_url, ANTHROPIC_API_URL);
    }

    #[test]
    fn test_request_body_building() {
        let body = test_provider().build_request_body("Title: On Writing");
        assert_eq!(body["model"], "claude-sonnet-4-5-20250929");
        assert_eq!(body["max_tokens"], 150);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Title: On Writing");
    }

    #[test]
    fn test_parse_response_text_takes_first_text_block() {
        let body = r#"{
            "id": "msg_1",
            "type": "message",
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "philosophy, history"},
                {"type": "text", "text": "ignored"}
            ],
            "model": "claude-sonnet-4-5-20250929",
            "stop_reason": "end_turn"
        }"#;
        assert_eq!(parse_response_text(body).unwrap(), "philosophy, history");
    }

    #[test]
    fn test_parse_response_without_text_block() {
        let result = parse_response_text(r#"{"content": []}"#);
        assert!(matches!(result, Err(LlmError::EmptyResponse { .. })));
    }

    #[test]
    fn test_parse_malformed_response() {
        let result = parse_response_text("<html>bad gateway</html>");
        assert!(matches!(result, Err(LlmError::InvalidResponseFormat { .. })));
    }

    #[test]
    fn test_http_error_mapping() {
        assert!(matches!(
            parse_http_error(401, "", None),
            LlmError::AuthenticationFailed { .. }
        ));
        assert!(matches!(
            parse_http_error(429, "", Some(12)),
            LlmError::RateLimitExceeded { retry_after: 12, .. }
        ));
        assert!(matches!(
            parse_http_error(429, "", None),
            LlmError::RateLimitExceeded { retry_after: 60, .. }
        ));
        assert!(matches!(
            parse_http_error(529, "overloaded", None),
            LlmError::ServiceUnavailable { .. }
        ));
        assert!(matches!(
            parse_http_error(400, "bad", None),
            LlmError::RequestFailed { status_code: 400, .. }
        ));
    }
}
