//! OpenAI-compatible chat-completion client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::types::ChatMessage;

use super::llm::{CompletionRequest, LlmProvider};

/// Chat-completion client. Requests time out after
/// `LlmConfig::timeout_secs` and are never retried.
pub struct OpenAiClient {
    /// HTTP client
    client: Client,
    /// API base URL without trailing slash
    base_url: String,
    /// Bearer credential
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiClient {
    /// Create a new client for the given credential
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::config("An API key is required to ask questions"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(2)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Build from configuration, requiring `llm.api_key`
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            Error::config(format!(
                "No API key configured. Set {} or pass --api-key",
                crate::config::API_KEY_ENV
            ))
        })?;
        Self::new(config, api_key)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Pull the human-readable message out of an error body when possible
fn describe_failure(status: reqwest::StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    format!("Completion failed: HTTP {} - {}", status, detail)
}

/// First choice's text, or an error if the provider returned none
fn first_choice(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| Error::llm("No text in completion response"))
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
        };

        tracing::debug!(
            "Requesting completion from {} ({} messages)",
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::llm(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::llm(describe_failure(status, &body)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::llm(format!("Failed to parse completion response: {}", e)))?;

        first_choice(parsed)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let messages = vec![
            ChatMessage::system("Answer from context"),
            ChatMessage::user("How many vacation days?"),
        ];
        let body = ChatRequest {
            model: "gpt-4o",
            messages: &messages,
            temperature: 0.0,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["temperature"], 0.0);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "How many vacation days?");
    }

    #[test]
    fn test_first_choice_extraction() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Twenty days."}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice(parsed).unwrap(), "Twenty days.");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(first_choice(empty), Err(Error::Llm(_))));

        let null_content: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(first_choice(null_content).is_err());
    }

    #[test]
    fn test_failure_message_prefers_provider_detail() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        let message = describe_failure(reqwest::StatusCode::UNAUTHORIZED, body);
        assert!(message.contains("401"));
        assert!(message.contains("Incorrect API key provided"));

        let message = describe_failure(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert!(message.ends_with("upstream down"));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let config = LlmConfig::default();
        assert!(matches!(
            OpenAiClient::from_config(&config),
            Err(Error::Config(_))
        ));
        assert!(OpenAiClient::new(&config, "  ").is_err());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = LlmConfig {
            base_url: "http://localhost:9000/v1/".to_string(),
            ..LlmConfig::default()
        };
        let client = OpenAiClient::new(&config, "sk-test").unwrap();
        assert_eq!(
            client.endpoint("chat/completions"),
            "http://localhost:9000/v1/chat/completions"
        );
    }
}
