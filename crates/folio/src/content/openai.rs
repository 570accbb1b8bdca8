//! Chat-completion adapter for OpenAI-compatible APIs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ContentError, ContentGenerator, Prompt};
use crate::config::{ContentConfig, HttpConfig};
use crate::sanitize::{redact_url, truncate_body};

pub struct OpenAiContentGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiContentGenerator {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: SecretString,
        http: &HttpConfig,
    ) -> Result<Self, ContentError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
            .timeout(Duration::from_secs(http.request_timeout_secs))
            .build()
            .map_err(|e| ContentError::ClientSetup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    pub fn from_config(
        config: &ContentConfig,
        api_key: SecretString,
        http: &HttpConfig,
    ) -> Result<Self, ContentError> {
        Self::new(&config.base_url, &config.model, api_key, http)
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Pulls `error.message` out of an OpenAI error body, falling back to the
/// raw (truncated) body.
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status.as_u16()),
        Err(_) => truncate_body(body),
    }
}

#[async_trait]
impl ContentGenerator for OpenAiContentGenerator {
    async fn complete(&self, prompt: &Prompt) -> Result<String, ContentError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: prompt.max_tokens,
            temperature: prompt.temperature,
        };

        let url = self.chat_url();
        debug!(url = %redact_url(&url), kind = ?prompt.kind, "Requesting chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            warn!(status = status.as_u16(), kind = ?prompt.kind, "Chat completion failed");
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ContentError::RateLimited { message });
            }
            return Err(ContentError::Api {
                status: Some(status.as_u16()),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ContentError::MalformedResponse(e.without_url().to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| ContentError::MalformedResponse("no choices in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_openai_envelope() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(
            error_message(StatusCode::UNAUTHORIZED, body),
            "Incorrect API key provided"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_body() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, ""), "HTTP 502");
    }

    #[test]
    fn test_api_error_display_has_vendor_prefix() {
        let err = ContentError::Api {
            status: Some(401),
            message: "Incorrect API key provided".to_string(),
        };
        assert_eq!(err.to_string(), "OpenAI API error: Incorrect API key provided");
    }

    #[test]
    fn test_chat_url_trims_trailing_slash() {
        let generator = OpenAiContentGenerator::new(
            "https://api.openai.com/v1/",
            "gpt-4",
            SecretString::from("sk-test".to_string()),
            &HttpConfig::default(),
        )
        .unwrap();
        assert_eq!(
            generator.chat_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }
}
