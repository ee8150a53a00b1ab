//! OpenRouterApiAgent - OpenAI-compatible chat completions via OpenRouter.
//!
//! OpenRouter fronts many model families behind the OpenAI chat completions
//! schema; the model id in the settings selects the routed model.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use propale_core::{GenerationSettings, PropaleError, Result, TextAgent};

const BASE_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

// OpenRouter attributes traffic to an app through these two headers.
const REFERER_HEADER: (&str, &str) = ("HTTP-Referer", "http://localhost:3000");
const TITLE_HEADER: (&str, &str) = ("X-Title", "Propale RFP Orchestrator");

/// Agent implementation that talks to the OpenRouter HTTP API.
#[derive(Clone)]
pub struct OpenRouterApiAgent {
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenRouterApiAgent {
    /// Creates a new agent with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.7,
            max_tokens: 2048,
        }
    }

    /// Builds the agent from validated generation settings.
    pub fn from_settings(settings: &GenerationSettings) -> Self {
        Self::new(settings.api_key.clone(), settings.model.clone())
            .with_temperature(settings.temperature)
            .with_max_tokens(settings.max_tokens)
    }

    /// Overrides the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Overrides the completion token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    async fn send_request(&self, body: &ChatCompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(BASE_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header(REFERER_HEADER.0, REFERER_HEADER.1)
            .header(TITLE_HEADER.0, TITLE_HEADER.1)
            .json(body)
            .send()
            .await
            .map_err(|err| PropaleError::Provider {
                status_code: None,
                message: format!("OpenRouter API request failed: {err}"),
                retryable: err.is_connect() || err.is_timeout(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenRouter error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            PropaleError::internal(format!("Failed to parse OpenRouter response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl TextAgent for OpenRouterApiAgent {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn invoke(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
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
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[allow(dead_code)]
    code: Option<serde_json::Value>,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            PropaleError::provider("OpenRouter API returned no content in the response", false)
        })
}

fn map_http_error(status: StatusCode, body: String) -> PropaleError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.clone());

    let retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    PropaleError::Provider {
        status_code: Some(status.as_u16()),
        message,
        retryable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_http_error_parses_error_body() {
        let err = map_http_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "{\"error\":{\"message\":\"model overloaded\",\"code\":503}}".to_string(),
        );
        match err {
            PropaleError::Provider {
                status_code,
                message,
                retryable,
            } => {
                assert_eq!(status_code, Some(503));
                assert_eq!(message, "model overloaded");
                assert!(retryable);
            }
            other => panic!("expected Provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_settings_copies_model_parameters() {
        let mut settings = GenerationSettings::new(propale_core::Platform::OpenRouter, "sk-or")
            .with_model("anthropic/claude-3.5-sonnet");
        settings.max_tokens = 512;
        let agent = OpenRouterApiAgent::from_settings(&settings);
        assert_eq!(agent.model, "anthropic/claude-3.5-sonnet");
        assert_eq!(agent.max_tokens, 512);
    }
}
