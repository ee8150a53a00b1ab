//! GeminiApiAgent - Direct REST API implementation for Gemini.
//!
//! This agent calls the Gemini `generateContent` REST API directly.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use propale_core::{GenerationSettings, PropaleError, Result, TextAgent};

const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Agent implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiAgent {
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiApiAgent {
    /// Creates a new agent with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.7,
            max_output_tokens: 2048,
        }
    }

    /// Builds the agent from validated generation settings.
    pub fn from_settings(settings: &GenerationSettings) -> Self {
        let model = if settings.model.trim().is_empty() {
            DEFAULT_GEMINI_MODEL.to_string()
        } else {
            settings.model.clone()
        };
        Self::new(settings.api_key.clone(), model)
            .with_temperature(settings.temperature)
            .with_max_output_tokens(settings.max_tokens)
    }

    /// Overrides the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Overrides the output token budget.
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| PropaleError::Provider {
                status_code: None,
                message: format!("Gemini API request failed: {err}"),
                retryable: err.is_connect() || err.is_timeout(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(|err| {
                PropaleError::internal(format!("Failed to parse Gemini response: {err}"))
            })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl TextAgent for GeminiApiAgent {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn invoke(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| {
            PropaleError::provider(
                "Gemini API returned no text in the response candidates",
                false,
            )
        })
}

fn map_http_error(status: StatusCode, body: String) -> PropaleError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
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
    fn test_map_http_error_classifies_rate_limit_as_retryable() {
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            "{\"error\":{\"message\":\"quota exceeded\",\"status\":\"RESOURCE_EXHAUSTED\"}}"
                .to_string(),
        );
        match err {
            PropaleError::Provider {
                status_code,
                message,
                retryable,
            } => {
                assert_eq!(status_code, Some(429));
                assert!(retryable);
                assert!(message.contains("RESOURCE_EXHAUSTED"));
            }
            other => panic!("expected Provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_map_http_error_keeps_unparseable_body() {
        let err = map_http_error(StatusCode::BAD_REQUEST, "plain failure".to_string());
        match err {
            PropaleError::Provider {
                message, retryable, ..
            } => {
                assert_eq!(message, "plain failure");
                assert!(!retryable);
            }
            other => panic!("expected Provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_settings_falls_back_to_default_model() {
        let mut settings =
            GenerationSettings::new(propale_core::Platform::Google, "key").with_model("  ");
        settings.temperature = 0.2;
        let agent = GeminiApiAgent::from_settings(&settings);
        assert_eq!(agent.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(agent.temperature, 0.2);
    }
}
