//! Model provider adapters and structured-response parsing.
//!
//! Each provider is a direct REST implementation of the [`TextAgent`]
//! capability; [`build_text_agent`] selects one from the generation settings
//! at session construction time.

pub mod gemini_api_agent;
pub mod openrouter_api_agent;
pub mod structured;
pub mod supported_models;

use std::sync::Arc;

use propale_core::{GenerationSettings, Platform, Result, TextAgent};

pub use gemini_api_agent::GeminiApiAgent;
pub use openrouter_api_agent::OpenRouterApiAgent;
pub use structured::StructuredResponseParser;

/// Builds the provider agent selected by the settings.
///
/// The settings are validated first, so a missing API key surfaces as a
/// `Config` error here, before any session work is scheduled.
pub fn build_text_agent(settings: &GenerationSettings) -> Result<Arc<dyn TextAgent>> {
    settings.validate()?;

    tracing::info!(
        platform = %settings.platform,
        model = %settings.model,
        "initializing model provider"
    );

    let agent: Arc<dyn TextAgent> = match settings.platform {
        Platform::Google => Arc::new(GeminiApiAgent::from_settings(settings)),
        Platform::OpenRouter => Arc::new(OpenRouterApiAgent::from_settings(settings)),
    };
    Ok(agent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_selects_platform() {
        let google = GenerationSettings::new(Platform::Google, "key-a");
        let openrouter =
            GenerationSettings::new(Platform::OpenRouter, "key-b").with_model("openai/gpt-4o");

        assert_eq!(build_text_agent(&google).unwrap().name(), "gemini");
        assert_eq!(build_text_agent(&openrouter).unwrap().name(), "openrouter");
    }

    #[test]
    fn test_factory_rejects_missing_key() {
        let settings = GenerationSettings::new(Platform::Google, "");
        let err = build_text_agent(&settings).err().unwrap();
        assert!(err.is_config());
    }
}
