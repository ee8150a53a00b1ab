//! Generation settings: provider selection and model parameters.
//!
//! Settings are supplied by the embedding layer (per requester identity) and
//! validated once at session construction; a validation failure is fatal and
//! reported before any background work starts.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PropaleError, Result};

/// Model provider platforms selectable at session construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Google,
    OpenRouter,
}

impl Platform {
    /// Returns the configuration name of the platform.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::OpenRouter => "openrouter",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PropaleError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "openrouter" => Ok(Self::OpenRouter),
            other => Err(PropaleError::config(format!(
                "platform '{}' is not supported",
                other
            ))),
        }
    }
}

fn default_platform() -> Platform {
    Platform::Google
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

/// Per-requester model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_platform")]
    pub platform: Platform,
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl GenerationSettings {
    /// Creates settings with the platform defaults for everything but the key.
    pub fn new(platform: Platform, api_key: impl Into<String>) -> Self {
        Self {
            platform,
            api_key: api_key.into(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Checks that the settings are usable for session construction.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when the API key or model name is missing.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(PropaleError::config(
                "an API key is required in the generation settings",
            ));
        }
        if self.model.trim().is_empty() {
            return Err(PropaleError::config(
                "a model name is required in the generation settings",
            ));
        }
        Ok(())
    }

    /// Parses settings from a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Loads settings from a TOML file on disk.
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validate_rejects_missing_api_key() {
        let settings = GenerationSettings::new(Platform::Google, "  ");
        let err = settings.validate().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!("OpenRouter".parse::<Platform>().unwrap(), Platform::OpenRouter);
        assert!("mistral".parse::<Platform>().is_err());
    }

    #[test]
    fn test_from_toml_str_applies_defaults() {
        let settings = GenerationSettings::from_toml_str(
            r#"
            platform = "openrouter"
            api_key = "sk-test"
            "#,
        )
        .unwrap();
        assert_eq!(settings.platform, Platform::OpenRouter);
        assert_eq!(settings.model, "gemini-1.5-flash");
        assert_eq!(settings.max_tokens, 2048);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_from_toml_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key = \"sk-test\"\nmodel = \"gemini-1.5-pro\"").unwrap();

        let settings = GenerationSettings::from_toml_path(file.path()).unwrap();
        assert_eq!(settings.platform, Platform::Google);
        assert_eq!(settings.model, "gemini-1.5-pro");
    }

    #[test]
    fn test_from_toml_str_rejects_invalid_document() {
        let err = GenerationSettings::from_toml_str("api_key = ").unwrap_err();
        assert!(matches!(err, PropaleError::Serialization { .. }));
    }
}
