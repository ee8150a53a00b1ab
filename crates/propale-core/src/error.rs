//! Error types for the Propale workspace.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Propale workspace.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum PropaleError {
    /// The generative model never produced a parseable payload within the
    /// retry bound. Carries the last parse error observed.
    #[error("malformed model response after {attempts} attempts: {message}")]
    MalformedResponse { attempts: u32, message: String },

    /// Transport or API failure while calling a model provider
    #[error("model provider error: {message}")]
    Provider {
        status_code: Option<u16>,
        message: String,
        retryable: bool,
    },

    /// Connectivity or auth failure while calling the search collaborator
    #[error("retrieval transport error: {0}")]
    RetrievalTransport(String),

    /// Entity not found error with type information
    #[error("entity not found: {entity_type} '{id}'")]
    NotFound { entity_type: String, id: String },

    /// Configuration error (missing credentials, invalid identity)
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error (should not happen in normal operation)
    #[error("internal error: {0}")]
    Internal(String),
}

impl PropaleError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a RetrievalTransport error
    pub fn retrieval_transport(message: impl Into<String>) -> Self {
        Self::RetrievalTransport(message.into())
    }

    /// Creates a Provider error without an HTTP status
    pub fn provider(message: impl Into<String>, retryable: bool) -> Self {
        Self::Provider {
            status_code: None,
            message: message.into(),
            retryable,
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a Config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a MalformedResponse error
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Self::MalformedResponse { .. })
    }

    /// Check if this error is worth retrying at the transport level.
    ///
    /// Only provider errors carry a retryability classification; every other
    /// variant is considered final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider { retryable: true, .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for PropaleError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for PropaleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for PropaleError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, PropaleError>`.
pub type Result<T> = std::result::Result<T, PropaleError>;
