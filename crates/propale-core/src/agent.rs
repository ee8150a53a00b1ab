//! Generative-model capability trait.

use async_trait::async_trait;

use crate::error::Result;

/// A text-in/text-out generative model call.
///
/// Implementations wrap one provider's API; the implementation is selected
/// once at session construction and shared by every stage of every run in the
/// session. Implementations must be safe to call concurrently.
#[async_trait]
pub trait TextAgent: Send + Sync {
    /// A short provider name for log lines.
    fn name(&self) -> &str;

    /// Sends the prompt to the model and returns the raw completion text.
    ///
    /// # Errors
    ///
    /// Returns `PropaleError::Provider` on transport or API failure.
    async fn invoke(&self, prompt: &str) -> Result<String>;
}
