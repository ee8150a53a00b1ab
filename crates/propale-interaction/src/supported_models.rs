//! Supported LLM model versions and update procedure.
//!
//! # Supported Models
//!
//! ## Google Gemini (`platform = "google"`)
//!
//! | Model ID | Tier | Notes |
//! |----------|------|-------|
//! | `gemini-1.5-pro` | Flagship | Best reasoning |
//! | `gemini-1.5-flash` | Fast | Budget-friendly (default) |
//!
//! Reference: <https://ai.google.dev/gemini-api/docs/models>
//!
//! ## OpenRouter (`platform = "openrouter"`)
//!
//! OpenRouter accepts any routed model id (e.g. `anthropic/claude-3.5-sonnet`,
//! `openai/gpt-4o`); the id is passed through unchanged, so no allowlist is
//! maintained here.
//!
//! Reference: <https://openrouter.ai/models>
//!
//! # How to Update
//!
//! When changing the Gemini default:
//!
//! 1. `gemini_api_agent.rs` → `DEFAULT_GEMINI_MODEL`
//! 2. `propale-core/src/settings.rs` → `default_model()`
//! 3. The model table above
