//! Structured-response parsing for unreliable model output.
//!
//! Models asked for JSON frequently wrap it in code fences, truncate it, or
//! drop required keys. The parser re-invokes the model with the same prompt
//! until the payload parses and carries the required top-level keys, up to a
//! fixed bound.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use propale_core::{PropaleError, Result, TextAgent};

static OPENING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*```(?:json)?\s*").expect("valid opening fence pattern"));
static CLOSING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*```\s*$").expect("valid closing fence pattern"));

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

/// Extracts a JSON object from raw model output, retrying on failure.
///
/// The parser has no schema knowledge beyond "these top-level keys must be
/// present"; interpreting the values is the caller's job.
#[derive(Debug, Clone)]
pub struct StructuredResponseParser {
    max_attempts: u32,
    backoff: Duration,
}

impl Default for StructuredResponseParser {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl StructuredResponseParser {
    /// Creates a parser with a custom retry bound and backoff.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Invokes the model and parses its output into a JSON object.
    ///
    /// Each failed attempt re-invokes the model with the *same* prompt after a
    /// short backoff. Transport errors from the agent are not retried here;
    /// they propagate to the caller as-is.
    ///
    /// # Errors
    ///
    /// Returns `MalformedResponse` with the last parse error once the retry
    /// bound is exhausted.
    pub async fn request_object(
        &self,
        agent: &dyn TextAgent,
        prompt: &str,
        required_keys: &[&str],
    ) -> Result<Map<String, Value>> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            let raw = agent.invoke(prompt).await?;

            match parse_object(&raw, required_keys) {
                Ok(object) => return Ok(object),
                Err(message) => {
                    tracing::warn!(
                        agent = agent.name(),
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %message,
                        "structured response attempt failed"
                    );
                    last_error = message;
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.backoff).await;
            }
        }

        Err(PropaleError::MalformedResponse {
            attempts: self.max_attempts,
            message: last_error,
        })
    }
}

/// Strips optional markdown code fences around a JSON payload.
fn strip_code_fences(raw: &str) -> String {
    let without_opening = OPENING_FENCE.replace(raw.trim(), "");
    CLOSING_FENCE.replace(&without_opening, "").into_owned()
}

fn parse_object(raw: &str, required_keys: &[&str]) -> std::result::Result<Map<String, Value>, String> {
    let cleaned = strip_code_fences(raw);

    let value: Value =
        serde_json::from_str(&cleaned).map_err(|err| format!("invalid JSON: {}", err))?;

    let Value::Object(object) = value else {
        return Err("payload is valid JSON but not an object".to_string());
    };

    let missing: Vec<&str> = required_keys
        .iter()
        .filter(|key| !object.contains_key(**key))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(format!("missing required keys: {}", missing.join(", ")));
    }

    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Agent stub replaying a scripted list of responses.
    struct ScriptedAgent {
        responses: Mutex<VecDeque<String>>,
        calls: AtomicU32,
    }

    impl ScriptedAgent {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
                calls: AtomicU32::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextAgent for ScriptedAgent {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn invoke(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            Ok(responses.pop_front().unwrap_or_else(|| "not json".to_string()))
        }
    }

    fn fast_parser() -> StructuredResponseParser {
        StructuredResponseParser::new(3, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt() {
        let agent = ScriptedAgent::new(&[
            "definitely not json",
            "{\"partial\": true}",
            "{\"status\": \"OK\", \"texte_genere\": \"<p>ok</p>\"}",
        ]);

        let object = fast_parser()
            .request_object(&agent, "prompt", &["status"])
            .await
            .unwrap();

        assert_eq!(agent.call_count(), 3);
        assert_eq!(object["status"], "OK");
    }

    #[tokio::test]
    async fn test_fails_after_exactly_three_attempts() {
        let agent = ScriptedAgent::new(&["nope", "still nope", "nope again", "never reached"]);

        let err = fast_parser()
            .request_object(&agent, "prompt", &["status"])
            .await
            .unwrap_err();

        assert_eq!(agent.call_count(), 3);
        match err {
            PropaleError::MalformedResponse { attempts, message } => {
                assert_eq!(attempts, 3);
                assert!(message.contains("invalid JSON"));
            }
            other => panic!("expected MalformedResponse, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_strips_code_fences() {
        let agent = ScriptedAgent::new(&["```json\n{\"requete_texte\": \"q\", \"filtres\": {}}\n```"]);

        let object = fast_parser()
            .request_object(&agent, "prompt", &["filtres", "requete_texte"])
            .await
            .unwrap();

        assert_eq!(object["requete_texte"], "q");
        assert_eq!(agent.call_count(), 1);
    }

    #[tokio::test]
    async fn test_reports_missing_keys() {
        let agent = ScriptedAgent::new(&["{\"a\": 1}", "{\"a\": 1}", "{\"a\": 1}"]);

        let err = fast_parser()
            .request_object(&agent, "prompt", &["a", "b"])
            .await
            .unwrap_err();

        match err {
            PropaleError::MalformedResponse { message, .. } => {
                assert!(message.contains("b"));
                assert!(!message.contains("a,"));
            }
            other => panic!("expected MalformedResponse, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_object_json_is_rejected() {
        let agent = ScriptedAgent::new(&["[1, 2, 3]", "\"text\"", "42"]);

        let err = fast_parser()
            .request_object(&agent, "prompt", &[])
            .await
            .unwrap_err();

        assert!(err.is_malformed_response());
    }
}
