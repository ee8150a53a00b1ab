//! Five-stage pipeline runner for one section.
//!
//! Stages execute strictly in order, each consuming and extending the run
//! state: plan prior-art search → fetch prior-art context → plan reference
//! search → fetch reference examples → write and validate. No stage is
//! skipped; a stage failure propagates to the orchestrator, which marks the
//! dossier failed. Model transport failures are absorbed below the parser so
//! the run itself keeps moving toward a terminal outcome.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use propale_core::{
    PriorArtSearch, PropaleError, ReferenceExampleSearch, Result, TextAgent,
};
use propale_interaction::StructuredResponseParser;

use crate::prompts;
use crate::run_state::{DraftOutcome, PipelineRunState, PriorArtStrategy, ReferenceStrategy};

const DEFAULT_CLARIFICATION_QUESTION: &str = "A clarification is required to continue.";

const PRIOR_ART_STRATEGY_KEYS: [&str; 2] =
    ["sous_classes_selectionnees", "requete_texte_reformulee"];
const REFERENCE_STRATEGY_KEYS: [&str; 2] = ["filtres", "requete_texte"];
const WRITER_KEYS: [&str; 1] = ["status"];

/// Executes the fixed five-stage pipeline for one section.
pub struct PipelineRunner {
    agent: GuardedAgent,
    prior_art: Arc<dyn PriorArtSearch>,
    references: Arc<dyn ReferenceExampleSearch>,
    parser: StructuredResponseParser,
}

impl PipelineRunner {
    /// Creates a runner over the session-scoped collaborators.
    pub fn new(
        agent: Arc<dyn TextAgent>,
        prior_art: Arc<dyn PriorArtSearch>,
        references: Arc<dyn ReferenceExampleSearch>,
    ) -> Self {
        Self {
            agent: GuardedAgent { inner: agent },
            prior_art,
            references,
            parser: StructuredResponseParser::default(),
        }
    }

    /// Overrides the structured-response parser (retry bound, backoff).
    pub fn with_parser(mut self, parser: StructuredResponseParser) -> Self {
        self.parser = parser;
        self
    }

    /// Runs the five stages to a terminal outcome.
    ///
    /// # Errors
    ///
    /// Returns the first stage error (exhausted parser retries or a retrieval
    /// transport failure); the caller owns the resulting dossier transition.
    pub async fn run(&self, mut state: PipelineRunState) -> Result<PipelineRunState> {
        self.plan_prior_art_search(&mut state).await?;
        self.fetch_prior_art(&mut state).await?;
        self.plan_reference_search(&mut state).await?;
        self.fetch_reference_examples(&mut state).await?;
        self.draft_section(&mut state).await?;
        Ok(state)
    }

    /// Stage 1: choose prior-art sub-labels and reformulate the query.
    async fn plan_prior_art_search(&self, state: &mut PipelineRunState) -> Result<()> {
        tracing::info!(section = %state.section_title, "planning prior-art search");

        let prompt = prompts::prior_art_strategist_prompt(
            &state.section_title,
            &state.section_description,
            &state.prior_art_labels,
        );
        let object = self
            .parser
            .request_object(&self.agent, &prompt, &PRIOR_ART_STRATEGY_KEYS)
            .await?;

        state.prior_art_strategy = Some(PriorArtStrategy {
            selected_classes: string_array(object.get("sous_classes_selectionnees")),
            query: string_field(&object, "requete_texte_reformulee"),
        });
        Ok(())
    }

    /// Stage 2: retrieve prior-art context, kept even when empty.
    async fn fetch_prior_art(&self, state: &mut PipelineRunState) -> Result<()> {
        tracing::info!(section = %state.section_title, "retrieving prior-art context");

        let strategy = state
            .prior_art_strategy
            .as_ref()
            .ok_or_else(|| PropaleError::internal("prior-art strategy missing before retrieval"))?;

        state.prior_art_context = self
            .prior_art
            .search(&strategy.query, &strategy.selected_classes)
            .await?;
        Ok(())
    }

    /// Stage 3: choose the reference-example query and class filter.
    async fn plan_reference_search(&self, state: &mut PipelineRunState) -> Result<()> {
        tracing::info!(section = %state.section_title, "planning reference-example search");

        let prompt = prompts::reference_strategist_prompt(
            &state.section_title,
            &state.section_description,
            &state.prior_art_context,
            &state.reference_classes,
        );
        let object = self
            .parser
            .request_object(&self.agent, &prompt, &REFERENCE_STRATEGY_KEYS)
            .await?;

        let classes = object
            .get("filtres")
            .and_then(Value::as_object)
            .map(|filters| string_array(filters.get("classes")))
            .unwrap_or_default();

        state.reference_strategy = Some(ReferenceStrategy {
            classes,
            query: string_field(&object, "requete_texte"),
        });
        Ok(())
    }

    /// Stage 4: retrieve reference examples, kept even when empty.
    async fn fetch_reference_examples(&self, state: &mut PipelineRunState) -> Result<()> {
        tracing::info!(section = %state.section_title, "retrieving reference examples");

        let strategy = state
            .reference_strategy
            .as_ref()
            .ok_or_else(|| PropaleError::internal("reference strategy missing before retrieval"))?;

        state.reference_examples = self
            .references
            .search(&strategy.query, &strategy.classes)
            .await?;
        Ok(())
    }

    /// Stage 5: write the section text or pause on one clarifying question.
    async fn draft_section(&self, state: &mut PipelineRunState) -> Result<()> {
        tracing::info!(section = %state.section_title, "drafting and validating");

        let prompt = prompts::writer_validator_prompt(
            &state.section_title,
            &state.section_description,
            &state.prior_art_context,
            &state.reference_examples,
        );
        let object = self
            .parser
            .request_object(&self.agent, &prompt, &WRITER_KEYS)
            .await?;

        let status = object.get("status").and_then(Value::as_str).unwrap_or_default();
        state.outcome = Some(if status == "OK" {
            match object.get("texte_genere").and_then(Value::as_str) {
                Some(text) if !text.trim().is_empty() => DraftOutcome::Completed {
                    text: text.to_string(),
                },
                _ => {
                    return Err(PropaleError::internal(
                        "writer reported OK without generated text",
                    ));
                }
            }
        } else {
            // Any non-OK status pauses the section; there is no automatic retry.
            let question = object
                .get("question")
                .and_then(Value::as_str)
                .filter(|q| !q.trim().is_empty())
                .unwrap_or(DEFAULT_CLARIFICATION_QUESTION)
                .to_string();
            DraftOutcome::NeedsClarification { question }
        });
        Ok(())
    }
}

/// Agent wrapper that downgrades transport failures to a diagnostic payload.
///
/// The substituted JSON parses in the writer stage as a clarification request
/// carrying the transport diagnostic; in the strategist stages it fails the
/// parser's required-key check instead, which surfaces as a dossier error.
/// Either way the run reaches a terminal status instead of crashing the
/// session.
struct GuardedAgent {
    inner: Arc<dyn TextAgent>,
}

#[async_trait]
impl TextAgent for GuardedAgent {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn invoke(&self, prompt: &str) -> Result<String> {
        match self.inner.invoke(prompt).await {
            Ok(text) => Ok(text),
            Err(err) => {
                tracing::error!(agent = self.inner.name(), error = %err, "model call failed");
                Ok(serde_json::json!({
                    "status": "CLARIFICATION_NEEDED",
                    "question": format!("The generation service could not reach the language model: {err}"),
                    "texte_genere": null,
                    "manques": ["connexion_ia"],
                })
                .to_string())
            }
        }
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn string_array(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
