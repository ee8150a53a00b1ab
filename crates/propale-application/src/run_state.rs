//! Ephemeral state of one pipeline run.

use indexmap::IndexMap;

use propale_core::{Excerpt, ScoredExcerpt, SearchTaxonomies};

/// Search strategy chosen by stage 1 for prior-art retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorArtStrategy {
    pub selected_classes: Vec<String>,
    pub query: String,
}

/// Search strategy chosen by stage 3 for reference-example retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceStrategy {
    pub classes: Vec<String>,
    pub query: String,
}

/// Terminal result of stage 5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftOutcome {
    /// The writer produced finished section text.
    Completed { text: String },
    /// The writer paused on exactly one clarifying question.
    NeedsClarification { question: String },
}

/// State accumulated across the five stages of one run.
///
/// Created fresh per invocation of the runner and discarded afterwards; it is
/// exclusively owned by that single run and never shared.
#[derive(Debug, Clone)]
pub struct PipelineRunState {
    pub section_title: String,
    pub section_description: String,
    pub prior_art_labels: IndexMap<String, Vec<String>>,
    pub reference_classes: Vec<String>,
    pub prior_art_strategy: Option<PriorArtStrategy>,
    pub prior_art_context: Vec<Excerpt>,
    pub reference_strategy: Option<ReferenceStrategy>,
    pub reference_examples: Vec<ScoredExcerpt>,
    pub outcome: Option<DraftOutcome>,
}

impl PipelineRunState {
    /// Creates the input state for one run of a section's pipeline.
    pub fn new(
        section_title: impl Into<String>,
        section_description: impl Into<String>,
        taxonomies: &SearchTaxonomies,
    ) -> Self {
        Self {
            section_title: section_title.into(),
            section_description: section_description.into(),
            prior_art_labels: taxonomies.prior_art_labels.clone(),
            reference_classes: taxonomies.reference_classes.clone(),
            prior_art_strategy: None,
            prior_art_context: Vec::new(),
            reference_strategy: None,
            reference_examples: Vec::new(),
            outcome: None,
        }
    }
}
