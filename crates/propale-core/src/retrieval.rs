//! Retrieval capability traits and excerpt types.
//!
//! Two capability interfaces feed the pipeline: prior-art context retrieval
//! (what the client asked for) and reference-example retrieval (how we
//! answered similar asks before). Both are pure query functions from the
//! runner's perspective.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A retrieved snippet of prior-art text with its source and category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Excerpt {
    /// Source label (document title), "N/A" when the index carries none
    pub source: String,
    /// Free text content of the snippet
    pub content: String,
    /// Category label the snippet was indexed under
    pub class: String,
}

/// Provenance attached to a scored reference excerpt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcerptMeta {
    pub title: String,
    pub class: String,
    /// Raw distance reported by the index
    pub distance: f64,
}

/// A reference-example snippet ranked by similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredExcerpt {
    /// Position in the result list (0-based)
    pub id: usize,
    pub content: String,
    /// Similarity score in `[0, 1]`, derived as `1 - distance` clamped
    pub score: f64,
    pub meta: ExcerptMeta,
}

/// Searches the requester's prior-art index (tender documents).
///
/// An empty query must short-circuit to an empty result without touching the
/// index; an absent collection must yield an empty result, not an error.
#[async_trait]
pub trait PriorArtSearch: Send + Sync {
    async fn search(&self, query_text: &str, class_filter: &[String]) -> Result<Vec<Excerpt>>;
}

/// Searches the requester's reference-example index (past proposals).
///
/// Same empty-query and absent-collection policy as [`PriorArtSearch`].
#[async_trait]
pub trait ReferenceExampleSearch: Send + Sync {
    async fn search(&self, query_text: &str, class_filter: &[String])
    -> Result<Vec<ScoredExcerpt>>;
}
