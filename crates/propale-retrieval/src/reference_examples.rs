//! Reference-example retrieval over the requester's proposal collection.

use std::sync::Arc;

use async_trait::async_trait;

use propale_core::{ExcerptMeta, ReferenceExampleSearch, Result, ScoredExcerpt};

use crate::search_client::{SearchRequest, SimilaritySearch};

const REFERENCE_LIMIT: usize = 5;

/// [`ReferenceExampleSearch`] adapter over the shared collaborator.
///
/// Scores are derived from the index's distance metric as `1 - distance`,
/// clamped to `[0, 1]`; a hit without a distance scores 0.
pub struct ReferenceExampleIndex {
    search: Arc<dyn SimilaritySearch>,
    collection: String,
}

impl ReferenceExampleIndex {
    /// Creates the adapter for one requester's proposal collection.
    pub fn new(search: Arc<dyn SimilaritySearch>, collection: impl Into<String>) -> Self {
        Self {
            search,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl ReferenceExampleSearch for ReferenceExampleIndex {
    async fn search(
        &self,
        query_text: &str,
        class_filter: &[String],
    ) -> Result<Vec<ScoredExcerpt>> {
        if query_text.trim().is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            collection = %self.collection,
            query = query_text,
            classes = ?class_filter,
            "reference-example search"
        );

        let request = SearchRequest {
            collection: self.collection.clone(),
            query_text: query_text.to_string(),
            classes: class_filter.to_vec(),
            limit: REFERENCE_LIMIT,
            include_distance: true,
        };

        let hits = match self.search.query(&request).await {
            Ok(hits) => hits,
            Err(err) if err.is_not_found() => {
                tracing::warn!(
                    collection = %self.collection,
                    "collection absent, returning no reference examples"
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        tracing::debug!(count = hits.len(), "reference-example search done");

        Ok(hits
            .into_iter()
            .enumerate()
            .map(|(id, hit)| {
                let distance = hit.distance.unwrap_or(1.0);
                ScoredExcerpt {
                    id,
                    content: hit.content,
                    score: (1.0 - distance).clamp(0.0, 1.0),
                    meta: ExcerptMeta {
                        title: hit.title,
                        class: hit.class,
                        distance,
                    },
                }
            })
            .collect())
    }
}
