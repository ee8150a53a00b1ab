//! Prior-art context retrieval over the requester's document collection.

use std::sync::Arc;

use async_trait::async_trait;

use propale_core::{Excerpt, PriorArtSearch, Result};

use crate::search_client::{SearchRequest, SimilaritySearch};

const PRIOR_ART_LIMIT: usize = 10;

/// [`PriorArtSearch`] adapter over the shared similarity-search collaborator.
pub struct PriorArtIndex {
    search: Arc<dyn SimilaritySearch>,
    collection: String,
}

impl PriorArtIndex {
    /// Creates the adapter for one requester's document collection.
    pub fn new(search: Arc<dyn SimilaritySearch>, collection: impl Into<String>) -> Self {
        Self {
            search,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl PriorArtSearch for PriorArtIndex {
    async fn search(&self, query_text: &str, class_filter: &[String]) -> Result<Vec<Excerpt>> {
        if query_text.trim().is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            collection = %self.collection,
            query = query_text,
            classes = ?class_filter,
            "prior-art search"
        );

        let request = SearchRequest {
            collection: self.collection.clone(),
            query_text: query_text.to_string(),
            classes: class_filter.to_vec(),
            limit: PRIOR_ART_LIMIT,
            include_distance: false,
        };

        let hits = match self.search.query(&request).await {
            Ok(hits) => hits,
            Err(err) if err.is_not_found() => {
                tracing::warn!(
                    collection = %self.collection,
                    "collection absent, returning no prior-art excerpts"
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        tracing::debug!(count = hits.len(), "prior-art search done");

        Ok(hits
            .into_iter()
            .map(|hit| Excerpt {
                source: if hit.title.is_empty() {
                    "N/A".to_string()
                } else {
                    hit.title
                },
                content: hit.content,
                class: if hit.class.is_empty() {
                    "N/A".to_string()
                } else {
                    hit.class
                },
            })
            .collect())
    }
}
