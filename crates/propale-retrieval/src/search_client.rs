//! Similarity-search collaborator interface and HTTP implementation.
//!
//! The vector index (schema management, embedding computation, ranking) lives
//! behind a search gateway; this module only shapes requests and responses.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use propale_core::{PropaleError, Result};

/// A filtered similarity query against one collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub collection: String,
    pub query_text: String,
    /// Class labels ORed together; empty means no filter
    pub classes: Vec<String>,
    pub limit: usize,
    /// Ask the index to report per-hit distances
    pub include_distance: bool,
}

/// One ranked item returned by the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub class: String,
    /// Present only when distances were requested and the index reports them
    #[serde(default)]
    pub distance: Option<f64>,
}

/// External similarity-search collaborator.
///
/// Implementations must be safe to share across sessions; the underlying
/// connection is one per process.
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    /// Runs the query and returns ranked hits.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the target collection does not exist and
    /// `RetrievalTransport` on connectivity or auth failure.
    async fn query(&self, request: &SearchRequest) -> Result<Vec<SearchHit>>;
}

/// Search gateway client over HTTP.
#[derive(Clone)]
pub struct HttpSearchClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpSearchClient {
    /// Creates a client for the gateway at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: None,
        }
    }

    /// Attaches a bearer token sent with every query.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn query_url(&self, collection: &str) -> String {
        format!(
            "{}/collections/{}/query",
            self.base_url.trim_end_matches('/'),
            collection
        )
    }
}

#[derive(Serialize)]
struct QueryBody<'a> {
    query: &'a str,
    classes: &'a [String],
    limit: usize,
    include_distance: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[async_trait]
impl SimilaritySearch for HttpSearchClient {
    async fn query(&self, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        let body = QueryBody {
            query: &request.query_text,
            classes: &request.classes,
            limit: request.limit,
            include_distance: request.include_distance,
        };

        let mut builder = self.client.post(self.query_url(&request.collection)).json(&body);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = builder.send().await.map_err(|err| {
            PropaleError::retrieval_transport(format!("search gateway request failed: {err}"))
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(PropaleError::not_found(
                "collection",
                request.collection.clone(),
            )),
            status if !status.is_success() => {
                let body_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Failed to read search gateway error body".to_string());
                Err(PropaleError::retrieval_transport(format!(
                    "search gateway returned HTTP {}: {}",
                    status.as_u16(),
                    body_text
                )))
            }
            _ => {
                let parsed: QueryResponse = response.json().await.map_err(|err| {
                    PropaleError::retrieval_transport(format!(
                        "failed to parse search gateway response: {err}"
                    ))
                })?;
                Ok(parsed.hits)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_url_normalizes_trailing_slash() {
        let client = HttpSearchClient::new("http://localhost:8090/");
        assert_eq!(
            client.query_url("JohndoeDoc"),
            "http://localhost:8090/collections/JohndoeDoc/query"
        );
    }

    #[test]
    fn test_hit_deserializes_with_missing_fields() {
        let hit: SearchHit = serde_json::from_str("{\"content\":\"text\"}").unwrap();
        assert_eq!(hit.content, "text");
        assert_eq!(hit.title, "");
        assert!(hit.distance.is_none());
    }
}
