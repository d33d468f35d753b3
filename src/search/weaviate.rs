//! Weaviate vector search client.
//!
//! Implements the [`VectorSearch`] trait against a Weaviate Cloud instance
//! using the GraphQL `nearText` operator. The OpenAI API key is forwarded
//! in a header so the cluster can vectorize query text server-side.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{SearchError, SearchHit, SearchResult, VectorSearch, ARTICLE_COLLECTION, TERM_COLLECTION};

/// Timeout applied to every search request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for a Weaviate Cloud instance.
pub struct WeaviateClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    openai_api_key: String,
}

impl WeaviateClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - Cluster URL, e.g. `https://my-cluster.weaviate.network`
    /// * `api_key` - Weaviate API key
    /// * `openai_api_key` - OpenAI key forwarded for server-side vectorization
    pub fn new(
        base_url: String,
        api_key: String,
        openai_api_key: String,
    ) -> SearchResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SearchError::ConfigError(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            openai_api_key,
        })
    }

    /// Property fields requested per collection.
    ///
    /// GraphQL requires an explicit field selection, so each collection the
    /// workbench queries has a known shape.
    fn fields_for(collection: &str) -> SearchResult<&'static [&'static str]> {
        match collection {
            ARTICLE_COLLECTION => Ok(&["title", "abstractText", "meshMajor", "article_URI"]),
            TERM_COLLECTION => Ok(&["meshTerm"]),
            other => Err(SearchError::ConfigError(format!(
                "unknown collection: {other}"
            ))),
        }
    }

    /// Build the GraphQL near-text query for one collection.
    fn near_text_query(collection: &str, query: &str, limit: usize) -> SearchResult<String> {
        let fields = Self::fields_for(collection)?.join(" ");
        // Serialize the concept through serde_json so quoting is correct.
        let concept = serde_json::to_string(query)
            .map_err(|e| SearchError::Other(e.to_string()))?;
        Ok(format!(
            "{{ Get {{ {collection}(nearText: {{concepts: [{concept}]}}, limit: {limit}) \
             {{ {fields} _additional {{ id distance }} }} }} }}"
        ))
    }

    fn parse_hits(body: Value, collection: &str) -> SearchResult<Vec<SearchHit>> {
        if let Some(errors) = body.get("errors") {
            return Err(SearchError::ApiError(errors.to_string()));
        }
        let objects = body
            .get("data")
            .and_then(|d| d.get("Get"))
            .and_then(|g| g.get(collection))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                SearchError::InvalidResponse(format!(
                    "missing data.Get.{collection} in response"
                ))
            })?;

        let mut hits = Vec::with_capacity(objects.len());
        for object in objects {
            let Some(object) = object.as_object() else {
                continue;
            };
            let additional = object.get("_additional").and_then(Value::as_object);
            let id = additional
                .and_then(|a| a.get("id"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let distance = additional
                .and_then(|a| a.get("distance"))
                .and_then(Value::as_f64)
                .unwrap_or(f64::MAX);

            let mut properties = Map::new();
            for (key, value) in object {
                if key != "_additional" {
                    properties.insert(key.clone(), value.clone());
                }
            }
            hits.push(SearchHit {
                id,
                properties,
                distance,
            });
        }
        Ok(hits)
    }
}

#[async_trait]
impl VectorSearch for WeaviateClient {
    async fn search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
    ) -> SearchResult<Vec<SearchHit>> {
        let graphql = Self::near_text_query(collection, query, limit)?;
        debug!(collection, limit, "running near-text search");

        let response = self
            .http
            .post(format!("{}/v1/graphql", self.base_url))
            .bearer_auth(&self.api_key)
            .header("X-OpenAI-Api-Key", &self.openai_api_key)
            .json(&json!({ "query": graphql }))
            .send()
            .await
            .map_err(|e| SearchError::ApiError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError(format!(
                "search service returned {status}: {body}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;
        Self::parse_hits(body, collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_near_text_query_shape() {
        let query =
            WeaviateClient::near_text_query(ARTICLE_COLLECTION, "Mouth Neoplasms", 10).unwrap();
        assert!(query.contains(r#"Article(nearText: {concepts: ["Mouth Neoplasms"]}, limit: 10)"#));
        assert!(query.contains("_additional { id distance }"));
        assert!(query.contains("abstractText"));
    }

    #[test]
    fn test_near_text_query_escapes_quotes() {
        let query = WeaviateClient::near_text_query(TERM_COLLECTION, r#"a "b" c"#, 5).unwrap();
        assert!(query.contains(r#"concepts: ["a \"b\" c"]"#));
    }

    #[test]
    fn test_unknown_collection_is_config_error() {
        let err = WeaviateClient::near_text_query("Nope", "x", 1).unwrap_err();
        assert!(matches!(err, SearchError::ConfigError(_)));
    }

    #[test]
    fn test_parse_hits() {
        let body = json!({
            "data": { "Get": { "Article": [
                {
                    "title": "Oral cancer trends",
                    "abstractText": "An abstract.",
                    "_additional": { "id": "uuid-1", "distance": 0.12 }
                }
            ]}}
        });
        let hits = WeaviateClient::parse_hits(body, "Article").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "uuid-1");
        assert_eq!(hits[0].property_str("title"), Some("Oral cancer trends"));
        assert!((hits[0].distance - 0.12).abs() < 1e-9);
        assert!(!hits[0].properties.contains_key("_additional"));
    }

    #[test]
    fn test_parse_hits_graphql_errors() {
        let body = json!({ "errors": [{ "message": "boom" }] });
        let err = WeaviateClient::parse_hits(body, "Article").unwrap_err();
        assert!(matches!(err, SearchError::ApiError(_)));
    }

    #[test]
    fn test_parse_hits_missing_collection() {
        let body = json!({ "data": { "Get": {} } });
        let err = WeaviateClient::parse_hits(body, "Article").unwrap_err();
        assert!(matches!(err, SearchError::InvalidResponse(_)));
    }
}
