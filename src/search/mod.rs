//! Vector search abstraction and implementations.
//!
//! This module defines the interface for semantic vector search over the
//! hosted article and term collections. The core treats search results as
//! opaque hits: an identifier, a property map, and a distance. Shaping into
//! domain types happens in the app layer.

pub mod weaviate;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur during vector search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network or API communication error
    #[error("search request failed: {0}")]
    ApiError(String),

    /// Response shape did not match expectations
    #[error("invalid search response: {0}")]
    InvalidResponse(String),

    /// Configuration error (e.g., unknown collection, client build failure)
    #[error("search configuration error: {0}")]
    ConfigError(String),

    /// Other unexpected errors
    #[error("unexpected search error: {0}")]
    Other(String),
}

/// Result type for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Default number of hits requested per search.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Article collection name.
pub const ARTICLE_COLLECTION: &str = "Article";

/// Subject-term collection name.
pub const TERM_COLLECTION: &str = "term";

/// One vector search hit.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Object identifier assigned by the search service
    pub id: String,

    /// Raw object properties as returned by the service
    pub properties: Map<String, Value>,

    /// Vector distance to the query (lower is closer)
    pub distance: f64,
}

impl SearchHit {
    /// Read a string property, if present.
    pub fn property_str(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(Value::as_str)
    }
}

/// Trait for vector search services.
///
/// Implementations run a near-text query against a named collection and
/// return hits ordered by ascending distance.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// Search `collection` for objects semantically close to `query`.
    ///
    /// # Arguments
    /// * `collection` - Collection name (e.g., "Article", "term")
    /// * `query` - Free-text query to embed and match
    /// * `limit` - Maximum number of hits
    ///
    /// # Errors
    /// Returns `SearchError` if the search fails
    async fn search(&self, collection: &str, query: &str, limit: usize)
        -> SearchResult<Vec<SearchHit>>;
}
