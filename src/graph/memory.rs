//! In-memory article graph.
//!
//! A [`GraphStore`] backed by a flat table of [`ArticleRow`]s, loadable
//! from a JSON export of the dataset. Queries scan the table; the dataset
//! is small enough (one term search worth of candidates) that nothing
//! smarter is warranted.

use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use super::{ArticleRow, GraphError, GraphResult, GraphStore};

/// Flat-table article graph.
#[derive(Debug)]
pub struct MemoryGraphStore {
    rows: Vec<ArticleRow>,
}

impl MemoryGraphStore {
    /// Create a store over the given rows.
    pub fn new(rows: Vec<ArticleRow>) -> Self {
        Self { rows }
    }

    /// Load a store from a JSON file containing an array of rows.
    pub async fn from_json_file(path: impl AsRef<Path>) -> GraphResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let rows: Vec<ArticleRow> = serde_json::from_str(&raw)
            .map_err(|e| GraphError::InvalidDataset(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), rows = rows.len(), "loaded article graph");
        Ok(Self::new(rows))
    }

    /// Number of rows in the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn articles_for_term(
        &self,
        term_uri: &str,
        candidates: &[String],
    ) -> GraphResult<Vec<ArticleRow>> {
        Ok(self
            .rows
            .iter()
            .filter(|row| row.term_uri == term_uri && candidates.contains(&row.article_uri))
            .cloned()
            .collect())
    }
}
