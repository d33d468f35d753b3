//! Structured-dataset filtering and term-match ranking.
//!
//! This module defines the interface to the downloaded article graph (a
//! pattern query with the canonical term identifier as the single free
//! variable) and the ranking step that turns per-term matches into the
//! final top-K article list. The ranking policy is part of the behavioral
//! contract: articles score by the count of distinct matched terms, ties
//! keep the order of first encounter, and at most [`TOP_K`] survive.

pub mod download;
pub mod memory;

use std::collections::HashMap;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during graph operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Precondition failure: filtering was invoked with no selected terms
    #[error("the set of selected terms is empty")]
    EmptyTermSet,

    /// Precondition failure: filtering was invoked with no candidate articles
    #[error("no candidate articles; run an article search first")]
    NoCandidates,

    /// Dataset download failed
    #[error("dataset download failed: {0}")]
    DownloadError(String),

    /// Local file access failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Dataset query failed
    #[error("graph query failed: {0}")]
    QueryError(String),

    /// Dataset contents could not be parsed
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    /// Other unexpected errors
    #[error("unexpected graph error: {0}")]
    Other(String),
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Maximum number of ranked articles returned by filtering.
pub const TOP_K: usize = 10;

/// Base namespace for canonical term identifiers.
pub const TERM_NAMESPACE: &str = "http://example.org/mesh/";

/// One row of the article graph: an article tagged with one term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRow {
    /// Article identifier (URI)
    pub article_uri: String,

    /// Article title
    pub title: String,

    /// Abstract text
    pub abstract_text: String,

    /// Publication date as recorded in the dataset
    pub date_published: String,

    /// Access level recorded in the dataset
    pub access: String,

    /// Canonical identifier of the matched term
    pub term_uri: String,
}

/// A filtered article with its accumulated term matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedArticle {
    /// Article identifier (URI)
    pub article_uri: String,

    /// Article title
    pub title: String,

    /// Abstract text
    pub abstract_text: String,

    /// Publication date
    pub date_published: String,

    /// Access level
    pub access: String,

    /// Distinct matched term identifiers, in match order
    pub matched_terms: Vec<String>,
}

/// Trait for the downloaded article graph.
///
/// One invocation binds one canonical term identifier and returns every
/// candidate article tagged with it.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Articles among `candidates` tagged with `term_uri`.
    ///
    /// # Errors
    /// Returns `GraphError` if the query fails
    async fn articles_for_term(
        &self,
        term_uri: &str,
        candidates: &[String],
    ) -> GraphResult<Vec<ArticleRow>>;
}

static EDGE_NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\W+|\W+$").unwrap());
static NON_WORD_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").unwrap());
static UNDERSCORE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").unwrap());

/// Convert a term into its canonical identifier.
///
/// Non-word characters become underscores, runs collapse to a single
/// underscore, and the result is wrapped in single leading and trailing
/// underscores under [`TERM_NAMESPACE`] — matching how the dataset encodes
/// term identifiers.
pub fn term_to_uri(term: &str) -> String {
    let stripped = term.trim_matches('_');
    let stripped = EDGE_NON_WORD.replace_all(stripped, "");
    let formatted = NON_WORD_RUN.replace_all(&stripped, "_");
    let collapsed = UNDERSCORE_RUN.replace_all(&formatted, "_");
    format!("{TERM_NAMESPACE}_{collapsed}_")
}

/// Filter candidate articles against the selected terms and rank them.
///
/// Queries the graph once per term, accumulates per-article distinct term
/// matches in first-encounter order, then sorts by match count (stable, so
/// ties keep first-encounter order) and keeps the top [`TOP_K`].
///
/// # Errors
/// [`GraphError::EmptyTermSet`] if `terms` is empty and
/// [`GraphError::NoCandidates`] if `candidates` is empty; both are hard
/// precondition failures with no partial processing. Query failures abort
/// the whole filter action.
pub async fn filter_and_rank<G: GraphStore + ?Sized>(
    store: &G,
    terms: &[String],
    candidates: &[String],
) -> GraphResult<Vec<RankedArticle>> {
    if terms.is_empty() {
        return Err(GraphError::EmptyTermSet);
    }
    if candidates.is_empty() {
        return Err(GraphError::NoCandidates);
    }

    let mut order: Vec<String> = Vec::new();
    let mut articles: HashMap<String, RankedArticle> = HashMap::new();

    for term in terms {
        let term_uri = term_to_uri(term);
        let rows = store.articles_for_term(&term_uri, candidates).await?;
        debug!(term = %term, matches = rows.len(), "graph query");
        for row in rows {
            let entry = articles
                .entry(row.article_uri.clone())
                .or_insert_with(|| {
                    order.push(row.article_uri.clone());
                    RankedArticle {
                        article_uri: row.article_uri.clone(),
                        title: row.title.clone(),
                        abstract_text: row.abstract_text.clone(),
                        date_published: row.date_published.clone(),
                        access: row.access.clone(),
                        matched_terms: Vec::new(),
                    }
                });
            if !entry.matched_terms.contains(&row.term_uri) {
                entry.matched_terms.push(row.term_uri);
            }
        }
    }

    let mut ranked: Vec<RankedArticle> = order
        .iter()
        .filter_map(|uri| articles.remove(uri))
        .collect();
    // Stable sort: equal counts keep first-encounter order.
    ranked.sort_by(|a, b| b.matched_terms.len().cmp(&a.matched_terms.len()));
    ranked.truncate(TOP_K);
    Ok(ranked)
}

/// Concatenate the retained articles into the text handed to the LLM.
pub fn combine_abstracts(ranked: &[RankedArticle]) -> String {
    ranked
        .iter()
        .map(|article| format!("Title: {} Abstract: {}", article.title, article.abstract_text))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TableGraph {
        rows: Vec<ArticleRow>,
    }

    #[async_trait]
    impl GraphStore for TableGraph {
        async fn articles_for_term(
            &self,
            term_uri: &str,
            candidates: &[String],
        ) -> GraphResult<Vec<ArticleRow>> {
            Ok(self
                .rows
                .iter()
                .filter(|r| r.term_uri == term_uri && candidates.contains(&r.article_uri))
                .cloned()
                .collect())
        }
    }

    fn row(article: &str, term: &str) -> ArticleRow {
        ArticleRow {
            article_uri: article.to_string(),
            title: format!("Title {article}"),
            abstract_text: format!("Abstract {article}"),
            date_published: "2020-01-01".to_string(),
            access: "open".to_string(),
            term_uri: term_to_uri(term),
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_term_to_uri() {
        assert_eq!(
            term_to_uri("Mouth Neoplasms"),
            "http://example.org/mesh/_Mouth_Neoplasms_"
        );
        assert_eq!(
            term_to_uri("Neoplasms, Mouth"),
            "http://example.org/mesh/_Neoplasms_Mouth_"
        );
        assert_eq!(
            term_to_uri("_Mouth - Neoplasms_"),
            "http://example.org/mesh/_Mouth_Neoplasms_"
        );
    }

    #[tokio::test]
    async fn test_empty_terms_is_hard_error() {
        let graph = TableGraph { rows: vec![] };
        let err = filter_and_rank(&graph, &[], &strings(&["a"])).await.unwrap_err();
        assert!(matches!(err, GraphError::EmptyTermSet));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_hard_error() {
        let graph = TableGraph { rows: vec![] };
        let err = filter_and_rank(&graph, &strings(&["t"]), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::NoCandidates));
    }

    #[tokio::test]
    async fn test_ranking_by_distinct_match_count_with_stable_ties() {
        // X matches 3 terms, Y matches 1, Z matches 3. X and Z tie and must
        // keep their first-encounter order (X was seen first).
        let rows = vec![
            row("X", "T1"),
            row("Y", "T1"),
            row("Z", "T1"),
            row("X", "T2"),
            row("Z", "T2"),
            row("X", "T3"),
            row("Z", "T3"),
        ];
        let graph = TableGraph { rows };
        let candidates = strings(&["X", "Y", "Z"]);
        let ranked = filter_and_rank(&graph, &strings(&["T1", "T2", "T3"]), &candidates)
            .await
            .unwrap();

        let uris: Vec<&str> = ranked.iter().map(|a| a.article_uri.as_str()).collect();
        assert_eq!(uris, vec!["X", "Z", "Y"]);
        assert_eq!(ranked[0].matched_terms.len(), 3);
        assert_eq!(ranked[2].matched_terms.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_term_rows_count_once() {
        let rows = vec![row("X", "T1"), row("X", "T1")];
        let graph = TableGraph { rows };
        let ranked = filter_and_rank(&graph, &strings(&["T1"]), &strings(&["X"]))
            .await
            .unwrap();
        assert_eq!(ranked[0].matched_terms.len(), 1);
    }

    #[tokio::test]
    async fn test_candidates_outside_set_excluded() {
        let rows = vec![row("X", "T1"), row("W", "T1")];
        let graph = TableGraph { rows };
        let ranked = filter_and_rank(&graph, &strings(&["T1"]), &strings(&["X"]))
            .await
            .unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].article_uri, "X");
    }

    #[tokio::test]
    async fn test_top_k_truncation() {
        let mut rows = Vec::new();
        let mut candidates = Vec::new();
        for i in 0..15 {
            let uri = format!("A{i}");
            rows.push(row(&uri, "T1"));
            candidates.push(uri);
        }
        let graph = TableGraph { rows };
        let ranked = filter_and_rank(&graph, &strings(&["T1"]), &candidates)
            .await
            .unwrap();
        assert_eq!(ranked.len(), TOP_K);
    }

    #[test]
    fn test_combine_abstracts() {
        let ranked = vec![
            RankedArticle {
                article_uri: "X".to_string(),
                title: "First".to_string(),
                abstract_text: "Alpha.".to_string(),
                date_published: String::new(),
                access: String::new(),
                matched_terms: vec![],
            },
            RankedArticle {
                article_uri: "Y".to_string(),
                title: "Second".to_string(),
                abstract_text: "Beta.".to_string(),
                date_published: String::new(),
                access: String::new(),
                matched_terms: vec![],
            },
        ];
        assert_eq!(
            combine_abstracts(&ranked),
            "Title: First Abstract: Alpha. Title: Second Abstract: Beta."
        );
    }
}
