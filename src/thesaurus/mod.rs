//! Thesaurus lookup abstraction and the concept expansion engine.
//!
//! This module defines the interface for querying an external controlled
//! vocabulary (alternate labels and broader/narrower relations) and the
//! expansion engine that turns raw lookups into the deduplicated,
//! sanitized structures the term tree renders.
//!
//! The abstraction allows the engine to run against the real MeSH SPARQL
//! endpoint in production and against scripted fixtures in tests.

pub mod mesh;

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::models::OrderedSet;

/// Errors that can occur during thesaurus operations.
#[derive(Debug, Error)]
pub enum ThesaurusError {
    /// Network or endpoint communication error
    #[error("thesaurus request failed: {0}")]
    ApiError(String),

    /// Response could not be parsed into SPARQL results
    #[error("invalid thesaurus response: {0}")]
    InvalidResponse(String),

    /// Configuration error (e.g., bad endpoint, client build failure)
    #[error("thesaurus configuration error: {0}")]
    ConfigError(String),

    /// Other unexpected errors
    #[error("unexpected thesaurus error: {0}")]
    Other(String),
}

/// Result type for thesaurus operations.
pub type ThesaurusResult<T> = Result<T, ThesaurusError>;

/// Trait for controlled-vocabulary lookups.
///
/// A term that is absent from the vocabulary yields an empty list, not an
/// error; errors are reserved for failures reaching or parsing the
/// underlying service.
#[async_trait]
pub trait Thesaurus: Send + Sync {
    /// Alternate labels recorded for the concept with the given preferred
    /// label.
    async fn alt_labels(&self, term: &str) -> ThesaurusResult<Vec<String>>;

    /// Preferred labels of concepts narrower than the concept with the
    /// given preferred label.
    async fn narrower(&self, term: &str) -> ThesaurusResult<Vec<String>>;
}

/// Hard ceiling on recursive narrower-concept expansion.
///
/// Each extra level multiplies external-call fan-out, so the engine clamps
/// caller-supplied depths to this bound.
pub const MAX_EXPANSION_DEPTH: usize = 2;

/// Depth used when the caller does not care: one hop of narrower concepts.
pub const DEFAULT_EXPANSION_DEPTH: usize = 1;

/// Clean a raw vocabulary term for lookup and display.
///
/// Strips surrounding quote characters, replaces underscores with spaces,
/// and trims whitespace. Applied everywhere a term crosses into or out of
/// the thesaurus layer.
pub fn sanitize_term(term: &str) -> String {
    term.trim_matches(|c| c == '\'' || c == '"')
        .replace('_', " ")
        .trim()
        .to_string()
}

/// Concept expansion engine.
///
/// Wraps a [`Thesaurus`] and produces the two structures a node expansion
/// caches: the deduplicated alternate-label list and the narrower-concept
/// mapping. The engine has no cycle protection of its own; the traversal
/// driver breaks cycles at render time, and the depth cap bounds the work a
/// pathological vocabulary can cause here.
pub struct ConceptExpander<T: Thesaurus> {
    thesaurus: T,
}

impl<T: Thesaurus> ConceptExpander<T> {
    /// Create an expander over the given thesaurus.
    pub fn new(thesaurus: T) -> Self {
        Self { thesaurus }
    }

    /// Borrow the underlying thesaurus.
    pub fn thesaurus(&self) -> &T {
        &self.thesaurus
    }

    /// Fetch deduplicated alternate labels for `term`.
    ///
    /// The sanitized input term is always part of the result, so absent a
    /// hard failure the list is never empty. Order is first-seen during the
    /// underlying lookup, with the input term appended if the lookup did
    /// not already produce it.
    ///
    /// # Errors
    /// A failure of the direct lookup for `term` itself is propagated; the
    /// caller rolls the expansion back.
    pub async fn fetch_alt_names(&self, term: &str) -> ThesaurusResult<Vec<String>> {
        let term = sanitize_term(term);
        let labels = self.thesaurus.alt_labels(&term).await?;

        let mut names = OrderedSet::new();
        for label in labels {
            let label = sanitize_term(&label);
            if !label.is_empty() {
                names.insert(label);
            }
        }
        names.insert(term);
        Ok(names.into_vec())
    }

    /// Fetch the narrower-concept mapping for `term`, recursively expanding
    /// up to `depth` hops from the initial term.
    ///
    /// Each entry maps a concept to its deduplicated child list in
    /// first-seen order. A child reachable via multiple parents appears in
    /// every parent's list; concept keys themselves appear once, at their
    /// first encounter.
    ///
    /// # Errors
    /// A failure looking up the initial term is propagated. Failures on
    /// sub-terms are logged and treated as "no results for that sub-term",
    /// so partial results are always returned rather than aborting the
    /// whole fetch.
    pub async fn fetch_narrower(
        &self,
        term: &str,
        depth: usize,
    ) -> ThesaurusResult<Vec<(String, Vec<String>)>> {
        let depth = if depth > MAX_EXPANSION_DEPTH {
            warn!(
                requested = depth,
                cap = MAX_EXPANSION_DEPTH,
                "expansion depth clamped"
            );
            MAX_EXPANSION_DEPTH
        } else {
            depth.max(1)
        };

        let root = sanitize_term(term);
        let mut mapping: Vec<(String, Vec<String>)> = Vec::new();
        let mut seen_concepts: HashSet<String> = HashSet::new();
        let mut frontier = vec![root];

        for level in 1..=depth {
            let mut next = Vec::new();
            for concept in frontier {
                if !seen_concepts.insert(concept.clone()) {
                    continue;
                }
                let children = if level == 1 {
                    // The initial term: a failure here aborts the expansion.
                    self.lookup_children(&concept).await?
                } else {
                    match self.lookup_children(&concept).await {
                        Ok(children) => children,
                        Err(err) => {
                            warn!(term = %concept, error = %err,
                                "narrower lookup failed, treating as empty");
                            Vec::new()
                        }
                    }
                };
                next.extend(children.iter().cloned());
                mapping.push((concept, children));
            }
            frontier = next;
        }
        Ok(mapping)
    }

    async fn lookup_children(&self, concept: &str) -> ThesaurusResult<Vec<String>> {
        let raw = self.thesaurus.narrower(concept).await?;
        let children: OrderedSet = raw.iter().map(|c| sanitize_term(c)).collect();
        Ok(children.into_vec())
    }
}
