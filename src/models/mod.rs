//! Core data models for the medgraph workbench.
//!
//! This module contains the fundamental data structures used across the
//! application, including article previews shown after a vector search and
//! the order-preserving set used for deduplication throughout the term
//! refinement pipeline.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A deduplicated sequence of strings that preserves first-seen order.
///
/// The term pipeline deduplicates in several places (alternate labels,
/// narrower-concept child lists, root term lists) and in every one of them
/// the order of first appearance is part of the contract: it decides display
/// order and, downstream, ranking tie-breaks. A plain `HashSet` would lose
/// that order, so the membership set is kept alongside the insertion
/// sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedSet {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl OrderedSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, keeping the position of an earlier duplicate.
    ///
    /// Returns `true` if the value was newly inserted.
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.seen.contains(&value) {
            return false;
        }
        self.seen.insert(value.clone());
        self.items.push(value);
        true
    }

    /// Check membership.
    pub fn contains(&self, value: &str) -> bool {
        self.seen.contains(value)
    }

    /// Iterate values in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the set, returning the deduplicated sequence.
    pub fn into_vec(self) -> Vec<String> {
        self.items
    }

    /// Borrow the deduplicated sequence.
    pub fn as_slice(&self) -> &[String] {
        &self.items
    }
}

impl FromIterator<String> for OrderedSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<'a> FromIterator<&'a str> for OrderedSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

/// A single article hit from the vector search, shaped for display.
///
/// The abstract is truncated to a short preview; the full text only matters
/// later, at the filtering stage, where it comes from the graph dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticlePreview {
    /// Article title
    pub title: String,

    /// Truncated abstract preview
    pub abstract_preview: String,

    /// Vector distance reported by the search service (lower is closer)
    pub distance: f64,

    /// Major subject terms the article is tagged with
    pub mesh_terms: Vec<String>,
}

/// Number of abstract characters kept in an [`ArticlePreview`].
pub const ABSTRACT_PREVIEW_LEN: usize = 100;

impl ArticlePreview {
    /// Build a preview, truncating the abstract to [`ABSTRACT_PREVIEW_LEN`]
    /// characters.
    pub fn new(title: String, abstract_text: &str, distance: f64, mesh_terms: Vec<String>) -> Self {
        let preview: String = abstract_text.chars().take(ABSTRACT_PREVIEW_LEN).collect();
        let abstract_preview = if abstract_text.chars().count() > ABSTRACT_PREVIEW_LEN {
            format!("{preview}...")
        } else {
            preview
        };
        Self {
            title,
            abstract_preview,
            distance,
            mesh_terms,
        }
    }
}

/// Parse a stored subject-term list into individual terms.
///
/// Upstream the `meshMajor` property is a stringified list, usually in
/// Python repr form (`"['Mouth Neoplasms', 'Humans']"`) but sometimes plain
/// JSON. Both are accepted; anything unparseable degrades to an empty list.
pub fn parse_term_list(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    if let Ok(serde_json::Value::Array(values)) = serde_json::from_str(raw) {
        return values
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
    }
    // Fall back to scanning the repr form's quoted items. Terms routinely
    // contain commas ("Neoplasms, Mouth"), so splitting on bare commas
    // would break them apart.
    if raw.contains('\'') || raw.contains('"') {
        let mut terms = Vec::new();
        let mut chars = raw.char_indices();
        while let Some((start, c)) = chars.next() {
            if c != '\'' && c != '"' {
                continue;
            }
            let Some(end) = chars.by_ref().find_map(|(i, d)| (d == c).then_some(i)) else {
                break;
            };
            let term = raw[start + 1..end].trim();
            if !term.is_empty() {
                terms.push(term.to_string());
            }
        }
        return terms;
    }

    // Unquoted list: comma-splitting is all there is.
    let inner = raw.trim_start_matches('[').trim_end_matches(']');
    inner
        .split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_set_preserves_first_seen_order() {
        let mut set = OrderedSet::new();
        assert!(set.insert("b"));
        assert!(set.insert("a"));
        assert!(!set.insert("b"));
        assert!(set.insert("c"));
        assert_eq!(set.as_slice(), &["b", "a", "c"]);
        assert_eq!(set.len(), 3);
        assert!(set.contains("a"));
        assert!(!set.contains("d"));
    }

    #[test]
    fn test_ordered_set_from_iterator() {
        let set: OrderedSet = ["x", "y", "x", "z"].into_iter().collect();
        assert_eq!(set.into_vec(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_article_preview_truncation() {
        let long_abstract = "a".repeat(150);
        let preview = ArticlePreview::new("Title".to_string(), &long_abstract, 0.1, vec![]);
        assert_eq!(preview.abstract_preview.len(), ABSTRACT_PREVIEW_LEN + 3);
        assert!(preview.abstract_preview.ends_with("..."));

        let short = ArticlePreview::new("Title".to_string(), "short", 0.1, vec![]);
        assert_eq!(short.abstract_preview, "short");
    }

    #[test]
    fn test_parse_term_list_repr_form() {
        let terms = parse_term_list("['Mouth Neoplasms', 'Humans']");
        assert_eq!(terms, vec!["Mouth Neoplasms", "Humans"]);
    }

    #[test]
    fn test_parse_term_list_json_form() {
        let terms = parse_term_list(r#"["Mouth Neoplasms", "Humans"]"#);
        assert_eq!(terms, vec!["Mouth Neoplasms", "Humans"]);
    }

    #[test]
    fn test_parse_term_list_keeps_comma_terms_intact() {
        let terms = parse_term_list("['Neoplasms, Mouth']");
        assert_eq!(terms, vec!["Neoplasms, Mouth"]);

        let terms = parse_term_list("['Neoplasms, Mouth', 'Humans']");
        assert_eq!(terms, vec!["Neoplasms, Mouth", "Humans"]);
    }

    #[test]
    fn test_parse_term_list_unquoted_fallback() {
        let terms = parse_term_list("[Mouth Neoplasms, Humans]");
        assert_eq!(terms, vec!["Mouth Neoplasms", "Humans"]);
    }

    #[test]
    fn test_parse_term_list_empty() {
        assert!(parse_term_list("").is_empty());
        assert!(parse_term_list("[]").is_empty());
    }
}
