//! Per-node cached state.
//!
//! Each node identity owns a record holding the data fetched on expansion
//! (alternate labels and narrower-concept groups) plus the expand/collapse
//! flag. Records are created lazily during render and populated only when
//! the user expands the node; collapsing keeps the cached data so a
//! re-expand needs no refetch.

use std::collections::HashMap;

use super::identity::NodeId;

/// Cached state for one tree position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeRecord {
    /// The term this node was created for
    pub term: String,

    /// Deduplicated alternate labels, in fetch order
    pub alt_names: Vec<String>,

    /// Narrower-concept groups: (concept, deduplicated child terms),
    /// in fetch order
    pub narrower: Vec<(String, Vec<String>)>,

    /// Whether the node is currently expanded
    pub expanded: bool,

    /// Whether expansion data has been fetched; collapse keeps this set so
    /// a re-expand needs no refetch
    pub fetched: bool,
}

/// Store of node records keyed by identity.
#[derive(Debug, Default)]
pub struct NodeStore {
    records: HashMap<NodeId, NodeRecord>,
}

impl NodeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record for `id` if none exists yet. Idempotent.
    pub fn ensure_exists(&mut self, id: NodeId, term: &str) {
        self.records.entry(id).or_insert_with(|| NodeRecord {
            term: term.to_string(),
            ..NodeRecord::default()
        });
    }

    /// Whether a record exists for `id`.
    pub fn contains(&self, id: NodeId) -> bool {
        self.records.contains_key(&id)
    }

    /// Borrow the record for `id`, if any.
    pub fn get(&self, id: NodeId) -> Option<&NodeRecord> {
        self.records.get(&id)
    }

    /// The term a record was created for.
    pub fn term(&self, id: NodeId) -> Option<&str> {
        self.records.get(&id).map(|r| r.term.as_str())
    }

    /// Whether the node is currently expanded. Missing records count as
    /// collapsed.
    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.records.get(&id).map(|r| r.expanded).unwrap_or(false)
    }

    /// Cached alternate labels for `id` (empty until first expansion).
    pub fn alt_names(&self, id: NodeId) -> &[String] {
        self.records.get(&id).map(|r| r.alt_names.as_slice()).unwrap_or(&[])
    }

    /// Cached narrower-concept groups for `id` (empty until first
    /// expansion).
    pub fn narrower(&self, id: NodeId) -> &[(String, Vec<String>)] {
        self.records.get(&id).map(|r| r.narrower.as_slice()).unwrap_or(&[])
    }

    /// Whether expansion data has been fetched for `id`.
    pub fn is_fetched(&self, id: NodeId) -> bool {
        self.records.get(&id).map(|r| r.fetched).unwrap_or(false)
    }

    /// Collapse the node, keeping all cached data.
    pub fn collapse(&mut self, id: NodeId) {
        if let Some(record) = self.records.get_mut(&id) {
            record.expanded = false;
        }
    }

    /// Re-expand a node whose data is already cached.
    pub fn expand_cached(&mut self, id: NodeId) {
        if let Some(record) = self.records.get_mut(&id) {
            if record.fetched {
                record.expanded = true;
            }
        }
    }

    /// Store freshly fetched expansion data and mark the node expanded.
    ///
    /// Called only after a successful fetch, so a failed expansion leaves
    /// the previous cached state untouched.
    pub fn store_expansion(
        &mut self,
        id: NodeId,
        alt_names: Vec<String>,
        narrower: Vec<(String, Vec<String>)>,
    ) {
        if let Some(record) = self.records.get_mut(&id) {
            record.alt_names = alt_names;
            record.narrower = narrower;
            record.expanded = true;
            record.fetched = true;
        }
    }

    /// Drop all records (new-epoch reset).
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of records in the store.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_exists_is_idempotent() {
        let mut store = NodeStore::new();
        store.ensure_exists(0, "Mouth Neoplasms");
        store.store_expansion(0, vec!["Cancer of Mouth".to_string()], vec![]);
        store.ensure_exists(0, "Mouth Neoplasms");

        let record = store.get(0).unwrap();
        assert_eq!(record.alt_names, vec!["Cancer of Mouth"]);
        assert!(record.expanded);
    }

    #[test]
    fn test_missing_record_reads_as_collapsed_and_empty() {
        let store = NodeStore::new();
        assert!(!store.is_expanded(7));
        assert!(store.alt_names(7).is_empty());
        assert!(store.narrower(7).is_empty());
        assert!(!store.contains(7));
    }

    #[test]
    fn test_collapse_is_non_destructive() {
        let mut store = NodeStore::new();
        store.ensure_exists(1, "Mouth Neoplasms");
        let alt = vec!["Cancer of Mouth".to_string()];
        let narrower = vec![(
            "Mouth Neoplasms".to_string(),
            vec!["Gingival Neoplasms".to_string()],
        )];
        store.store_expansion(1, alt.clone(), narrower.clone());

        store.collapse(1);
        assert!(!store.is_expanded(1));
        assert!(store.is_fetched(1));
        assert_eq!(store.alt_names(1), alt.as_slice());
        assert_eq!(store.narrower(1), narrower.as_slice());

        // Cached data allows re-expansion without a refetch.
        store.expand_cached(1);
        assert!(store.is_expanded(1));
        assert_eq!(store.alt_names(1), alt.as_slice());
    }

    #[test]
    fn test_expand_cached_is_a_no_op_before_first_fetch() {
        let mut store = NodeStore::new();
        store.ensure_exists(2, "Stomatitis");
        store.expand_cached(2);
        assert!(!store.is_expanded(2));
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut store = NodeStore::new();
        store.ensure_exists(1, "A");
        store.ensure_exists(2, "B");
        store.clear();
        assert!(store.is_empty());
    }
}
