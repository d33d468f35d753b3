//! Per-session state for the interactive term forest.
//!
//! All mutable state behind the refinement UI lives in one [`Session`]
//! context object: the identity registry, the node store, the selection
//! set, the current root terms, and the epoch counter tying them together.
//! One user interaction triggers one full synchronous re-render of the
//! forest, so the session is a single-writer structure with no interior
//! locking; concurrency is handled by giving each user session its own
//! `Session`.
//!
//! # Lifecycle
//!
//! - `Session::new` — fresh session, epoch 0, everything empty
//! - [`Session::begin_epoch`] — a new top-level term search: bumps the
//!   epoch, clears the registry and node store, installs the new roots.
//!   The selection set survives; it is the user's cumulative bucket.
//! - During render, node identities and records are created on demand;
//!   records are populated when the user expands a node.

mod identity;
mod selection;
mod store;

pub use identity::{Epoch, IdentityRegistry, NodeId};
pub use selection::SelectionSet;
pub use store::{NodeRecord, NodeStore};

use crate::models::OrderedSet;

/// All mutable state for one user session.
#[derive(Debug, Default)]
pub struct Session {
    epoch: Epoch,
    registry: IdentityRegistry,
    store: NodeStore,
    selection: SelectionSet,
    current_terms: Vec<String>,
}

impl Session {
    /// Create a fresh session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current epoch.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Root terms of the current epoch, in display order.
    pub fn current_terms(&self) -> &[String] {
        &self.current_terms
    }

    /// Start a new epoch with a fresh set of root terms.
    ///
    /// Invalidates every node identity and record from the previous epoch
    /// so stale tree state cannot leak into the new search. Roots are
    /// deduplicated preserving first-seen order and registered in the
    /// selection set, which itself persists untouched.
    pub fn begin_epoch(&mut self, roots: Vec<String>) {
        self.epoch += 1;
        self.registry.clear_epoch();
        self.store.clear();

        let roots: OrderedSet = roots.into_iter().collect();
        self.current_terms = roots.into_vec();
        for term in &self.current_terms {
            self.selection.ensure(term);
        }
    }

    /// Resolve a (term, path) pair to its stable identity in the current
    /// epoch.
    pub fn node_id(&mut self, term: &str, path: &[String]) -> NodeId {
        self.registry.get_or_create(term, path, self.epoch)
    }

    /// The node store.
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Mutable access to the node store.
    pub fn store_mut(&mut self) -> &mut NodeStore {
        &mut self.store
    }

    /// The selection set.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Mutable access to the selection set.
    pub fn selection_mut(&mut self) -> &mut SelectionSet {
        &mut self.selection
    }

    /// Flip a term's selection flag and return the new value.
    pub fn toggle_selection(&mut self, term: &str) -> bool {
        self.selection.toggle(term)
    }

    /// Terms currently selected, in first-appearance order.
    pub fn selected_terms(&self) -> Vec<String> {
        self.selection.selected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_epoch_resets_tree_state() {
        let mut session = Session::new();
        session.begin_epoch(vec!["Neoplasms".to_string()]);
        let id = session.node_id("Neoplasms", &[]);
        session.store_mut().ensure_exists(id, "Neoplasms");
        assert_eq!(session.store().len(), 1);

        session.begin_epoch(vec!["Stomatitis".to_string()]);
        assert_eq!(session.epoch(), 2);
        assert!(session.store().is_empty());
        assert_eq!(session.current_terms(), &["Stomatitis"]);
    }

    #[test]
    fn test_begin_epoch_preserves_selection() {
        let mut session = Session::new();
        session.begin_epoch(vec!["Neoplasms".to_string()]);
        session.toggle_selection("Neoplasms");

        session.begin_epoch(vec!["Stomatitis".to_string()]);
        assert!(session.selection().is_selected("Neoplasms"));
        assert_eq!(session.selected_terms(), vec!["Neoplasms"]);
    }

    #[test]
    fn test_begin_epoch_dedupes_roots() {
        let mut session = Session::new();
        session.begin_epoch(vec![
            "Neoplasms".to_string(),
            "Stomatitis".to_string(),
            "Neoplasms".to_string(),
        ]);
        assert_eq!(session.current_terms(), &["Neoplasms", "Stomatitis"]);
    }

    #[test]
    fn test_node_identity_stable_within_epoch() {
        let mut session = Session::new();
        session.begin_epoch(vec!["Neoplasms".to_string()]);
        let path = vec!["Neoplasms".to_string()];
        let first = session.node_id("Mouth Neoplasms", &path);
        let second = session.node_id("Mouth Neoplasms", &path);
        assert_eq!(first, second);

        session.begin_epoch(vec!["Neoplasms".to_string()]);
        let fresh = session.node_id("Mouth Neoplasms", &path);
        assert!(fresh > first);
    }
}
