//! Stable node identities for tree positions.
//!
//! Every rendered position in the term forest is identified by the tuple of
//! (term, ancestor path, session epoch). The registry memoizes the integer
//! identity minted for each tuple so that repeated renders of an unchanged
//! tree resolve to the same identities, which is what keeps widget state
//! attached to the right nodes across full re-renders.

use std::collections::HashMap;

/// Integer identity of one tree position within a session.
pub type NodeId = u64;

/// Generation counter bumped on every fresh top-level term search.
pub type Epoch = u64;

/// Memoization key for one tree position.
///
/// Two nodes with the same term under different ancestor chains are distinct
/// entities; the epoch keeps keys from a previous search from ever matching
/// keys of the current one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NodeKey {
    term: String,
    path: Vec<String>,
    epoch: Epoch,
}

/// Registry assigning monotonically increasing identities to node keys.
///
/// Identities are minted in first-seen order. The counter is never reset:
/// clearing the registry on a new epoch makes old keys unreachable, and any
/// identity minted afterwards is strictly larger than every identity of the
/// previous epoch, so stale identities can never alias fresh ones.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    ids: HashMap<NodeKey, NodeId>,
    next_id: NodeId,
}

impl IdentityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a (term, path, epoch) tuple to its identity, minting a new
    /// one on first sight.
    ///
    /// Calling again with the same tuple in the same epoch returns the
    /// identity minted earlier, with no side effect.
    pub fn get_or_create(&mut self, term: &str, path: &[String], epoch: Epoch) -> NodeId {
        let key = NodeKey {
            term: term.to_string(),
            path: path.to_vec(),
            epoch,
        };
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(key, id);
        id
    }

    /// Drop all keys of the current epoch.
    ///
    /// The identity counter is deliberately left alone; see the type docs.
    pub fn clear_epoch(&mut self) {
        self.ids.clear();
    }

    /// Number of keys currently registered.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no keys are registered.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_same_key_same_identity() {
        let mut registry = IdentityRegistry::new();
        let p = path(&["Neoplasms"]);
        let first = registry.get_or_create("Mouth Neoplasms", &p, 0);
        let second = registry.get_or_create("Mouth Neoplasms", &p, 0);
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_identities_minted_in_first_seen_order() {
        let mut registry = IdentityRegistry::new();
        let a = registry.get_or_create("A", &[], 0);
        let b = registry.get_or_create("B", &[], 0);
        let c = registry.get_or_create("C", &path(&["A"]), 0);
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(c, 2);
    }

    #[test]
    fn test_same_term_different_path_distinct() {
        let mut registry = IdentityRegistry::new();
        let under_a = registry.get_or_create("X", &path(&["A"]), 0);
        let under_b = registry.get_or_create("X", &path(&["B"]), 0);
        assert_ne!(under_a, under_b);
    }

    #[test]
    fn test_new_epoch_identities_strictly_larger() {
        let mut registry = IdentityRegistry::new();
        let p = path(&["Neoplasms"]);
        let old = registry.get_or_create("Mouth Neoplasms", &p, 0);
        let old_max = registry.get_or_create("Gingival Neoplasms", &p, 0);

        registry.clear_epoch();
        let fresh = registry.get_or_create("Mouth Neoplasms", &p, 1);

        assert_ne!(fresh, old);
        assert!(fresh > old_max);
    }

    #[test]
    fn test_epochs_never_collide_even_without_clear() {
        let mut registry = IdentityRegistry::new();
        let p = path(&["Neoplasms"]);
        let epoch0 = registry.get_or_create("Mouth Neoplasms", &p, 0);
        let epoch1 = registry.get_or_create("Mouth Neoplasms", &p, 1);
        assert_ne!(epoch0, epoch1);
    }
}
