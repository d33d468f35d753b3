//! The user's cumulative bucket of chosen terms.
//!
//! Selection is keyed by term string, not node identity: the same term
//! shown in two tree positions shares one flag. Entries persist for the
//! whole session, across expansions and across epochs.

use std::collections::HashMap;

/// Mapping from term string to selected flag, remembering first-appearance
/// order for stable display.
#[derive(Debug, Default)]
pub struct SelectionSet {
    flags: HashMap<String, bool>,
    order: Vec<String>,
}

impl SelectionSet {
    /// Create an empty selection set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a term with a default flag of `false` if it has not been
    /// seen before. Idempotent.
    pub fn ensure(&mut self, term: &str) {
        if !self.flags.contains_key(term) {
            self.flags.insert(term.to_string(), false);
            self.order.push(term.to_string());
        }
    }

    /// Whether the term is currently selected. Unknown terms read as
    /// unselected.
    pub fn is_selected(&self, term: &str) -> bool {
        self.flags.get(term).copied().unwrap_or(false)
    }

    /// Set a term's flag, registering the term if needed.
    pub fn set(&mut self, term: &str, selected: bool) {
        self.ensure(term);
        self.flags.insert(term.to_string(), selected);
    }

    /// Flip a term's flag and return the new value.
    pub fn toggle(&mut self, term: &str) -> bool {
        let next = !self.is_selected(term);
        self.set(term, next);
        next
    }

    /// All selected terms, in first-appearance order.
    pub fn selected(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|term| self.is_selected(term))
            .cloned()
            .collect()
    }

    /// All known terms, selected or not, in first-appearance order.
    pub fn known(&self) -> &[String] {
        &self.order
    }

    /// Number of known terms.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no terms are known.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_defaults_to_unselected() {
        let mut set = SelectionSet::new();
        set.ensure("Mouth Neoplasms");
        assert!(!set.is_selected("Mouth Neoplasms"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_ensure_does_not_reset_existing_flag() {
        let mut set = SelectionSet::new();
        set.set("Mouth Neoplasms", true);
        set.ensure("Mouth Neoplasms");
        assert!(set.is_selected("Mouth Neoplasms"));
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut set = SelectionSet::new();
        assert!(set.toggle("Gingival Neoplasms"));
        assert!(!set.toggle("Gingival Neoplasms"));
    }

    #[test]
    fn test_selected_in_first_appearance_order() {
        let mut set = SelectionSet::new();
        set.ensure("B");
        set.ensure("A");
        set.ensure("C");
        set.set("C", true);
        set.set("B", true);
        assert_eq!(set.selected(), vec!["B", "C"]);
    }
}
