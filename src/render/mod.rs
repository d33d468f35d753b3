//! Recursive traversal of the term forest.
//!
//! The driver walks the current epoch's root terms top-down and flattens
//! the forest into a list of [`RenderLine`]s. The whole forest is rebuilt
//! from scratch on every interaction; what makes that safe is that the
//! identity registry hands back the same [`NodeId`] for an unchanged
//! (term, path) key, so the lines of an unchanged tree carry the same ids
//! across renders and the shell's widget state stays attached to the right
//! nodes.
//!
//! Rendering also performs the lazy initialization steps of the traversal
//! contract: it mints identities, registers selection-set entries with a
//! default of unselected, and creates empty node records on first sight.

use std::collections::HashSet;

use crate::session::{NodeId, Session};

/// Path segment appended under a term for its alternate-name leaves.
///
/// Alternate names are never recursed into; the segment exists purely so
/// each alt-name leaf gets an identity distinct from a like-named term node.
pub const ALT_PATH_SEGMENT: &str = "alt";

/// One line of the flattened term forest.
///
/// `level` is the recursion depth, for indentation. Paths grow two segments
/// per hop (parent term, narrower-group name), so even path indices are
/// always ancestor terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderLine {
    /// A term node with its selection checkbox and expand/collapse toggle.
    Term {
        id: NodeId,
        term: String,
        level: usize,
        selected: bool,
        expanded: bool,
    },
    /// An alternate-name leaf, selectable but not expandable.
    AltName {
        id: NodeId,
        name: String,
        level: usize,
        selected: bool,
    },
    /// Heading for a narrower-concept group under an expanded node.
    NarrowerHeading { concept: String, level: usize },
    /// Marker emitted instead of re-rendering a node already shown in this
    /// pass (cycle cut).
    Cycle {
        id: NodeId,
        term: String,
        level: usize,
    },
}

/// Render the whole forest for the session's current root terms.
///
/// One visited set spans the pass; it is discarded when the pass ends.
pub fn render_forest(session: &mut Session) -> Vec<RenderLine> {
    let mut lines = Vec::new();
    let mut visited = HashSet::new();
    let roots = session.current_terms().to_vec();
    for root in roots {
        render_term(session, &root, &[], &mut visited, 0, &mut lines);
    }
    lines
}

/// Render one term node and, if expanded, its alternate names and narrower
/// children.
///
/// Every recursive call strictly increases `level` and strictly extends
/// `path`, and a term recurring in its own ancestor chain is cut, so the
/// traversal terminates even over a cyclic concept graph.
pub fn render_term(
    session: &mut Session,
    term: &str,
    path: &[String],
    visited: &mut HashSet<NodeId>,
    level: usize,
    out: &mut Vec<RenderLine>,
) {
    // A true cycle puts the term at an ancestor position of its own path.
    // Resolve that occurrence to the ancestor's identity so the marker
    // points at the node already shown; a term reached via a different,
    // non-overlapping path resolves to a fresh identity and renders again.
    if let Some(ancestor_id) = ancestor_identity(session, term, path) {
        if visited.contains(&ancestor_id) {
            out.push(RenderLine::Cycle {
                id: ancestor_id,
                term: term.to_string(),
                level,
            });
            return;
        }
    }

    let id = session.node_id(term, path);
    if !visited.insert(id) {
        out.push(RenderLine::Cycle {
            id,
            term: term.to_string(),
            level,
        });
        return;
    }

    session.selection_mut().ensure(term);
    session.store_mut().ensure_exists(id, term);

    let selected = session.selection().is_selected(term);
    let expanded = session.store().is_expanded(id);
    out.push(RenderLine::Term {
        id,
        term: term.to_string(),
        level,
        selected,
        expanded,
    });

    if !expanded {
        return;
    }

    let alt_names = session.store().alt_names(id).to_vec();
    if !alt_names.is_empty() {
        let mut alt_path = path.to_vec();
        alt_path.push(term.to_string());
        alt_path.push(ALT_PATH_SEGMENT.to_string());
        for name in alt_names {
            let alt_id = session.node_id(&name, &alt_path);
            session.selection_mut().ensure(&name);
            out.push(RenderLine::AltName {
                id: alt_id,
                selected: session.selection().is_selected(&name),
                name,
                level,
            });
        }
    }

    let narrower = session.store().narrower(id).to_vec();
    for (concept, children) in narrower {
        out.push(RenderLine::NarrowerHeading {
            concept: concept.clone(),
            level,
        });
        let mut child_path = path.to_vec();
        child_path.push(term.to_string());
        child_path.push(concept);
        for child in children {
            render_term(session, &child, &child_path, visited, level + 1, out);
        }
    }
}

/// If `term` occurs at an ancestor position of `path`, return the identity
/// of that ancestor node. Ancestor terms sit at even path indices.
fn ancestor_identity(session: &mut Session, term: &str, path: &[String]) -> Option<NodeId> {
    for i in (0..path.len()).step_by(2) {
        if path[i] == term {
            return Some(session.node_id(term, &path[..i]));
        }
    }
    None
}
