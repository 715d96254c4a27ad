//! Canonical text form of edges, for logs, dedup sets and test fixtures.
//!
//! The encoding depends only on an edge's attributes, never on where or when it was inserted:
//!
//! ```text
//! notes/a.md -up:0-> notes/p.md [parent] (explicit)
//! notes/a.md -up:0-> notes/s.md [parent] (implied:parents_sibling_is_parent)
//! ```

use crate::{
    graph::{CrumbGraph, EdgeRef},
    properties::{Direction, HierarchyIdx, NoteId},
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The slot an edge occupies: implied edges never share a slot with an explicit one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    pub source: NoteId,
    pub target: NoteId,
    pub hierarchy: HierarchyIdx,
    pub dir: Direction,
}

impl EdgeKey {
    pub fn new(
        source: &NoteId,
        target: &NoteId,
        hierarchy: HierarchyIdx,
        dir: Direction,
    ) -> Self {
        EdgeKey {
            source: source.clone(),
            target: target.clone(),
            hierarchy,
            dir,
        }
    }
}

impl Display for EdgeKey {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} -{}:{}-> {}",
            self.source, self.dir, self.hierarchy, self.target
        )
    }
}

pub fn stringify_edge<'a, E: Into<EdgeRef<'a>>>(edge: E) -> String {
    let edge = edge.into();
    let origin = match (edge.attrs.explicit, edge.attrs.implied_kind) {
        (true, _) => "explicit".to_string(),
        (false, Some(kind)) => format!("implied:{kind}"),
        (false, None) => "implied:?".to_string(),
    };
    format!(
        "{} [{}] ({origin})",
        edge.key(),
        edge.attrs.field.as_deref().unwrap_or("-"),
    )
}

/// Every edge of `graph`, encoded and sorted. Two graphs with the same edge multiset produce the
/// same dump.
pub fn stringify_edges(graph: &CrumbGraph) -> Vec<String> {
    let mut edges = graph.edges().map(stringify_edge).collect::<Vec<_>>();
    edges.sort();
    edges
}
