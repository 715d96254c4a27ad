//! CrumbGraph: the directed multigraph of notes.
//!
//! Nodes are keyed by [NoteId] through a side index into a petgraph [StableGraph], so node
//! removal never invalidates the indices held for other nodes, and a rename only touches the
//! node weight and the index entry.

use crate::{
    codec::EdgeKey,
    event::GraphEvent,
    properties::{Direction, Hierarchy, HierarchyIdx, ImpliedKind, NoteId},
};
use petgraph::{
    stable_graph::{EdgeIndex, NodeIndex, StableGraph},
    visit::EdgeRef as _,
    Direction as Orient,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NoteId,
    /// False when the note is referenced by an edge but not known to exist.
    pub resolved: bool,
}

/// Attributes carried by every edge of a [CrumbGraph].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeAttrs {
    pub hierarchy: HierarchyIdx,
    pub dir: Direction,
    pub field: Option<String>,
    pub explicit: bool,
    pub implied_kind: Option<ImpliedKind>,
}

impl EdgeAttrs {
    pub fn explicit(hierarchy: HierarchyIdx, dir: Direction, field: Option<String>) -> Self {
        EdgeAttrs {
            hierarchy,
            dir,
            field,
            explicit: true,
            implied_kind: None,
        }
    }

    pub fn implied(
        hierarchy: HierarchyIdx,
        dir: Direction,
        field: Option<String>,
        kind: ImpliedKind,
    ) -> Self {
        EdgeAttrs {
            hierarchy,
            dir,
            field,
            explicit: false,
            implied_kind: Some(kind),
        }
    }

    /// Explicit edges carry no rule tag; implied edges always do.
    pub fn is_consistent(&self) -> bool {
        self.explicit == self.implied_kind.is_none()
    }
}

/// Borrowed view of one edge, handed to traversal predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRef<'a> {
    pub source: &'a NoteId,
    pub target: &'a NoteId,
    pub attrs: &'a EdgeAttrs,
}

impl EdgeRef<'_> {
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.source, self.target, self.attrs.hierarchy, self.attrs.dir)
    }

    pub fn to_edge(&self) -> Edge {
        Edge {
            source: self.source.clone(),
            target: self.target.clone(),
            attrs: self.attrs.clone(),
        }
    }
}

/// Owned edge, as returned by queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub source: NoteId,
    pub target: NoteId,
    #[serde(flatten)]
    pub attrs: EdgeAttrs,
}

impl Edge {
    pub fn as_ref(&self) -> EdgeRef<'_> {
        EdgeRef {
            source: &self.source,
            target: &self.target,
            attrs: &self.attrs,
        }
    }

    pub fn key(&self) -> EdgeKey {
        self.as_ref().key()
    }
}

impl<'a> From<&'a Edge> for EdgeRef<'a> {
    fn from(edge: &'a Edge) -> Self {
        edge.as_ref()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrumbGraph {
    graph: StableGraph<Node, EdgeAttrs>,
    index: BTreeMap<NoteId, NodeIndex>,
}

impl CrumbGraph {
    pub fn new() -> Self {
        CrumbGraph::default()
    }

    pub fn as_graph(&self) -> &StableGraph<Node, EdgeAttrs> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|idx| &self.graph[*idx])
    }

    pub(crate) fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub(crate) fn node_id(&self, idx: NodeIndex) -> &NoteId {
        &self.graph[idx].id
    }

    /// Idempotent. An existing node is never downgraded from resolved to unresolved.
    pub fn add_node<I: Into<NoteId>>(&mut self, id: I, resolved: bool) -> NodeIndex {
        let id = id.into();
        if let Some(idx) = self.index.get(&id) {
            let node = &mut self.graph[*idx];
            node.resolved |= resolved;
            return *idx;
        }
        let idx = self.graph.add_node(Node {
            id: id.clone(),
            resolved,
        });
        self.index.insert(id, idx);
        idx
    }

    /// Re-key `old` as `new`. Incident edges follow the node. When `new` is already present the
    /// two nodes are merged; implied edges the merge turns into self-loops, or into a slot
    /// already taken, are dropped. A rename of an untracked node is ignored.
    pub fn rename_node(&mut self, old: &str, new: &str) {
        let Some(old_idx) = self.index.get(old).copied() else {
            tracing::debug!("rename_node: '{old}' is not tracked, ignoring rename to '{new}'");
            return;
        };
        if old == new {
            return;
        }
        let new_id = NoteId::from(new);

        let Some(new_idx) = self.index.get(new).copied() else {
            self.index.remove(old);
            self.graph[old_idx].id = new_id.clone();
            self.index.insert(new_id, old_idx);
            return;
        };

        tracing::debug!("rename_node: merging '{old}' into existing node '{new}'");
        // A self-loop shows up in both orientations; key by edge index to move it once.
        let incident = self
            .edge_indices_directed(old_idx, Orient::Outgoing)
            .into_iter()
            .chain(self.edge_indices_directed(old_idx, Orient::Incoming))
            .collect::<BTreeSet<_>>();
        let mut moved = Vec::with_capacity(incident.len());
        for edge_idx in incident {
            if let Some((source, target)) = self.graph.edge_endpoints(edge_idx) {
                let source = if source == old_idx { new_idx } else { source };
                let target = if target == old_idx { new_idx } else { target };
                moved.push((source, target, self.graph[edge_idx].clone()));
            }
        }
        let resolved = self.graph[old_idx].resolved;
        self.graph[new_idx].resolved |= resolved;
        self.graph.remove_node(old_idx);
        self.index.remove(old);

        let (explicit, implied): (Vec<_>, Vec<_>) =
            moved.into_iter().partition(|(_, _, attrs)| attrs.explicit);
        let mut moved_len = explicit.len();
        for (source, target, attrs) in explicit {
            self.graph.add_edge(source, target, attrs);
        }
        // Explicit edges take precedence over implied ones in the same slot.
        let shadowed = self
            .edge_indices_directed(new_idx, Orient::Outgoing)
            .into_iter()
            .chain(self.edge_indices_directed(new_idx, Orient::Incoming))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter(|idx| {
                self.edge_ref(*idx)
                    .map(|e| !e.attrs.explicit && self.has_explicit_edge_at(&e.key()))
                    .unwrap_or(false)
            })
            .collect::<Vec<_>>();
        for idx in shadowed.iter() {
            self.graph.remove_edge(*idx);
        }
        // Implied edges never loop and never share a slot.
        let mut dropped = shadowed.len();
        for (source, target, attrs) in implied {
            let key = EdgeKey::new(
                self.node_id(source),
                self.node_id(target),
                attrs.hierarchy,
                attrs.dir,
            );
            if source == target || self.has_edge_at(&key) {
                dropped += 1;
                continue;
            }
            self.graph.add_edge(source, target, attrs);
            moved_len += 1;
        }
        if dropped > 0 {
            tracing::debug!("rename_node: dropped {dropped} redundant implied edges");
        }
        tracing::debug!("rename_node: moved {moved_len} edges onto '{new}'");
    }

    /// Remove a node and every incident edge. Dropping an untracked node is a no-op.
    pub fn drop_node(&mut self, id: &str) -> Option<Node> {
        let idx = self.index.remove(id)?;
        self.graph.remove_node(idx)
    }

    /// Append an edge, creating unresolved endpoint nodes as needed. Parallel edges are kept.
    ///
    /// # Panics
    /// When `attrs` is an implied edge without a rule tag (or an explicit edge with one).
    pub fn add_edge<S: Into<NoteId>, T: Into<NoteId>>(
        &mut self,
        source: S,
        target: T,
        attrs: EdgeAttrs,
    ) -> EdgeIndex {
        assert!(
            attrs.is_consistent(),
            "edge attributes must tag implied edges (and only implied edges) with their rule: {attrs:?}"
        );
        let source_idx = self.add_node(source, false);
        let target_idx = self.add_node(target, false);
        self.graph.add_edge(source_idx, target_idx, attrs)
    }

    /// Visit every node, ordered by id.
    pub fn for_each_node<F: FnMut(&Node)>(&self, mut f: F) {
        for idx in self.index.values() {
            f(&self.graph[*idx]);
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.index.values().map(|idx| &self.graph[*idx])
    }

    pub(crate) fn edge_ref(&self, idx: EdgeIndex) -> Option<EdgeRef<'_>> {
        let (source, target) = self.graph.edge_endpoints(idx)?;
        Some(EdgeRef {
            source: &self.graph[source].id,
            target: &self.graph[target].id,
            attrs: &self.graph[idx],
        })
    }

    /// Edges touching `idx` in the given orientation, oldest first.
    pub(crate) fn edge_indices_directed(&self, idx: NodeIndex, orient: Orient) -> Vec<EdgeIndex> {
        let mut edges = self
            .graph
            .edges_directed(idx, orient)
            .map(|e| e.id())
            .collect::<Vec<_>>();
        edges.reverse();
        edges
    }

    fn collect_directed(&self, id: &str, orient: Orient) -> Vec<Edge> {
        let Some(idx) = self.index.get(id) else {
            return Vec::new();
        };
        self.edge_indices_directed(*idx, orient)
            .into_iter()
            .filter_map(|e| self.edge_ref(e))
            .map(|e| e.to_edge())
            .collect()
    }

    pub fn edges_out(&self, id: &str) -> Vec<Edge> {
        self.collect_directed(id, Orient::Outgoing)
    }

    pub fn edges_in(&self, id: &str) -> Vec<Edge> {
        self.collect_directed(id, Orient::Incoming)
    }

    /// Outgoing then incoming edges of a node. A self-loop is reported once.
    pub fn edges_of(&self, id: &str) -> Vec<Edge> {
        let mut edges = self.edges_out(id);
        edges.extend(
            self.edges_in(id)
                .into_iter()
                .filter(|e| e.source.as_str() != id),
        );
        edges
    }

    pub fn edges_between(&self, source: &str, target: &str) -> Vec<Edge> {
        self.edges_out(source)
            .into_iter()
            .filter(|e| e.target.as_str() == target)
            .collect()
    }

    /// Every edge of the graph.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_>> + '_ {
        self.graph
            .edge_indices()
            .filter_map(move |idx| self.edge_ref(idx))
    }

    pub fn has_edge_at(&self, key: &EdgeKey) -> bool {
        self.edges_at(key).next().is_some()
    }

    pub fn has_explicit_edge_at(&self, key: &EdgeKey) -> bool {
        self.edges_at(key).any(|e| e.attrs.explicit)
    }

    fn edges_at<'a>(&'a self, key: &'a EdgeKey) -> impl Iterator<Item = EdgeRef<'a>> + 'a {
        self.index
            .get(key.source.as_str())
            .into_iter()
            .flat_map(move |idx| self.graph.edges_directed(*idx, Orient::Outgoing))
            .filter_map(move |e| self.edge_ref(e.id()))
            .filter(move |e| {
                e.target == &key.target
                    && e.attrs.hierarchy == key.hierarchy
                    && e.attrs.dir == key.dir
            })
    }

    /// Remove every edge for which `f` returns false. Returns the number removed.
    pub fn retain_edges<F: FnMut(EdgeRef<'_>) -> bool>(&mut self, mut f: F) -> usize {
        let to_remove = self
            .graph
            .edge_indices()
            .filter(|idx| self.edge_ref(*idx).map(|e| !f(e)).unwrap_or(false))
            .collect::<Vec<_>>();
        let removed = to_remove.len();
        for idx in to_remove {
            self.graph.remove_edge(idx);
        }
        removed
    }

    /// Discard all implied edges, leaving only explicit state.
    pub fn clear_implied(&mut self) -> usize {
        self.retain_edges(|e| e.attrs.explicit)
    }

    /// Distinct targets of outgoing `dir` edges, optionally restricted to one hierarchy.
    pub fn neighbours(
        &self,
        id: &str,
        dir: Direction,
        hierarchy: Option<HierarchyIdx>,
    ) -> Vec<NoteId> {
        self.edges_out(id)
            .into_iter()
            .filter(|e| e.attrs.dir == dir)
            .filter(|e| hierarchy.map(|h| h == e.attrs.hierarchy).unwrap_or(true))
            .map(|e| e.target)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// The "same" peers of a note within one hierarchy. The note itself is included when the
    /// hierarchy enables `self_is_sibling`.
    pub fn siblings(&self, id: &str, idx: HierarchyIdx, hierarchy: &Hierarchy) -> Vec<NoteId> {
        let mut siblings = self
            .neighbours(id, Direction::Same, Some(idx))
            .into_iter()
            .collect::<BTreeSet<_>>();
        if hierarchy.rule_enabled(ImpliedKind::SelfIsSibling) && self.contains_node(id) {
            siblings.insert(NoteId::from(id));
        }
        siblings.into_iter().collect()
    }

    /// Apply a node lifecycle event in place. Implied edges are not recomputed.
    pub fn process_event(&mut self, event: &GraphEvent) {
        tracing::debug!("process_event: {event}");
        match event {
            GraphEvent::NodeCreated(id) => {
                self.add_node(id, true);
            }
            GraphEvent::NodeRenamed(old, new) => self.rename_node(old.as_str(), new.as_str()),
            GraphEvent::NodeDeleted(id) => {
                self.drop_node(id.as_str());
            }
        }
    }
}
