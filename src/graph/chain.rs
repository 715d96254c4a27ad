//! Phased chain-walk over a [CrumbGraph].
//!
//! A walk is described by an ordered list of [Step]s ("phases"). The first edge must match phase
//! 0; every following edge either stays in the phase of the edge before it or advances to the
//! next phase, never back. Where neighbouring steps are equal an edge may fit several phases; it
//! is taken once, carrying all of them. Every qualifying branch is explored. The walk never
//! returns to its source node and never enters a node twice on one branch, which bounds it on
//! cyclic data.

use crate::properties::{Direction, NoteId};
use petgraph::{
    stable_graph::{EdgeIndex, NodeIndex},
    Direction as Orient,
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::{CrumbGraph, Edge, EdgeRef};

/// Whether a step follows an edge from its source to its target or backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Outgoing,
    Incoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    pub dir: Direction,
    pub orientation: Orientation,
}

impl Step {
    pub const fn outgoing(dir: Direction) -> Self {
        Step {
            dir,
            orientation: Orientation::Outgoing,
        }
    }

    pub const fn incoming(dir: Direction) -> Self {
        Step {
            dir,
            orientation: Orientation::Incoming,
        }
    }
}

/// Which of the reachable paths a walk reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PathMode {
    /// Only paths that cannot be extended any further, in any phase their last edge fits.
    #[default]
    Maximal,
    /// Every non-empty path reached, including the prefixes of longer ones.
    AllPrefixes,
    /// Every path whose last edge fits the final phase.
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainQuery {
    pub steps: Vec<Step>,
    pub mode: PathMode,
    pub max_depth: Option<usize>,
}

impl ChainQuery {
    /// Outgoing steps for each direction, reporting maximal paths.
    pub fn new(dirs: &[Direction]) -> Self {
        ChainQuery::from_steps(dirs.iter().map(|dir| Step::outgoing(*dir)).collect())
    }

    pub fn from_steps(steps: Vec<Step>) -> Self {
        ChainQuery {
            steps,
            mode: PathMode::Maximal,
            max_depth: None,
        }
    }

    /// Exactly one edge per step.
    pub fn exact(steps: Vec<Step>) -> Self {
        let depth = steps.len();
        ChainQuery {
            steps,
            mode: PathMode::Complete,
            max_depth: Some(depth),
        }
    }

    pub fn with_mode(mut self, mode: PathMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

/// An ordered, non-empty sequence of edges leading away from `source`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    pub source: NoteId,
    pub edges: Vec<Edge>,
    /// The node reached by each edge. Differs from the edge target on incoming steps.
    pub reached: Vec<NoteId>,
}

impl Path {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn last(&self) -> Option<&Edge> {
        self.edges.last()
    }

    /// The node the path ends on.
    pub fn end(&self) -> &NoteId {
        self.reached.last().unwrap_or(&self.source)
    }

    /// Source followed by every reached node.
    pub fn nodes(&self) -> impl Iterator<Item = &NoteId> + '_ {
        std::iter::once(&self.source).chain(self.reached.iter())
    }
}

/// Phases an edge can be taken in, ascending. Runs of equal steps give an edge several phases;
/// keeping them together lets the walk take each edge once.
type Phases = Vec<usize>;

struct Frame {
    candidates: Vec<(EdgeIndex, NodeIndex, Phases)>,
    next: usize,
}

struct Walk<'a, F> {
    graph: &'a CrumbGraph,
    query: &'a ChainQuery,
    pred: F,
    source: NodeIndex,
    // (edge, reached node) per step of the current branch
    branch: Vec<(EdgeIndex, NodeIndex)>,
    on_branch: BTreeSet<NodeIndex>,
    paths: Vec<Path>,
}

impl<F> Walk<'_, F>
where
    F: Fn(&EdgeRef<'_>) -> bool,
{
    /// Edges leaving `current` given the phases the last edge was taken in (`None` at the source).
    fn candidates(
        &self,
        current: NodeIndex,
        phases: Option<&[usize]>,
    ) -> Vec<(EdgeIndex, NodeIndex, Phases)> {
        if self
            .query
            .max_depth
            .map(|max| self.branch.len() >= max)
            .unwrap_or(false)
        {
            return Vec::new();
        }
        let allowed = match phases {
            None => BTreeSet::from([0]),
            Some(phases) => phases
                .iter()
                .flat_map(|phase| [*phase, *phase + 1])
                .filter(|phase| *phase < self.query.steps.len())
                .collect::<BTreeSet<_>>(),
        };
        let mut found: Vec<(EdgeIndex, NodeIndex, Phases)> = Vec::new();
        let mut position: BTreeMap<EdgeIndex, usize> = BTreeMap::new();
        for phase in allowed {
            let step = self.query.steps[phase];
            let orient = match step.orientation {
                Orientation::Outgoing => Orient::Outgoing,
                Orientation::Incoming => Orient::Incoming,
            };
            for edge_idx in self.graph.edge_indices_directed(current, orient) {
                let Some((edge_source, edge_target)) =
                    self.graph.as_graph().edge_endpoints(edge_idx)
                else {
                    continue;
                };
                let other = match step.orientation {
                    Orientation::Outgoing => edge_target,
                    Orientation::Incoming => edge_source,
                };
                if other == self.source || self.on_branch.contains(&other) {
                    continue;
                }
                let Some(edge) = self.graph.edge_ref(edge_idx) else {
                    continue;
                };
                if edge.attrs.dir != step.dir {
                    continue;
                }
                if let Some(at) = position.get(&edge_idx) {
                    found[*at].2.push(phase);
                } else if (self.pred)(&edge) {
                    position.insert(edge_idx, found.len());
                    found.push((edge_idx, other, vec![phase]));
                }
            }
        }
        found
    }

    fn emit(&mut self) {
        let mut edges = Vec::with_capacity(self.branch.len());
        let mut reached = Vec::with_capacity(self.branch.len());
        for (edge_idx, node_idx) in self.branch.iter() {
            if let Some(edge) = self.graph.edge_ref(*edge_idx) {
                edges.push(edge.to_edge());
                reached.push(self.graph.node_id(*node_idx).clone());
            }
        }
        self.paths.push(Path {
            source: self.graph.node_id(self.source).clone(),
            edges,
            reached,
        });
    }

    fn stops_at(&self, phases: &[usize], has_candidates: bool) -> bool {
        match self.query.mode {
            PathMode::AllPrefixes => true,
            PathMode::Complete => phases.contains(&(self.query.steps.len() - 1)),
            PathMode::Maximal => !has_candidates,
        }
    }

    /// Depth-first over every branch. The stack holds one frame per node on the branch, so chain
    /// length is bounded by memory rather than by the call stack.
    fn run(&mut self) {
        let mut stack = vec![Frame {
            candidates: self.candidates(self.source, None),
            next: 0,
        }];
        while let Some(frame) = stack.last_mut() {
            let Some((edge_idx, next, phases)) = frame.candidates.get(frame.next).cloned() else {
                stack.pop();
                if let Some((_, node)) = self.branch.pop() {
                    self.on_branch.remove(&node);
                }
                continue;
            };
            frame.next += 1;

            self.branch.push((edge_idx, next));
            self.on_branch.insert(next);
            let candidates = self.candidates(next, Some(&phases));
            if self.stops_at(&phases, !candidates.is_empty()) {
                self.emit();
            }
            stack.push(Frame {
                candidates,
                next: 0,
            });
        }
    }
}

impl CrumbGraph {
    /// Run a phased walk from `source`. Edges must satisfy `pred` to be followed. An unknown
    /// source or an empty step list yields no paths.
    pub fn walk<F>(&self, source: &str, query: &ChainQuery, pred: F) -> Vec<Path>
    where
        F: Fn(&EdgeRef<'_>) -> bool,
    {
        let Some(source_idx) = self.node_index(source) else {
            tracing::debug!("walk: unknown source '{source}'");
            return Vec::new();
        };
        if query.steps.is_empty() {
            return Vec::new();
        }
        let mut walk = Walk {
            graph: self,
            query,
            pred,
            source: source_idx,
            branch: Vec::new(),
            on_branch: BTreeSet::new(),
            paths: Vec::new(),
        };
        walk.run();
        walk.paths
    }

    /// Every node reachable from `source` by repeating `step`, with the length of the shortest
    /// chain reaching it. The source itself is never included. Unlike [CrumbGraph::walk] this
    /// does not enumerate paths, so it stays linear on densely connected data.
    pub fn reachable<F>(&self, source: &str, step: Step, pred: F) -> BTreeMap<NoteId, usize>
    where
        F: Fn(&EdgeRef<'_>) -> bool,
    {
        let mut reached = BTreeMap::new();
        let Some(source_idx) = self.node_index(source) else {
            return reached;
        };
        let orient = match step.orientation {
            Orientation::Outgoing => Orient::Outgoing,
            Orientation::Incoming => Orient::Incoming,
        };
        let mut seen = BTreeSet::from([source_idx]);
        let mut queue = VecDeque::from([(source_idx, 0usize)]);
        while let Some((current, depth)) = queue.pop_front() {
            for edge_idx in self.edge_indices_directed(current, orient) {
                let Some(edge) = self.edge_ref(edge_idx) else {
                    continue;
                };
                if edge.attrs.dir != step.dir || !pred(&edge) {
                    continue;
                }
                let next = match step.orientation {
                    Orientation::Outgoing => edge.target,
                    Orientation::Incoming => edge.source,
                };
                let Some(next_idx) = self.node_index(next.as_str()) else {
                    continue;
                };
                if seen.insert(next_idx) {
                    reached.insert(next.clone(), depth + 1);
                    queue.push_back((next_idx, depth + 1));
                }
            }
        }
        reached
    }

    /// Follow outgoing edges through the phases given by `dirs`.
    pub fn chain_walk<F>(
        &self,
        source: &str,
        dirs: &[Direction],
        pred: F,
        mode: PathMode,
    ) -> Vec<Path>
    where
        F: Fn(&EdgeRef<'_>) -> bool,
    {
        self.walk(source, &ChainQuery::new(dirs).with_mode(mode), pred)
    }
}
