//! Versioned ownership of the live graph.
//!
//! Readers take a [Snapshot]: an `Arc` of the graph as it was last published. A rebuild builds
//! into a brand new [CrumbGraph] and swaps it in only once it succeeded, so a reader sees either
//! the previous complete graph or the next one. Incremental node events are applied
//! copy-on-write: readers already holding a snapshot keep their view.

use crate::{
    config::Settings,
    error::CrumbsError,
    event::GraphEvent,
    graph::CrumbGraph,
    properties::NoteId,
    rebuild::{rebuild, ExplicitEdge, RebuildReport},
};
use parking_lot::RwLock;
use std::{ops::Deref, sync::Arc};

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub version: u64,
    graph: Arc<CrumbGraph>,
}

impl Snapshot {
    pub fn graph(&self) -> &Arc<CrumbGraph> {
        &self.graph
    }
}

impl Deref for Snapshot {
    type Target = CrumbGraph;
    fn deref(&self) -> &CrumbGraph {
        &self.graph
    }
}

#[derive(Debug, Default)]
pub struct GraphHandle {
    published: RwLock<Snapshot>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot {
            version: 0,
            graph: Arc::new(CrumbGraph::default()),
        }
    }
}

impl GraphHandle {
    pub fn new(graph: CrumbGraph) -> Self {
        GraphHandle {
            published: RwLock::new(Snapshot {
                version: 0,
                graph: Arc::new(graph),
            }),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.published.read().clone()
    }

    pub fn version(&self) -> u64 {
        self.published.read().version
    }

    /// Replace the live graph wholesale. Returns the new version.
    pub fn publish(&self, graph: CrumbGraph) -> u64 {
        let mut published = self.published.write();
        published.version += 1;
        published.graph = Arc::new(graph);
        tracing::debug!("Published graph version {}", published.version);
        published.version
    }

    /// Rebuild from explicit state. On error the previously published graph stays live.
    pub fn rebuild<N, E>(
        &self,
        settings: &Settings,
        notes: N,
        edges: E,
    ) -> Result<RebuildReport, CrumbsError>
    where
        N: IntoIterator<Item = NoteId>,
        E: IntoIterator<Item = ExplicitEdge>,
    {
        let (graph, report) = rebuild(settings, notes, edges)?;
        self.publish(graph);
        Ok(report)
    }

    /// Apply one node lifecycle event to the live graph. Implied edges are left as they are until
    /// the next rebuild.
    pub fn apply(&self, event: &GraphEvent) -> u64 {
        let mut published = self.published.write();
        Arc::make_mut(&mut published.graph).process_event(event);
        published.version += 1;
        published.version
    }
}
