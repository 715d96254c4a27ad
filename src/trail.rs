//! Breadcrumb trails: the chains of "up" edges leading from a note to the top of its hierarchy.

use crate::{
    graph::{CrumbGraph, EdgeRef, PathMode},
    properties::{Direction, HierarchyIdx, NoteId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailSelection {
    /// Every distinct trail, shortest first.
    #[default]
    All,
    /// Only the single shortest trail.
    Shortest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailOptions {
    /// Notes at which a trail stops. Matched by id or by file name without extension.
    pub index_notes: Vec<NoteId>,
    pub selection: TrailSelection,
    /// Show every path to the top when none of them reaches an index note.
    pub fallback_all_paths: bool,
    /// Maximum number of "up" edges shown per trail.
    pub max_depth: Option<usize>,
    /// Hierarchies to follow. Empty means all of them.
    pub hierarchies: Vec<HierarchyIdx>,
}

impl Default for TrailOptions {
    fn default() -> Self {
        TrailOptions {
            index_notes: Vec::new(),
            selection: TrailSelection::All,
            fallback_all_paths: true,
            max_depth: None,
            hierarchies: Vec::new(),
        }
    }
}

impl TrailOptions {
    pub fn allows(&self, hierarchy: HierarchyIdx) -> bool {
        self.hierarchies.is_empty() || self.hierarchies.contains(&hierarchy)
    }

    fn is_index_note(&self, id: &NoteId) -> bool {
        self.index_notes
            .iter()
            .any(|index| index == id || index.basename() == id.basename())
    }
}

/// The trails of one note. Each trail lists note ids from the top of the hierarchy down to the
/// note itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trail {
    pub source: NoteId,
    pub paths: Vec<Vec<NoteId>>,
}

impl Trail {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// One line per trail, `root > ... > note`.
    pub fn render(&self, separator: &str) -> Vec<String> {
        self.paths
            .iter()
            .map(|path| {
                path.iter()
                    .map(|id| id.basename())
                    .collect::<Vec<_>>()
                    .join(separator)
            })
            .collect()
    }
}

pub fn build_trail(graph: &CrumbGraph, source: &str, opts: &TrailOptions) -> Trail {
    let walked = graph.chain_walk(
        source,
        &[Direction::Up],
        |e: &EdgeRef<'_>| opts.allows(e.attrs.hierarchy),
        PathMode::Maximal,
    );
    let mut sequences = walked
        .iter()
        .map(|path| path.nodes().cloned().collect::<Vec<_>>())
        .collect::<Vec<_>>();

    if !opts.index_notes.is_empty() {
        let cut = sequences
            .iter()
            .filter_map(|nodes| {
                nodes
                    .iter()
                    .skip(1)
                    .position(|id| opts.is_index_note(id))
                    .map(|pos| nodes[..pos + 2].to_vec())
            })
            .collect::<Vec<_>>();
        if !cut.is_empty() {
            sequences = cut;
        } else if !opts.fallback_all_paths {
            tracing::debug!("build_trail: no path from '{source}' reaches an index note");
            sequences.clear();
        }
    }

    if let Some(max_depth) = opts.max_depth {
        for nodes in sequences.iter_mut() {
            nodes.truncate(max_depth + 1);
        }
    }

    let mut paths = sequences
        .into_iter()
        .filter(|nodes| nodes.len() > 1)
        .map(|mut nodes| {
            nodes.reverse();
            nodes
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>();
    paths.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    if opts.selection == TrailSelection::Shortest {
        paths.truncate(1);
    }

    Trail {
        source: NoteId::from(source),
        paths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::helpers::{create_test_graph, explicit};
    use test_log::test;

    fn ids(path: &[&str]) -> Vec<NoteId> {
        path.iter().map(|id| NoteId::from(*id)).collect()
    }

    fn index_opts() -> TrailOptions {
        TrailOptions {
            index_notes: vec!["index.md".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_all_trails_root_first() {
        let graph = create_test_graph();
        let trail = build_trail(&graph, "note_3", &index_opts());
        assert_eq!(
            trail.paths,
            vec![
                ids(&["index", "area_a", "note_3"]),
                ids(&["index", "area_b", "note_3"]),
            ]
        );
        assert_eq!(
            trail.render(" > "),
            vec!["index > area_a > note_3", "index > area_b > note_3"]
        );
    }

    #[test]
    fn test_shortest_selection() {
        let mut graph = create_test_graph();
        explicit(&mut graph, "note_3", Direction::Up, "index");
        let opts = TrailOptions {
            selection: TrailSelection::Shortest,
            ..index_opts()
        };
        let trail = build_trail(&graph, "note_3", &opts);
        assert_eq!(trail.paths, vec![ids(&["index", "note_3"])]);
    }

    #[test]
    fn test_cut_at_first_index_note() {
        let graph = create_test_graph();
        let opts = TrailOptions {
            index_notes: vec!["area_b".into()],
            ..Default::default()
        };
        let trail = build_trail(&graph, "note_3", &opts);
        assert_eq!(trail.paths, vec![ids(&["area_b", "note_3"])]);
    }

    #[test]
    fn test_fallback_when_no_index_note_is_reached() {
        let graph = create_test_graph();
        let mut opts = TrailOptions {
            index_notes: vec!["elsewhere".into()],
            ..Default::default()
        };
        assert_eq!(build_trail(&graph, "note_1", &opts).paths.len(), 1);

        opts.fallback_all_paths = false;
        assert!(build_trail(&graph, "note_1", &opts).is_empty());
    }

    #[test]
    fn test_max_depth() {
        let graph = create_test_graph();
        let opts = TrailOptions {
            max_depth: Some(1),
            ..index_opts()
        };
        let trail = build_trail(&graph, "note_3", &opts);
        assert_eq!(
            trail.paths,
            vec![ids(&["area_a", "note_3"]), ids(&["area_b", "note_3"])]
        );
    }

    #[test]
    fn test_hierarchy_filter_and_unknown_source() {
        let graph = create_test_graph();
        let opts = TrailOptions {
            hierarchies: vec![HierarchyIdx::new(1)],
            ..index_opts()
        };
        assert!(build_trail(&graph, "note_3", &opts).is_empty());
        assert!(build_trail(&graph, "missing", &index_opts()).is_empty());
        // The top of the hierarchy has no trail of its own.
        assert!(build_trail(&graph, "index", &index_opts()).is_empty());
    }

    #[test]
    fn test_cycle_terminates() {
        let mut graph = create_test_graph();
        explicit(&mut graph, "index", Direction::Up, "note_1");
        let trail = build_trail(&graph, "note_1", &TrailOptions::default());
        assert_eq!(trail.paths, vec![ids(&["index", "area_a", "note_1"])]);
    }
}
