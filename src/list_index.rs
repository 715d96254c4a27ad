//! Nested markdown list of everything below a note.
//!
//! A note's children are the targets of its "down" edges together with the sources of "up"
//! edges pointing at it, so a tree only declared bottom-up renders the same as one declared
//! top-down.

use crate::{
    graph::CrumbGraph,
    properties::{Direction, HierarchyIdx, NoteId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Plain note names.
    None,
    /// `[[note]]`
    #[default]
    Wiki,
    /// `[note](path)`
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListIndexOptions {
    pub indent: String,
    pub link_kind: LinkKind,
    /// Hierarchies to follow. Empty means all of them.
    pub hierarchies: Vec<HierarchyIdx>,
    /// Number of list levels rendered below the root.
    pub max_depth: Option<usize>,
}

impl Default for ListIndexOptions {
    fn default() -> Self {
        ListIndexOptions {
            indent: "  ".to_string(),
            link_kind: LinkKind::Wiki,
            hierarchies: Vec::new(),
            max_depth: None,
        }
    }
}

impl ListIndexOptions {
    pub fn allows(&self, hierarchy: HierarchyIdx) -> bool {
        self.hierarchies.is_empty() || self.hierarchies.contains(&hierarchy)
    }
}

pub fn render_link(id: &NoteId, kind: LinkKind) -> String {
    match kind {
        LinkKind::None => id.basename().to_string(),
        LinkKind::Wiki => format!("[[{}]]", id.basename()),
        LinkKind::Markdown => format!("[{}]({})", id.basename(), id.as_str().replace(' ', "%20")),
    }
}

/// Children of `id`, sorted and without `id` itself.
pub fn children(graph: &CrumbGraph, id: &str, opts: &ListIndexOptions) -> Vec<NoteId> {
    let down = graph
        .edges_out(id)
        .into_iter()
        .filter(|e| e.attrs.dir == Direction::Down && opts.allows(e.attrs.hierarchy))
        .map(|e| e.target);
    let reversed_up = graph
        .edges_in(id)
        .into_iter()
        .filter(|e| e.attrs.dir == Direction::Up && opts.allows(e.attrs.hierarchy))
        .map(|e| e.source);
    down.chain(reversed_up)
        .filter(|child| child.as_str() != id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn write_item(out: &mut String, child: &NoteId, opts: &ListIndexOptions, depth: usize) {
    out.push_str(&opts.indent.repeat(depth));
    out.push_str("- ");
    out.push_str(&render_link(child, opts.link_kind));
    out.push('\n');
}

// Depth-first with an explicit stack: one (children, next child) frame per open level.
fn render_tree(graph: &CrumbGraph, root: NoteId, opts: &ListIndexOptions, out: &mut String) {
    let within = |depth: usize| opts.max_depth.map(|max| depth < max).unwrap_or(true);
    if !within(0) {
        return;
    }
    let mut stack = vec![(children(graph, root.as_str(), opts), 0usize)];
    let mut on_path = vec![root];
    let mut on_path_set = on_path.iter().cloned().collect::<BTreeSet<_>>();
    while let Some((kids, next)) = stack.last_mut() {
        let Some(child) = kids.get(*next).cloned() else {
            stack.pop();
            if let Some(done) = on_path.pop() {
                on_path_set.remove(&done);
            }
            continue;
        };
        *next += 1;
        if on_path_set.contains(&child) {
            continue;
        }
        let depth = stack.len() - 1;
        write_item(out, &child, opts, depth);
        if within(depth + 1) {
            stack.push((children(graph, child.as_str(), opts), 0));
            on_path_set.insert(child.clone());
            on_path.push(child);
        }
    }
}

/// Render the tree below `root` as a nested markdown list. The root itself is not listed. A note
/// reachable along several branches is listed under each of them; a note already on the current
/// branch is skipped.
pub fn build_list_index(graph: &CrumbGraph, root: &str, opts: &ListIndexOptions) -> String {
    let mut out = String::new();
    if !graph.contains_node(root) {
        tracing::debug!("build_list_index: unknown root '{root}'");
        return out;
    }
    render_tree(graph, NoteId::from(root), opts, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::helpers::{create_test_graph, explicit, long_up_chain};
    use test_log::test;

    #[test]
    fn test_nested_list_from_up_edges() {
        let graph = create_test_graph();
        let list = build_list_index(&graph, "index", &ListIndexOptions::default());
        assert_eq!(
            list,
            "- [[area_a]]\n  - [[note_1]]\n  - [[note_2]]\n  - [[note_3]]\n- [[area_b]]\n  - [[note_3]]\n"
        );
    }

    #[test]
    fn test_down_edges_and_link_kinds() {
        let mut graph = create_test_graph();
        explicit(&mut graph, "note_1", Direction::Down, "notes/deep dive.md");
        let opts = ListIndexOptions {
            indent: "\t".to_string(),
            link_kind: LinkKind::Markdown,
            ..Default::default()
        };
        assert_eq!(
            build_list_index(&graph, "note_1", &opts),
            "- [deep dive](notes/deep%20dive.md)\n"
        );
        let opts = ListIndexOptions {
            link_kind: LinkKind::None,
            max_depth: Some(1),
            ..Default::default()
        };
        assert_eq!(build_list_index(&graph, "index", &opts), "- area_a\n- area_b\n");
    }

    #[test]
    fn test_cycles_and_unknown_root() {
        let mut graph = create_test_graph();
        explicit(&mut graph, "area_a", Direction::Down, "index");
        let list = build_list_index(&graph, "area_a", &ListIndexOptions::default());
        assert_eq!(
            list,
            "- [[index]]\n  - [[area_b]]\n    - [[note_3]]\n- [[note_1]]\n- [[note_2]]\n- [[note_3]]\n"
        );
        assert_eq!(
            build_list_index(&graph, "missing", &ListIndexOptions::default()),
            ""
        );
    }

    #[test]
    fn test_deep_tree_renders_every_level() {
        let len = 50_000;
        let graph = long_up_chain(len);
        let opts = ListIndexOptions {
            indent: String::new(),
            link_kind: LinkKind::None,
            ..Default::default()
        };
        let list = build_list_index(&graph, &format!("n{}", len - 1), &opts);
        let lines = list.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), len - 1);
        assert_eq!(lines.first().copied(), Some(format!("- n{}", len - 2).as_str()));
        assert_eq!(lines.last().copied(), Some("- n0"));

        let shallow = ListIndexOptions {
            max_depth: Some(3),
            ..opts
        };
        assert_eq!(
            build_list_index(&graph, &format!("n{}", len - 1), &shallow).lines().count(),
            3
        );
    }
}
