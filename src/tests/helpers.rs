//! Shared test utilities for graph and rule-engine testing

use crate::{
    codec::stringify_edges,
    config::Settings,
    graph::{CrumbGraph, EdgeAttrs},
    properties::{Direction, Hierarchy, HierarchyIdx},
    rebuild::ExplicitEdge,
};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// A hierarchy with every direction configured and no rules enabled:
/// up = parent, same = sibling, down = child, next = next, prev = prev.
pub fn family_hierarchy() -> Hierarchy {
    Hierarchy::default()
        .with_fields(Direction::Up, &["parent"])
        .with_fields(Direction::Same, &["sibling"])
        .with_fields(Direction::Down, &["child"])
        .with_fields(Direction::Next, &["next"])
        .with_fields(Direction::Prev, &["prev"])
}

/// Add an explicit edge in hierarchy 0, labelled with the family hierarchy's field for `dir`.
pub fn explicit(graph: &mut CrumbGraph, source: &str, dir: Direction, target: &str) {
    let field = family_hierarchy().primary_field(dir).map(|f| f.to_string());
    graph.add_edge(
        source,
        target,
        EdgeAttrs::explicit(HierarchyIdx::new(0), dir, field),
    );
}

/// `n0 -up-> n1 -up-> ... -up-> n{len - 1}` in hierarchy 0.
pub fn long_up_chain(len: usize) -> CrumbGraph {
    let mut graph = CrumbGraph::new();
    for i in 1..len {
        explicit(&mut graph, &format!("n{}", i - 1), Direction::Up, &format!("n{i}"));
    }
    graph
}

/// Explicit edge tuple in hierarchy 0 as a content parser would supply it.
pub fn explicit_tuple(source: &str, dir: Direction, target: &str) -> ExplicitEdge {
    ExplicitEdge {
        source: source.into(),
        target: target.into(),
        hierarchy: HierarchyIdx::new(0),
        dir,
        field: family_hierarchy().primary_field(dir).map(|f| f.to_string()),
    }
}

/// Encoded implied edges only, sorted.
pub fn implied_edges(graph: &CrumbGraph) -> Vec<String> {
    stringify_edges(graph)
        .into_iter()
        .filter(|e| !e.ends_with("(explicit)"))
        .collect()
}

/// Settings holding one family hierarchy with the given tweaks applied.
pub fn family_settings<F: FnOnce(Hierarchy) -> Hierarchy>(f: F) -> Settings {
    init_logging();
    Settings {
        hierarchies: vec![f(family_hierarchy())],
        ..Default::default()
    }
}

/// A small note tree used by trail and list-index tests:
///
/// ```text
/// index
/// ├── area_a
/// │   ├── note_1
/// │   └── note_2 ── next ──> note_3
/// └── area_b
///     └── note_3
/// ```
///
/// `note_3` also lists `area_a` as a second parent.
pub fn create_test_graph() -> CrumbGraph {
    init_logging();
    let mut graph = CrumbGraph::new();
    for id in ["index", "area_a", "area_b", "note_1", "note_2", "note_3"] {
        graph.add_node(id, true);
    }
    explicit(&mut graph, "area_a", Direction::Up, "index");
    explicit(&mut graph, "area_b", Direction::Up, "index");
    explicit(&mut graph, "note_1", Direction::Up, "area_a");
    explicit(&mut graph, "note_2", Direction::Up, "area_a");
    explicit(&mut graph, "note_3", Direction::Up, "area_b");
    explicit(&mut graph, "note_3", Direction::Up, "area_a");
    explicit(&mut graph, "note_2", Direction::Next, "note_3");
    graph
}
