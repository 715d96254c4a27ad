//! Freezing turns the implied edges of a note into field text the note can carry explicitly.

use crate::{error::CrumbsError, graph::CrumbGraph, properties::NoteId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FreezeDestination {
    /// YAML list per field, for the note's frontmatter block.
    #[default]
    Frontmatter,
    /// One `field:: [[target]]` line per edge.
    DataviewInline,
}

/// Targets of the note's outgoing implied edges, grouped by field.
pub fn implied_fields(graph: &CrumbGraph, note: &str) -> BTreeMap<String, BTreeSet<NoteId>> {
    let mut fields: BTreeMap<String, BTreeSet<NoteId>> = BTreeMap::new();
    for edge in graph.edges_out(note) {
        if edge.attrs.explicit {
            continue;
        }
        let field = edge
            .attrs
            .field
            .clone()
            .unwrap_or_else(|| edge.attrs.dir.as_str().to_string());
        fields.entry(field).or_default().insert(edge.target);
    }
    fields
}

fn wiki_link(id: &NoteId) -> String {
    format!("[[{}]]", id.basename())
}

/// Render the note's implied edges as text for `destination`. Empty when there is nothing to
/// freeze.
pub fn freeze_implied_edges(
    graph: &CrumbGraph,
    note: &str,
    destination: FreezeDestination,
) -> Result<String, CrumbsError> {
    let fields = implied_fields(graph, note);
    tracing::debug!(
        "freeze_implied_edges: {} field(s) to freeze on '{note}'",
        fields.len()
    );
    if fields.is_empty() {
        return Ok(String::new());
    }
    match destination {
        FreezeDestination::Frontmatter => {
            let links = fields
                .iter()
                .map(|(field, targets)| (field, targets.iter().map(wiki_link).collect::<Vec<_>>()))
                .collect::<BTreeMap<_, _>>();
            Ok(serde_yaml::to_string(&links)?)
        }
        FreezeDestination::DataviewInline => {
            let mut out = String::new();
            for (field, targets) in fields.iter() {
                for target in targets {
                    out.push_str(&format!("{field}:: {}\n", wiki_link(target)));
                }
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        implied::run_rules,
        properties::{Direction, ImpliedKind},
        tests::helpers::{create_test_graph, family_hierarchy},
    };
    use test_log::test;

    fn inferred_graph() -> CrumbGraph {
        let mut graph = create_test_graph();
        let hierarchy = family_hierarchy().with_rule(ImpliedKind::SameParentIsSibling);
        run_rules(&mut graph, &[hierarchy]);
        graph
    }

    #[test]
    fn test_frontmatter() {
        let graph = inferred_graph();
        let yaml = freeze_implied_edges(&graph, "note_1", FreezeDestination::Frontmatter).unwrap();
        let parsed: BTreeMap<String, Vec<String>> = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(
            parsed,
            BTreeMap::from([(
                "sibling".to_string(),
                vec!["[[note_2]]".to_string(), "[[note_3]]".to_string()]
            )])
        );
    }

    #[test]
    fn test_dataview_inline() {
        let graph = inferred_graph();
        assert_eq!(
            freeze_implied_edges(&graph, "note_3", FreezeDestination::DataviewInline).unwrap(),
            "sibling:: [[note_1]]\nsibling:: [[note_2]]\n"
        );
    }

    #[test]
    fn test_explicit_edges_are_not_frozen() {
        let graph = inferred_graph();
        assert_eq!(
            freeze_implied_edges(&graph, "index", FreezeDestination::Frontmatter).unwrap(),
            ""
        );
        assert!(graph
            .edges_out("note_1")
            .iter()
            .any(|e| e.attrs.explicit && e.attrs.dir == Direction::Up));
    }

    #[test]
    fn test_destination_names() {
        let dest: FreezeDestination = serde_json::from_str("\"dataview-inline\"").unwrap();
        assert_eq!(dest, FreezeDestination::DataviewInline);
    }
}
