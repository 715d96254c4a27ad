//! Full graph rebuild: seed nodes and explicit edges into a fresh [CrumbGraph], then run every
//! enabled implied rule. Nothing is published until the whole build has succeeded.

use crate::{
    config::Settings,
    error::CrumbsError,
    graph::{CrumbGraph, EdgeAttrs},
    implied::{run_rules, InferenceReport},
    properties::{Direction, HierarchyIdx, NoteId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An edge asserted by note content, as supplied by a content parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitEdge {
    pub source: NoteId,
    pub target: NoteId,
    pub hierarchy: HierarchyIdx,
    pub dir: Direction,
    #[serde(default)]
    pub field: Option<String>,
}

impl ExplicitEdge {
    /// Resolve a `source --field--> target` assertion against the configured hierarchies.
    pub fn from_field(
        settings: &Settings,
        source: &str,
        field: &str,
        target: &str,
    ) -> Result<ExplicitEdge, CrumbsError> {
        let (hierarchy, dir) = settings.resolve_field(field).ok_or_else(|| {
            CrumbsError::Config(format!("Field '{field}' is not declared by any hierarchy"))
        })?;
        Ok(ExplicitEdge {
            source: source.into(),
            target: target.into(),
            hierarchy,
            dir,
            field: Some(field.to_string()),
        })
    }
}

/// Field-addressed edge, the shape edges take in input files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEdge {
    pub source: NoteId,
    pub field: String,
    pub target: NoteId,
}

/// The complete explicit state of a vault: known notes plus asserted edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplicitInput {
    pub notes: Vec<NoteId>,
    pub edges: Vec<FieldEdge>,
}

impl ExplicitInput {
    pub fn from_toml_str(src: &str) -> Result<ExplicitInput, CrumbsError> {
        Ok(toml::from_str(src)?)
    }

    pub fn resolve(&self, settings: &Settings) -> Result<Vec<ExplicitEdge>, CrumbsError> {
        self.edges
            .iter()
            .map(|e| {
                ExplicitEdge::from_field(settings, e.source.as_str(), &e.field, e.target.as_str())
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildReport {
    pub nodes: usize,
    pub explicit_edges: usize,
    pub implied: InferenceReport,
}

impl RebuildReport {
    pub fn implied_edges(&self) -> usize {
        self.implied.total_added()
    }

    /// Hierarchies for which at least one rule could not be evaluated.
    pub fn partially_failed(&self) -> BTreeSet<HierarchyIdx> {
        self.implied.failed_hierarchies()
    }
}

fn check_edge(settings: &Settings, edge: &ExplicitEdge) -> Result<Option<String>, CrumbsError> {
    let hierarchy = settings.hierarchy(edge.hierarchy).ok_or_else(|| {
        CrumbsError::Config(format!(
            "Edge {} -> {} references unknown hierarchy {}",
            edge.source, edge.target, edge.hierarchy
        ))
    })?;
    let fields = hierarchy.fields(edge.dir);
    if fields.is_empty() {
        return Err(CrumbsError::Config(format!(
            "Edge {} -> {} uses direction '{}', which has no field in hierarchy {}",
            edge.source, edge.target, edge.dir, edge.hierarchy
        )));
    }
    match &edge.field {
        Some(field) if !fields.contains(field) => Err(CrumbsError::Config(format!(
            "Edge {} -> {} uses field '{field}', which is not a '{}' field of hierarchy {}",
            edge.source, edge.target, edge.dir, edge.hierarchy
        ))),
        Some(field) => Ok(Some(field.clone())),
        None => Ok(hierarchy.primary_field(edge.dir).map(|f| f.to_string())),
    }
}

/// Build a new graph from scratch. Configuration problems abort the build; rule failures are
/// confined to their hierarchy and listed in the report.
pub fn rebuild<N, E>(
    settings: &Settings,
    notes: N,
    edges: E,
) -> Result<(CrumbGraph, RebuildReport), CrumbsError>
where
    N: IntoIterator<Item = NoteId>,
    E: IntoIterator<Item = ExplicitEdge>,
{
    settings.validate()?;
    let mut graph = CrumbGraph::new();
    for note in notes {
        graph.add_node(note, true);
    }
    let mut explicit_edges = 0;
    for edge in edges {
        let field = check_edge(settings, &edge)?;
        graph.add_edge(
            edge.source,
            edge.target,
            EdgeAttrs::explicit(edge.hierarchy, edge.dir, field),
        );
        explicit_edges += 1;
    }

    let implied = run_rules(&mut graph, &settings.hierarchies);
    let report = RebuildReport {
        nodes: graph.node_count(),
        explicit_edges,
        implied,
    };
    tracing::info!(
        "Rebuilt graph: {} nodes, {} explicit edges, {} implied edges",
        report.nodes,
        report.explicit_edges,
        report.implied_edges()
    );
    if !report.partially_failed().is_empty() {
        tracing::warn!(
            "Implied rules failed for hierarchies {:?}",
            report.partially_failed()
        );
    }
    Ok((graph, report))
}
