//! Implied-edge inference.
//!
//! Each closure rule is a [RuleDescriptor]: the chain of steps it walks, which edges it may read,
//! and the direction of the edge it asserts from the walk's source to the walk's end. A single
//! generic engine ([run_rules]) evaluates the [CATALOG] per hierarchy in catalog order.
//!
//! Ordering contract: a rule collects its output over every node before inserting any of it, so
//! it never observes its own edges. Only rules reading [RuleInput::ExplicitAndImplied] see edges
//! asserted by earlier rules of the same hierarchy in the same pass; `same_sibling_is_sibling`
//! is placed after the other sibling rules so it closes over their output.

use crate::{
    codec::EdgeKey,
    error::CrumbsError,
    graph::{ChainQuery, CrumbGraph, EdgeAttrs, EdgeRef, PathMode, Step},
    properties::{Direction, Hierarchy, HierarchyIdx, ImpliedKind, NoteId},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which edges a rule is allowed to compose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleInput {
    Explicit,
    ExplicitAndImplied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkShape {
    /// Exactly one edge per step.
    Exact,
    /// Repeat the (single) step transitively; paths shorter than `min_len` are skipped.
    Closure { min_len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleDescriptor {
    pub kind: ImpliedKind,
    pub steps: &'static [Step],
    pub shape: WalkShape,
    pub input: RuleInput,
    /// Direction of the asserted edge. `None` for rules consulted at query time only.
    pub emits: Option<Direction>,
}

const UP: Step = Step::outgoing(Direction::Up);
const SAME: Step = Step::outgoing(Direction::Same);
const UP_FROM: Step = Step::incoming(Direction::Up);

pub const CATALOG: &[RuleDescriptor] = &[
    RuleDescriptor {
        kind: ImpliedKind::SelfIsSibling,
        steps: &[],
        shape: WalkShape::Exact,
        input: RuleInput::Explicit,
        emits: None,
    },
    RuleDescriptor {
        kind: ImpliedKind::SameParentIsSibling,
        steps: &[UP, UP_FROM],
        shape: WalkShape::Exact,
        input: RuleInput::Explicit,
        emits: Some(Direction::Same),
    },
    RuleDescriptor {
        kind: ImpliedKind::CousinIsSibling,
        steps: &[UP, SAME, UP_FROM],
        shape: WalkShape::Exact,
        input: RuleInput::Explicit,
        emits: Some(Direction::Same),
    },
    RuleDescriptor {
        kind: ImpliedKind::SameSiblingIsSibling,
        steps: &[SAME],
        shape: WalkShape::Closure { min_len: 2 },
        input: RuleInput::ExplicitAndImplied,
        emits: Some(Direction::Same),
    },
    RuleDescriptor {
        kind: ImpliedKind::SiblingsParentIsParent,
        steps: &[SAME, UP],
        shape: WalkShape::Exact,
        input: RuleInput::Explicit,
        emits: Some(Direction::Up),
    },
    RuleDescriptor {
        kind: ImpliedKind::ParentsSiblingIsParent,
        steps: &[UP, SAME],
        shape: WalkShape::Exact,
        input: RuleInput::Explicit,
        emits: Some(Direction::Up),
    },
];

impl RuleDescriptor {
    pub fn get(kind: ImpliedKind) -> Option<&'static RuleDescriptor> {
        CATALOG.iter().find(|rule| rule.kind == kind)
    }

    pub fn query(&self) -> ChainQuery {
        match self.shape {
            WalkShape::Exact => ChainQuery::exact(self.steps.to_vec()),
            WalkShape::Closure { .. } => {
                ChainQuery::from_steps(self.steps.to_vec()).with_mode(PathMode::AllPrefixes)
            }
        }
    }

    /// Every direction the rule reads or writes. Each must be enabled in the hierarchy.
    pub fn directions(&self) -> BTreeSet<Direction> {
        self.steps
            .iter()
            .map(|step| step.dir)
            .chain(self.emits)
            .collect()
    }

    fn admits(&self, edge: &EdgeRef<'_>, hierarchy: HierarchyIdx) -> bool {
        edge.attrs.hierarchy == hierarchy
            && (edge.attrs.explicit || self.input == RuleInput::ExplicitAndImplied)
    }
}

/// A rule that could not be evaluated for one hierarchy. Other rules and hierarchies still run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyFailure {
    pub hierarchy: HierarchyIdx,
    pub rule: ImpliedKind,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceReport {
    pub added: BTreeMap<ImpliedKind, usize>,
    pub failures: Vec<HierarchyFailure>,
}

impl InferenceReport {
    pub fn total_added(&self) -> usize {
        self.added.values().sum()
    }

    pub fn failed_hierarchies(&self) -> BTreeSet<HierarchyIdx> {
        self.failures.iter().map(|f| f.hierarchy).collect()
    }
}

/// Discard every implied edge of `graph` and re-run every enabled rule of every hierarchy.
pub fn run_rules(graph: &mut CrumbGraph, hierarchies: &[Hierarchy]) -> InferenceReport {
    let cleared = graph.clear_implied();
    if cleared > 0 {
        tracing::debug!("run_rules: discarded {cleared} implied edges");
    }
    let mut report = InferenceReport::default();
    for (i, hierarchy) in hierarchies.iter().enumerate() {
        let Ok(idx) = HierarchyIdx::try_from(i) else {
            tracing::warn!("run_rules: hierarchy {i} is past the addressable range, stopping");
            break;
        };
        for rule in CATALOG.iter().filter(|rule| hierarchy.rule_enabled(rule.kind)) {
            match apply_rule(graph, idx, hierarchy, rule) {
                Ok(added) => {
                    if added > 0 {
                        tracing::debug!("[hierarchy {idx}] {} added {added} edges", rule.kind);
                    }
                    *report.added.entry(rule.kind).or_default() += added;
                }
                Err(e) => {
                    tracing::warn!("[hierarchy {idx}] {} failed: {e}", rule.kind);
                    report.failures.push(HierarchyFailure {
                        hierarchy: idx,
                        rule: rule.kind,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
    report
}

/// Ends of the chains `rule` composes from `source`. A closure only needs to know which nodes are
/// reachable, not every path reaching them.
fn rule_targets(
    graph: &CrumbGraph,
    source: &NoteId,
    rule: &RuleDescriptor,
    idx: HierarchyIdx,
) -> Vec<NoteId> {
    match rule.shape {
        WalkShape::Exact => graph
            .walk(source.as_str(), &rule.query(), |edge| rule.admits(edge, idx))
            .into_iter()
            .map(|path| path.end().clone())
            .collect(),
        WalkShape::Closure { min_len } => match rule.steps.first() {
            Some(step) => graph
                .reachable(source.as_str(), *step, |edge| rule.admits(edge, idx))
                .into_iter()
                .filter(|(_, depth)| *depth >= min_len)
                .map(|(target, _)| target)
                .collect(),
            None => Vec::new(),
        },
    }
}

/// Evaluate one rule over one hierarchy, returning the number of edges asserted.
pub fn apply_rule(
    graph: &mut CrumbGraph,
    idx: HierarchyIdx,
    hierarchy: &Hierarchy,
    rule: &RuleDescriptor,
) -> Result<usize, CrumbsError> {
    if let Some(dir) = rule
        .directions()
        .into_iter()
        .find(|dir| !hierarchy.is_enabled(*dir))
    {
        return Err(CrumbsError::Config(format!(
            "{} needs direction '{dir}', which has no field in hierarchy {idx}",
            rule.kind
        )));
    }
    let Some(dir) = rule.emits else {
        return Ok(0);
    };
    let field = hierarchy.primary_field(dir).map(|f| f.to_string());
    let sources = graph.nodes().map(|n| n.id.clone()).collect::<Vec<NoteId>>();
    let mut planned = BTreeSet::<EdgeKey>::new();
    let mut pending = Vec::<EdgeKey>::new();
    for source in sources.iter() {
        for target in rule_targets(graph, source, rule, idx) {
            if &target == source {
                tracing::warn!("{}: walk from '{source}' returned to its source", rule.kind);
                continue;
            }
            let key = EdgeKey::new(source, &target, idx, dir);
            // Explicit edges win the slot; earlier implied edges keep it.
            if graph.has_edge_at(&key) || !planned.insert(key.clone()) {
                continue;
            }
            pending.push(key);
        }
    }

    let added = pending.len();
    for key in pending {
        graph.add_edge(
            key.source,
            key.target,
            EdgeAttrs::implied(idx, dir, field.clone(), rule.kind),
        );
    }
    Ok(added)
}
