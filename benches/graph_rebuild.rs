//! Performance benchmarks for graph rebuilds and queries
//!
//! A synthetic vault of topics and notes is generated in memory to measure:
//! - Full rebuild with inference
//! - Trail queries over the built graph
//! - List-index rendering from the root
//!
//! Run with: cargo bench

use criterion::{criterion_group, criterion_main, Criterion};
use crumbs_core::{
    config::Settings,
    list_index::build_list_index,
    properties::{ImpliedKind, NoteId},
    rebuild::{rebuild, ExplicitEdge},
    trail::build_trail,
};

const TOPICS: usize = 20;
const NOTES_PER_TOPIC: usize = 10;

// Default rules plus parents_sibling_is_parent
fn settings() -> Settings {
    let mut settings = Settings::default();
    for hierarchy in settings.hierarchies.iter_mut() {
        hierarchy.implied_relationships |= ImpliedKind::ParentsSiblingIsParent;
    }
    settings.trail.index_notes = vec!["index".into()];
    settings
}

// index <- topic_i <- note_i_j, with neighbouring topics marked as siblings
fn synthetic_vault(settings: &Settings) -> (Vec<NoteId>, Vec<ExplicitEdge>) {
    let mut notes = vec![NoteId::from("index")];
    let mut edges = Vec::new();
    for t in 0..TOPICS {
        let topic = format!("topic_{t}");
        notes.push(topic.as_str().into());
        edges.push(ExplicitEdge::from_field(settings, &topic, "up", "index").unwrap());
        if t > 0 {
            let previous = format!("topic_{}", t - 1);
            edges.push(ExplicitEdge::from_field(settings, &topic, "same", &previous).unwrap());
        }
        for n in 0..NOTES_PER_TOPIC {
            let note = format!("note_{t}_{n}");
            notes.push(note.as_str().into());
            edges.push(ExplicitEdge::from_field(settings, &note, "up", &topic).unwrap());
        }
    }
    (notes, edges)
}

// Benchmark: Full rebuild with inference
fn bench_rebuild(c: &mut Criterion) {
    let settings = settings();
    let (notes, edges) = synthetic_vault(&settings);

    c.bench_function("rebuild", |b| {
        b.iter(|| {
            let (graph, report) = rebuild(&settings, notes.clone(), edges.clone()).unwrap();
            (graph.edge_count(), report.implied_edges())
        });
    });
}

// Benchmark: Trail and list-index queries after a rebuild
fn bench_queries(c: &mut Criterion) {
    let settings = settings();
    let (notes, edges) = synthetic_vault(&settings);
    let (graph, _) = rebuild(&settings, notes.clone(), edges).unwrap();

    c.bench_function("trail_every_note", |b| {
        b.iter(|| {
            notes
                .iter()
                .map(|note| build_trail(&graph, note.as_str(), &settings.trail).paths.len())
                .sum::<usize>()
        });
    });

    c.bench_function("list_index_from_root", |b| {
        b.iter(|| build_list_index(&graph, "topic_0", &settings.list_index).len());
    });
}

// Benchmark group configuration
criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20);
    targets =
        bench_rebuild,
        bench_queries
}

criterion_main!(benches);
