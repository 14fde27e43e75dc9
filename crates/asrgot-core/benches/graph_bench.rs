//! # Graph Benchmarks
//!
//! Summary, topology and export cost on generated graphs.
//!
//! Run with: `cargo bench -p asrgot-core`

use asrgot_core::metadata::{
    EdgeMetadataBase, NodeMetadataBase, build_edge_metadata, build_node_metadata,
};
use asrgot_core::{
    DecomposeRequest, Edge, GraphSummary, HypothesesRequest, InitializeRequest, Node, NodeId,
    NodeKind, ResearchGraph, ResearchSession, StageCursor, TopologySummary, Warnings, export_graph,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::json;
use std::hint::black_box;

/// Root plus `dimensions` dimensions, each with five hypotheses.
fn create_tree_graph(dimensions: usize) -> ResearchGraph {
    let mut graph = ResearchGraph::new();
    let mut warnings = Warnings::new();
    let node = |id: NodeId, kind: NodeKind, warnings: &mut Warnings| {
        let label = id.to_string();
        Node::new(
            id,
            label.clone(),
            kind,
            label,
            build_node_metadata(NodeMetadataBase::default(), warnings),
        )
    };
    let link = |source: &NodeId, target: &NodeId, warnings: &mut Warnings| {
        Edge::new(
            source.clone(),
            target.clone(),
            build_edge_metadata(EdgeMetadataBase::typed("bench"), warnings),
        )
    };

    let root = NodeId::root();
    graph
        .insert_node(node(root.clone(), NodeKind::Root, &mut warnings))
        .expect("root");
    for d in 1..=dimensions {
        let dim = NodeId::dimension(d);
        graph
            .insert_node(node(dim.clone(), NodeKind::Dimension, &mut warnings))
            .expect("dimension");
        graph.insert_edge(link(&root, &dim, &mut warnings)).expect("edge");
        for k in 1..=5 {
            let hyp = NodeId::hypothesis(d, k);
            graph
                .insert_node(node(hyp.clone(), NodeKind::Hypothesis, &mut warnings))
                .expect("hypothesis");
            graph.insert_edge(link(&dim, &hyp, &mut warnings)).expect("edge");
        }
    }
    graph
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_topology(c: &mut Criterion) {
    let mut group = c.benchmark_group("topology");

    for size in [10, 100, 1000].iter() {
        let graph = create_tree_graph(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(TopologySummary::from_graph(&graph)));
        });
    }

    group.finish();
}

fn bench_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("summary");
    let cursor = StageCursor::new();

    for size in [10, 100, 1000].iter() {
        let graph = create_tree_graph(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(GraphSummary::from_graph(&graph, &cursor, Some("bench task"))));
        });
    }

    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");
    let cursor = StageCursor::new();

    for size in [10, 100, 500].iter() {
        let graph = create_tree_graph(*size);
        group.bench_with_input(BenchmarkId::new("json", size), size, |b, _| {
            b.iter(|| black_box(export_graph(&graph, &cursor, None, "json")));
        });
        group.bench_with_input(BenchmarkId::new("yaml", size), size, |b, _| {
            b.iter(|| black_box(export_graph(&graph, &cursor, None, "yaml")));
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    c.bench_function("pipeline_s0_to_s3", |b| {
        b.iter(|| {
            let mut session = ResearchSession::new();
            session.initialize(&InitializeRequest::new(
                "Investigate the role of skin microbiome in disease",
            ));
            session.decompose(&DecomposeRequest::default());
            session.generate_hypotheses(&HypothesesRequest::new(
                "2.6",
                json!(["H1 text", "H2 text", "H3 text", "H4 text", "H5 text"]),
            ));
            black_box(session)
        });
    });
}

criterion_group!(
    benches,
    bench_topology,
    bench_summary,
    bench_export,
    bench_pipeline,
);

criterion_main!(benches);
