//! # Topology Metrics
//!
//! Structural metrics over the undirected view of the graph.
//!
//! | Metric | Definition |
//! |--------|------------|
//! | density | 2E / (N(N-1)), 0 below two nodes |
//! | average degree | 2E / N, 0 for an empty graph |
//! | clustering | mean local clustering over nodes with at least two neighbours |
//! | components | connected components found by depth-first search |
//! | diameter estimate | floor(log2 N) + 1, a placeholder rather than a measurement |

use crate::graph::ResearchGraph;
use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Graph-level topology metrics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TopologySummary {
    pub density: f64,
    pub average_degree: f64,
    pub clustering_coefficient: f64,
    pub connected_components: usize,
    pub diameter_estimate: usize,
}

impl TopologySummary {
    /// Compute metrics from a graph.
    #[must_use]
    pub fn from_graph(graph: &ResearchGraph) -> Self {
        let n = graph.node_count();
        let e = graph.edge_count();

        let density = if n > 1 {
            (2 * e) as f64 / (n * (n - 1)) as f64
        } else {
            0.0
        };
        let average_degree = if n > 0 { (2 * e) as f64 / n as f64 } else { 0.0 };

        Self {
            density,
            average_degree,
            clustering_coefficient: mean_clustering(graph),
            connected_components: connected_components(graph),
            diameter_estimate: diameter_estimate(n),
        }
    }
}

/// Degree centrality of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityEntry {
    pub node_id: NodeId,
    pub label: String,
    pub degree: usize,
    pub centrality: f64,
}

/// The `limit` nodes with the highest degree, ties broken by id.
#[must_use]
pub fn top_by_degree(graph: &ResearchGraph, limit: usize) -> Vec<CentralityEntry> {
    let n = graph.node_count();
    let mut entries: Vec<CentralityEntry> = graph
        .nodes()
        .map(|node| {
            let degree = graph.degree(&node.id);
            CentralityEntry {
                node_id: node.id.clone(),
                label: node.label.clone(),
                degree,
                centrality: if n > 1 {
                    degree as f64 / (n - 1) as f64
                } else {
                    0.0
                },
            }
        })
        .collect();

    entries.sort_by(|a, b| b.degree.cmp(&a.degree).then_with(|| a.node_id.cmp(&b.node_id)));
    entries.truncate(limit);
    entries
}

fn mean_clustering(graph: &ResearchGraph) -> f64 {
    let mut total = 0.0;
    let mut counted = 0usize;

    for node in graph.nodes() {
        let neighbors: Vec<&NodeId> = graph.neighbors(&node.id).into_iter().collect();
        let k = neighbors.len();
        if k < 2 {
            continue;
        }

        let mut links = 0usize;
        for (i, a) in neighbors.iter().enumerate() {
            for b in &neighbors[i + 1..] {
                if graph.adjacent(a, b) {
                    links += 1;
                }
            }
        }
        let possible = k * (k - 1) / 2;
        total += links as f64 / possible as f64;
        counted += 1;
    }

    if counted == 0 {
        0.0
    } else {
        total / counted as f64
    }
}

fn connected_components(graph: &ResearchGraph) -> usize {
    let mut visited: BTreeSet<&NodeId> = BTreeSet::new();
    let mut components = 0;

    for node in graph.nodes() {
        if visited.contains(&node.id) {
            continue;
        }
        components += 1;

        let mut stack = vec![&node.id];
        visited.insert(&node.id);
        while let Some(current) = stack.pop() {
            for next in graph.neighbors(current) {
                if visited.insert(next) {
                    stack.push(next);
                }
            }
        }
    }

    components
}

fn diameter_estimate(node_count: usize) -> usize {
    if node_count == 0 {
        0
    } else {
        node_count.ilog2() as usize + 1
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Warnings;
    use crate::metadata::{
        EdgeMetadataBase, NodeMetadataBase, build_edge_metadata, build_node_metadata,
    };
    use crate::{Edge, Node, NodeKind};

    fn graph_with(nodes: &[&str], edges: &[(&str, &str)]) -> ResearchGraph {
        let mut warnings = Warnings::new();
        let mut graph = ResearchGraph::new();
        for id in nodes {
            let metadata = build_node_metadata(NodeMetadataBase::default(), &mut warnings);
            graph
                .insert_node(Node::new(NodeId::from(*id), *id, NodeKind::Dimension, "", metadata))
                .expect("node");
        }
        for (s, t) in edges {
            let metadata = build_edge_metadata(EdgeMetadataBase::typed("test"), &mut warnings);
            graph
                .insert_edge(Edge::new(NodeId::from(*s), NodeId::from(*t), metadata))
                .expect("edge");
        }
        graph
    }

    #[test]
    fn empty_graph_metrics_are_zero() {
        let metrics = TopologySummary::from_graph(&ResearchGraph::new());
        assert_eq!(metrics, TopologySummary::default());
    }

    #[test]
    fn star_metrics() {
        // n0 -> a, b, c
        let graph = graph_with(&["n0", "a", "b", "c"], &[("n0", "a"), ("n0", "b"), ("n0", "c")]);
        let m = TopologySummary::from_graph(&graph);
        assert!((m.density - 0.5).abs() < 1e-12);
        assert!((m.average_degree - 1.5).abs() < 1e-12);
        assert_eq!(m.clustering_coefficient, 0.0);
        assert_eq!(m.connected_components, 1);
        assert_eq!(m.diameter_estimate, 3);
    }

    #[test]
    fn triangle_is_fully_clustered() {
        let graph = graph_with(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("a", "c")]);
        let m = TopologySummary::from_graph(&graph);
        assert!((m.clustering_coefficient - 1.0).abs() < 1e-12);
        assert_eq!(m.connected_components, 2);
    }

    #[test]
    fn top_by_degree_orders_and_truncates() {
        let graph = graph_with(
            &["n0", "a", "b", "c", "d", "e"],
            &[("n0", "a"), ("n0", "b"), ("a", "c"), ("n0", "d")],
        );
        let top = top_by_degree(&graph, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].node_id.as_str(), "n0");
        assert_eq!(top[0].degree, 3);
        assert_eq!(top[1].node_id.as_str(), "a");
        assert!((top[0].centrality - 0.6).abs() < 1e-12);
    }
}
