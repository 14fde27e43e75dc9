//! # Graph Summary
//!
//! A read-only snapshot of counts, topology and quality metrics.

use crate::graph::ResearchGraph;
use crate::system::{StageCursor, TopologySummary};
use crate::{LayerId, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Impact below this is "low".
pub const IMPACT_MEDIUM_FLOOR: f64 = 0.4;

/// Impact at or above this is "high".
pub const IMPACT_HIGH_FLOOR: f64 = 0.7;

/// Complete summary of a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub graph_state: GraphState,
    pub layers: BTreeMap<LayerId, LayerCounts>,
    pub node_types: BTreeMap<NodeKind, usize>,
    pub topology: TopologySummary,
    pub quality_metrics: QualityMetrics,
}

/// Element counts and stage position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphState {
    pub vertices_count: usize,
    pub edges_count: usize,
    pub hyperedges_count: usize,
    pub layers_count: usize,
    pub current_stage: u8,
    pub stage_name: String,
    pub task_description: Option<String>,
}

/// Members of one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerCounts {
    pub nodes: usize,
    pub edges: usize,
}

/// Statistics over the per-node confidence averages.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfidenceStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Impact score histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImpactDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

/// Quality indicators.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub confidence: ConfidenceStats,
    pub impact_distribution: ImpactDistribution,
    pub bias_flags_total: usize,
    pub hypotheses_count: usize,
    /// Fraction of hypotheses with falsification criteria; 0 without hypotheses.
    pub falsifiability_ratio: f64,
}

impl GraphSummary {
    /// Summarize a graph at the cursor's stage.
    #[must_use]
    pub fn from_graph(
        graph: &ResearchGraph,
        cursor: &StageCursor,
        task_description: Option<&str>,
    ) -> Self {
        let stage = cursor.current();

        let layers = graph
            .layers()
            .map(|l| {
                (
                    l.id,
                    LayerCounts {
                        nodes: l.nodes.len(),
                        edges: l.edges.len(),
                    },
                )
            })
            .collect();

        let node_types = graph
            .node_kinds()
            .iter()
            .map(|kind| (*kind, graph.nodes_of_kind(*kind).count()))
            .collect();

        Self {
            graph_state: GraphState {
                vertices_count: graph.node_count(),
                edges_count: graph.edge_count(),
                hyperedges_count: graph.hyperedge_count(),
                layers_count: graph.layer_count(),
                current_stage: stage.index(),
                stage_name: stage.name().to_string(),
                task_description: task_description.map(str::to_string),
            },
            layers,
            node_types,
            topology: TopologySummary::from_graph(graph),
            quality_metrics: QualityMetrics::from_graph(graph),
        }
    }
}

impl QualityMetrics {
    /// Compute quality indicators from a graph.
    #[must_use]
    pub fn from_graph(graph: &ResearchGraph) -> Self {
        let averages: Vec<f64> = graph.nodes().map(|n| n.confidence().average()).collect();

        let mut impact_distribution = ImpactDistribution::default();
        let mut bias_flags_total = 0;
        for node in graph.nodes() {
            let impact = node.metadata.impact_score;
            if impact < IMPACT_MEDIUM_FLOOR {
                impact_distribution.low += 1;
            } else if impact < IMPACT_HIGH_FLOOR {
                impact_distribution.medium += 1;
            } else {
                impact_distribution.high += 1;
            }
            bias_flags_total += node.metadata.bias_flags.len();
        }

        let hypotheses_count = graph.nodes_of_kind(NodeKind::Hypothesis).count();
        let falsifiable = graph
            .nodes_of_kind(NodeKind::Hypothesis)
            .filter(|n| n.metadata.falsification_criteria.is_some())
            .count();
        let falsifiability_ratio = if hypotheses_count == 0 {
            0.0
        } else {
            falsifiable as f64 / hypotheses_count as f64
        };

        Self {
            confidence: confidence_stats(&averages),
            impact_distribution,
            bias_flags_total,
            hypotheses_count,
            falsifiability_ratio,
        }
    }
}

fn confidence_stats(values: &[f64]) -> ConfidenceStats {
    if values.is_empty() {
        return ConfidenceStats::default();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    ConfidenceStats {
        mean,
        std: variance.sqrt(),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}
