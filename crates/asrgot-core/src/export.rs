//! # Export Module
//!
//! Serializes a snapshot of the graph in one of two formats:
//!
//! - `json`: the structured document ([`ExportDocument`]) with nodes, edges,
//!   layers, stage progress, the summary and degree-centrality insights
//! - `yaml`: a flattened, human-readable report ([`NarrativeReport`])
//!
//! Both carry the element counts, the stage trace and the quality metrics.
//! The format name is validated again here, whatever the caller checked.

use crate::graph::ResearchGraph;
use crate::parameters::CATALOG_VERSION;
use crate::summary::GraphSummary;
use crate::system::{CentralityEntry, StageCursor, StageStatus, StageTransition, top_by_degree};
use crate::validation::Validator;
use crate::{AsrGotError, Edge, Hyperedge, Layer, Node};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version of the export document layout.
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// How many nodes the centrality insight lists.
pub const TOP_CENTRALITY_LIMIT: usize = 5;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Yaml,
}

impl ExportFormat {
    /// Lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = AsrGotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Validator::export_format(s)
    }
}

// =============================================================================
// STRUCTURED DOCUMENT
// =============================================================================

/// The `json` export.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub format_version: &'static str,
    pub parameters_catalog_version: &'static str,
    pub exported_at: DateTime<Utc>,
    pub summary: GraphSummary,
    pub nodes: Vec<&'a Node>,
    pub edges: Vec<&'a Edge>,
    pub hyperedges: Vec<&'a Hyperedge>,
    pub layers: Vec<&'a Layer>,
    pub stage_progress: StageProgress<'a>,
    pub insights: Insights,
}

/// Stage table plus trace.
#[derive(Debug, Serialize)]
pub struct StageProgress<'a> {
    pub current_stage: u8,
    pub stage_name: &'static str,
    pub stages: Vec<StageStatus>,
    pub trace: &'a [StageTransition],
}

/// Derived observations.
#[derive(Debug, Serialize)]
pub struct Insights {
    pub top_nodes_by_degree: Vec<CentralityEntry>,
}

impl<'a> ExportDocument<'a> {
    /// Assemble the document.
    #[must_use]
    pub fn build(
        graph: &'a ResearchGraph,
        cursor: &'a StageCursor,
        task_description: Option<&str>,
    ) -> Self {
        let stage = cursor.current();
        Self {
            format_version: EXPORT_FORMAT_VERSION,
            parameters_catalog_version: CATALOG_VERSION,
            exported_at: Utc::now(),
            summary: GraphSummary::from_graph(graph, cursor, task_description),
            nodes: graph.nodes().collect(),
            edges: graph.edges().collect(),
            hyperedges: graph.hyperedges().collect(),
            layers: graph.layers().collect(),
            stage_progress: StageProgress {
                current_stage: stage.index(),
                stage_name: stage.name(),
                stages: cursor.progress(),
                trace: cursor.trace(),
            },
            insights: Insights {
                top_nodes_by_degree: top_by_degree(graph, TOP_CENTRALITY_LIMIT),
            },
        }
    }
}

// =============================================================================
// NARRATIVE REPORT
// =============================================================================

/// The `yaml` export: every section flattened to readable lines.
#[derive(Debug, Serialize)]
pub struct NarrativeReport {
    pub title: String,
    pub task: String,
    pub stage: String,
    pub counts: BTreeMap<&'static str, usize>,
    pub quality: Vec<String>,
    pub stage_trace: Vec<String>,
    pub layers: Vec<String>,
    pub nodes: Vec<String>,
    pub edges: Vec<String>,
    pub top_nodes_by_degree: Vec<String>,
}

impl NarrativeReport {
    /// Flatten a graph into a report.
    #[must_use]
    pub fn build(
        graph: &ResearchGraph,
        cursor: &StageCursor,
        task_description: Option<&str>,
    ) -> Self {
        let summary = GraphSummary::from_graph(graph, cursor, task_description);
        let state = &summary.graph_state;
        let q = &summary.quality_metrics;
        let t = &summary.topology;

        let counts = BTreeMap::from([
            ("vertices_count", state.vertices_count),
            ("edges_count", state.edges_count),
            ("hyperedges_count", state.hyperedges_count),
            ("layers_count", state.layers_count),
        ]);

        let quality = vec![
            format!(
                "Confidence: mean {:.3}, std {:.3}, min {:.3}, max {:.3}",
                q.confidence.mean, q.confidence.std, q.confidence.min, q.confidence.max
            ),
            format!(
                "Impact: {} low, {} medium, {} high",
                q.impact_distribution.low, q.impact_distribution.medium, q.impact_distribution.high
            ),
            format!("Bias flags raised: {}", q.bias_flags_total),
            format!(
                "Falsifiable hypotheses: {:.0}% of {}",
                q.falsifiability_ratio * 100.0,
                q.hypotheses_count
            ),
            format!(
                "Topology: density {:.3}, average degree {:.3}, clustering {:.3}, {} component(s), diameter estimate {}",
                t.density,
                t.average_degree,
                t.clustering_coefficient,
                t.connected_components,
                t.diameter_estimate
            ),
        ];

        let stage_trace = cursor
            .trace()
            .iter()
            .map(|s| {
                format!(
                    "{} -> {} via {} at {}",
                    s.from,
                    s.to,
                    s.operation.name(),
                    s.timestamp.to_rfc3339()
                )
            })
            .collect();

        let layers = graph
            .layers()
            .map(|l| format!("{}: {} node(s), {} edge(s)", l.id, l.nodes.len(), l.edges.len()))
            .collect();

        let nodes = graph
            .nodes()
            .map(|n| {
                format!(
                    "{} [{}] {}: {} (confidence {:.2}, impact {:.2})",
                    n.id,
                    n.kind,
                    n.label,
                    n.content,
                    n.confidence().average(),
                    n.metadata.impact_score
                )
            })
            .collect();

        let edges = graph
            .edges()
            .map(|e| format!("{} -> {} ({})", e.source, e.target, e.metadata.edge_type))
            .collect();

        let top_nodes_by_degree = top_by_degree(graph, TOP_CENTRALITY_LIMIT)
            .into_iter()
            .map(|c| format!("{} {}: degree {}, centrality {:.3}", c.node_id, c.label, c.degree, c.centrality))
            .collect();

        let stage = cursor.current();
        Self {
            title: "ASR-GoT Research Reasoning Report".to_string(),
            task: task_description.unwrap_or("(not initialized)").to_string(),
            stage: format!("{stage} ({}/8 stages completed)", stage.index()),
            counts,
            quality,
            stage_trace,
            layers,
            nodes,
            edges,
            top_nodes_by_degree,
        }
    }
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Serialize the graph in the named format.
pub fn export_graph(
    graph: &ResearchGraph,
    cursor: &StageCursor,
    task_description: Option<&str>,
    format: &str,
) -> Result<String, AsrGotError> {
    match Validator::export_format(format)? {
        ExportFormat::Json => {
            let document = ExportDocument::build(graph, cursor, task_description);
            serde_json::to_string_pretty(&document)
                .map_err(|e| AsrGotError::SerializationError(e.to_string()))
        }
        ExportFormat::Yaml => {
            let report = NarrativeReport::build(graph, cursor, task_description);
            serde_yaml::to_string(&report)
                .map_err(|e| AsrGotError::SerializationError(e.to_string()))
        }
    }
}

/// Elements that define a graph's identity, without export timestamps.
#[cfg(feature = "crypto-hash")]
#[derive(Serialize)]
struct CanonicalContent<'a> {
    stage: u8,
    nodes: Vec<&'a Node>,
    edges: Vec<&'a Edge>,
    layers: Vec<&'a Layer>,
}

/// BLAKE3 checksum of the graph's canonical JSON.
///
/// Stable for a given graph state: export timestamps are excluded.
///
/// # Requires
///
/// This function is only available with the `crypto-hash` feature enabled.
#[cfg(feature = "crypto-hash")]
pub fn graph_checksum(graph: &ResearchGraph, cursor: &StageCursor) -> Result<String, AsrGotError> {
    let content = CanonicalContent {
        stage: cursor.current().index(),
        nodes: graph.nodes().collect(),
        edges: graph.edges().collect(),
        layers: graph.layers().collect(),
    };
    let bytes =
        serde_json::to_vec(&content).map_err(|e| AsrGotError::SerializationError(e.to_string()))?;
    Ok(compute_blake3_hash(&bytes))
}

/// Compute a BLAKE3 hash of raw bytes as 64 hex characters.
#[cfg(feature = "crypto-hash")]
#[must_use]
pub fn compute_blake3_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing() {
        assert_eq!("Json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("YAML".parse::<ExportFormat>().unwrap(), ExportFormat::Yaml);
        assert!("csv".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn invalid_format_rejected_before_serialization() {
        let err = export_graph(&ResearchGraph::new(), &StageCursor::new(), None, "xml").unwrap_err();
        assert_eq!(err.validation().unwrap().field, "format");
    }

    #[test]
    fn empty_graph_json_export() {
        let text = export_graph(&ResearchGraph::new(), &StageCursor::new(), None, "json").unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["summary"]["graph_state"]["vertices_count"], 0);
        assert_eq!(value["layers"].as_array().unwrap().len(), 5);
        assert_eq!(value["stage_progress"]["stages"].as_array().unwrap().len(), 9);
        assert!(value["insights"]["top_nodes_by_degree"].as_array().unwrap().is_empty());
    }

    #[test]
    fn empty_graph_yaml_export() {
        let text = export_graph(&ResearchGraph::new(), &StageCursor::new(), None, "yaml").unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(value["counts"]["layers_count"].as_u64(), Some(5));
        assert_eq!(value["task"].as_str(), Some("(not initialized)"));
        assert_eq!(value["layers"].as_sequence().unwrap().len(), 5);
    }

    #[cfg(feature = "crypto-hash")]
    #[test]
    fn checksum_is_stable() {
        let graph = ResearchGraph::new();
        let cursor = StageCursor::new();
        let a = graph_checksum(&graph, &cursor).unwrap();
        let b = graph_checksum(&graph, &cursor).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }
}
