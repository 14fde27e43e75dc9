//! # Metadata Factory
//!
//! Every node and edge carries a fixed-shape metadata bundle. The factory
//! functions here always return a complete bundle:
//!
//! - [`build_node_metadata`] fills each missing field with its default and
//!   falls back to [`NodeMetadata::minimal`] if assembly fails
//! - [`build_edge_metadata`] is the edge analogue
//!
//! Analytics fields (topology, information metrics) are placeholders and stay
//! at zero. Statistical power stays `None` unless a caller supplies it.

use crate::confidence::{ConfidenceDistribution, wrap_confidence};
use crate::primitives::{
    BIAS_KEYWORDS, DEFAULT_EDGE_WEIGHT, DEFAULT_PLAN_TIMELINE, DEFAULT_PLAN_TOOLS,
    DEFAULT_PLAN_TYPE, NEUTRAL_SCORE,
};
use crate::{AsrGotError, LayerId, Warnings};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Keys owned by the metadata bundle itself.
///
/// Caller extras using one of these names never reach the extension map.
pub const RESERVED_METADATA_KEYS: [&str; 19] = [
    "id",
    "created_at",
    "updated_at",
    "provenance",
    "epistemic_status",
    "disciplinary_tags",
    "falsification_criteria",
    "bias_flags",
    "revision_history",
    "layer",
    "topology",
    "statistical_power",
    "information_metrics",
    "impact_score",
    "attribution",
    "confidence",
    "plan",
    "extensions",
    "content",
];

// =============================================================================
// METADATA RECORDS
// =============================================================================

/// Epistemic standing of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpistemicStatus {
    #[default]
    Unknown,
    Established,
    Hypothetical,
    Supported,
    Refuted,
    Speculative,
}

/// One entry of a revision history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub note: String,
}

impl Revision {
    /// The entry every element starts with.
    #[must_use]
    pub fn created(note: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            action: "created".to_string(),
            note: note.into(),
        }
    }
}

/// Topology placeholder record.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TopologyMetrics {
    pub degree_centrality: f64,
    pub betweenness_centrality: f64,
    pub closeness_centrality: f64,
    pub clustering_coefficient: f64,
}

/// Information-theoretic placeholder record.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InformationMetrics {
    pub entropy: f64,
    pub mutual_information: f64,
    pub kl_divergence: f64,
    pub information_gain: f64,
}

/// A research plan attached to a hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchPlan {
    #[serde(rename = "type")]
    pub plan_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_criteria: Option<String>,
    /// Caller-supplied plan fields beyond the known ones.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ResearchPlan {
    /// The plan synthesized for a hypothesis that arrived without one.
    #[must_use]
    pub fn default_literature_search() -> Self {
        Self {
            plan_type: DEFAULT_PLAN_TYPE.to_string(),
            description: "Systematic literature search for evidence for and against the hypothesis"
                .to_string(),
            tools: DEFAULT_PLAN_TOOLS.iter().map(|t| (*t).to_string()).collect(),
            timeline: Some(DEFAULT_PLAN_TIMELINE.to_string()),
            success_criteria: Some(
                "At least three independent peer-reviewed sources assessed".to_string(),
            ),
            extra: BTreeMap::new(),
        }
    }
}

/// The complete node metadata bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub provenance: String,
    pub epistemic_status: EpistemicStatus,
    pub disciplinary_tags: Vec<String>,
    pub falsification_criteria: Option<String>,
    pub bias_flags: Vec<String>,
    pub revision_history: Vec<Revision>,
    pub layer: Option<LayerId>,
    pub topology: TopologyMetrics,
    pub statistical_power: Option<f64>,
    pub information_metrics: InformationMetrics,
    pub impact_score: f64,
    pub attribution: Vec<String>,
    pub confidence: ConfidenceDistribution,
    pub plan: Option<ResearchPlan>,
    pub extensions: BTreeMap<String, Value>,
}

impl NodeMetadata {
    /// The guaranteed-valid bundle used when assembly fails.
    #[must_use]
    pub fn minimal() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            provenance: "system_fallback".to_string(),
            epistemic_status: EpistemicStatus::Unknown,
            disciplinary_tags: Vec::new(),
            falsification_criteria: None,
            bias_flags: Vec::new(),
            revision_history: vec![Revision::created("minimal metadata fallback")],
            layer: None,
            topology: TopologyMetrics::default(),
            statistical_power: None,
            information_metrics: InformationMetrics::default(),
            impact_score: NEUTRAL_SCORE,
            attribution: Vec::new(),
            confidence: ConfidenceDistribution::uniform(),
            plan: None,
            extensions: BTreeMap::new(),
        }
    }
}

/// Partial input to [`build_node_metadata`]. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeMetadataBase {
    pub id: Option<String>,
    pub provenance: Option<String>,
    pub epistemic_status: Option<EpistemicStatus>,
    pub disciplinary_tags: Option<Vec<String>>,
    pub falsification_criteria: Option<String>,
    pub bias_flags: Option<Vec<String>>,
    pub layer: Option<LayerId>,
    pub statistical_power: Option<f64>,
    pub impact_score: Option<f64>,
    pub attribution: Option<Vec<String>>,
    pub confidence: Option<Vec<f64>>,
    pub plan: Option<ResearchPlan>,
    pub extensions: BTreeMap<String, Value>,
}

impl NodeMetadataBase {
    /// Fold caller-supplied extra keys into the base.
    ///
    /// `provenance`, `statistical_power` and `bias_flags` are accepted when
    /// well-typed; a wrongly typed value becomes the field's empty default.
    /// Other reserved keys are dropped. Everything else lands in `extensions`.
    pub fn absorb_extras(&mut self, extras: Map<String, Value>, warnings: &mut Warnings) {
        for (key, value) in extras {
            match key.as_str() {
                "provenance" => match value.as_str().map(str::trim) {
                    Some(p) if !p.is_empty() => self.provenance = Some(p.to_string()),
                    _ => warnings.push("Ignoring 'provenance': expected a non-empty string"),
                },
                "statistical_power" => match value.as_f64() {
                    Some(p) if (0.0..=1.0).contains(&p) => self.statistical_power = Some(p),
                    _ => warnings.push(
                        "Ignoring 'statistical_power': expected a number between 0 and 1",
                    ),
                },
                "bias_flags" => {
                    let flags = match value {
                        Value::Array(items) => items
                            .into_iter()
                            .filter_map(|v| v.as_str().map(str::to_string))
                            .filter(|s| !s.trim().is_empty())
                            .collect(),
                        _ => {
                            warnings.push("'bias_flags' is not an array; using an empty list");
                            Vec::new()
                        }
                    };
                    self.bias_flags.get_or_insert_with(Vec::new).extend(flags);
                }
                reserved if RESERVED_METADATA_KEYS.contains(&reserved) => {
                    warnings.push(format!("Dropping reserved metadata key '{reserved}'"));
                }
                _ => {
                    self.extensions.insert(key, value);
                }
            }
        }
    }
}

/// Build a complete node metadata bundle.
///
/// Never fails: any assembly error is logged and replaced by the minimal bundle.
pub fn build_node_metadata(base: NodeMetadataBase, warnings: &mut Warnings) -> NodeMetadata {
    match try_build_node_metadata(base, warnings) {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::error!("Node metadata assembly failed: {}", e);
            warnings.push(format!("Node metadata replaced by minimal defaults: {e}"));
            NodeMetadata::minimal()
        }
    }
}

fn try_build_node_metadata(
    base: NodeMetadataBase,
    warnings: &mut Warnings,
) -> Result<NodeMetadata, AsrGotError> {
    let impact_score = match base.impact_score {
        None => NEUTRAL_SCORE,
        Some(s) if s.is_finite() && (0.0..=1.0).contains(&s) => s,
        Some(s) => {
            warnings.push(format!(
                "Impact score {s} is outside [0, 1]; using {NEUTRAL_SCORE}"
            ));
            NEUTRAL_SCORE
        }
    };

    if let Some(power) = base.statistical_power
        && !power.is_finite()
    {
        return Err(AsrGotError::Internal(format!(
            "statistical power {power} is not a finite number"
        )));
    }

    let confidence = match base.confidence {
        Some(means) => wrap_confidence(&means, warnings),
        None => ConfidenceDistribution::uniform(),
    };

    let extensions = base
        .extensions
        .into_iter()
        .filter(|(k, _)| !RESERVED_METADATA_KEYS.contains(&k.as_str()))
        .collect();

    let now = Utc::now();
    Ok(NodeMetadata {
        id: base.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        created_at: now,
        updated_at: now,
        provenance: base.provenance.unwrap_or_else(|| "unspecified".to_string()),
        epistemic_status: base.epistemic_status.unwrap_or_default(),
        disciplinary_tags: non_blank(base.disciplinary_tags.unwrap_or_default()),
        falsification_criteria: base.falsification_criteria,
        bias_flags: non_blank(base.bias_flags.unwrap_or_default()),
        revision_history: vec![Revision::created("node created")],
        layer: base.layer,
        topology: TopologyMetrics::default(),
        statistical_power: base.statistical_power,
        information_metrics: InformationMetrics::default(),
        impact_score,
        attribution: non_blank(base.attribution.unwrap_or_default()),
        confidence,
        plan: base.plan,
        extensions,
    })
}

/// Drop blank entries and duplicates, keeping first-seen order.
fn non_blank(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !item.trim().is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Bias flags raised by keywords in a piece of content.
///
/// Matching is whole-word and case-insensitive.
#[must_use]
pub fn detect_bias_flags(content: &str) -> Vec<String> {
    let lower = content.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    BIAS_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| words.contains(k)))
        .map(|(flag, _)| (*flag).to_string())
        .collect()
}

// =============================================================================
// EDGE METADATA
// =============================================================================

/// The complete edge metadata bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeMetadata {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub edge_type: String,
    pub confidence: ConfidenceDistribution,
    pub causal_metadata: Option<Value>,
    pub temporal_metadata: Option<Value>,
    pub weight: f64,
    pub bidirectional: bool,
    pub layer_connection: Option<String>,
    pub revision_history: Vec<Revision>,
}

/// Partial input to [`build_edge_metadata`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeMetadataBase {
    pub edge_type: String,
    pub confidence: Option<Vec<f64>>,
    pub causal_metadata: Option<Value>,
    pub temporal_metadata: Option<Value>,
    pub weight: Option<f64>,
    pub bidirectional: Option<bool>,
    pub layer_connection: Option<String>,
}

impl EdgeMetadataBase {
    /// Base with only the edge type set.
    #[must_use]
    pub fn typed(edge_type: impl Into<String>) -> Self {
        Self {
            edge_type: edge_type.into(),
            ..Self::default()
        }
    }
}

/// Build a complete edge metadata bundle.
pub fn build_edge_metadata(base: EdgeMetadataBase, warnings: &mut Warnings) -> EdgeMetadata {
    let edge_type = if base.edge_type.trim().is_empty() {
        warnings.push("Edge type is empty; using 'related'");
        "related".to_string()
    } else {
        base.edge_type
    };

    let weight = match base.weight {
        None => DEFAULT_EDGE_WEIGHT,
        Some(w) if w.is_finite() && w >= 0.0 => w,
        Some(w) => {
            warnings.push(format!(
                "Edge weight {w} is invalid; using {DEFAULT_EDGE_WEIGHT}"
            ));
            DEFAULT_EDGE_WEIGHT
        }
    };

    let confidence = match base.confidence {
        Some(means) => wrap_confidence(&means, warnings),
        None => ConfidenceDistribution::uniform(),
    };

    EdgeMetadata {
        id: Uuid::new_v4().to_string(),
        created_at: Utc::now(),
        edge_type,
        confidence,
        causal_metadata: base.causal_metadata,
        temporal_metadata: base.temporal_metadata,
        weight,
        bidirectional: base.bidirectional.unwrap_or(false),
        layer_connection: base.layer_connection,
        revision_history: vec![Revision::created("edge created")],
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_base_gets_defaults() {
        let mut warnings = Warnings::new();
        let m = build_node_metadata(NodeMetadataBase::default(), &mut warnings);
        assert!(warnings.is_empty());
        assert_eq!(m.confidence.means, [0.5; 4]);
        assert_eq!(m.impact_score, 0.5);
        assert_eq!(m.epistemic_status, EpistemicStatus::Unknown);
        assert_eq!(m.topology, TopologyMetrics::default());
        assert_eq!(m.information_metrics, InformationMetrics::default());
        assert!(m.statistical_power.is_none());
        assert_eq!(m.revision_history.len(), 1);
        assert_eq!(m.revision_history[0].action, "created");
        assert!(Uuid::parse_str(&m.id).is_ok());
    }

    #[test]
    fn out_of_range_impact_falls_back() {
        let mut warnings = Warnings::new();
        let base = NodeMetadataBase {
            impact_score: Some(1.7),
            ..NodeMetadataBase::default()
        };
        let m = build_node_metadata(base, &mut warnings);
        assert_eq!(m.impact_score, 0.5);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn assembly_failure_yields_minimal_bundle() {
        let mut warnings = Warnings::new();
        let base = NodeMetadataBase {
            statistical_power: Some(f64::NAN),
            provenance: Some("test".into()),
            ..NodeMetadataBase::default()
        };
        let m = build_node_metadata(base, &mut warnings);
        assert_eq!(m.provenance, "system_fallback");
        assert!(m.statistical_power.is_none());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn extras_split_between_fields_and_extensions() {
        let mut warnings = Warnings::new();
        let mut base = NodeMetadataBase::default();
        let extras = json!({
            "statistical_power": 0.8,
            "bias_flags": "not-a-list",
            "layer": "theoretical",
            "source_doi": "10.1000/xyz"
        });
        let Value::Object(map) = extras else {
            unreachable!("literal is an object")
        };
        base.absorb_extras(map, &mut warnings);

        assert_eq!(base.statistical_power, Some(0.8));
        assert_eq!(base.bias_flags, Some(Vec::new()));
        assert!(base.layer.is_none());
        assert_eq!(base.extensions.get("source_doi"), Some(&json!("10.1000/xyz")));
        // bias_flags type + reserved layer
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn bias_keywords_match_whole_words() {
        assert_eq!(
            detect_bias_flags("This is clearly always true"),
            vec!["absolute_thinking", "confirmation_bias_risk"]
        );
        assert!(detect_bias_flags("Nevertheless the data may help").is_empty());
        assert_eq!(
            detect_bias_flags("Definitively PROVEN."),
            vec!["overconfidence_bias"]
        );
    }

    #[test]
    fn default_plan_shape() {
        let plan = ResearchPlan::default_literature_search();
        assert_eq!(plan.plan_type, "literature_search");
        assert_eq!(plan.tools, vec!["pubmed_search", "citation_analysis"]);
        assert_eq!(plan.timeline.as_deref(), Some("2-4 weeks"));
    }

    #[test]
    fn edge_defaults() {
        let mut warnings = Warnings::new();
        let e = build_edge_metadata(EdgeMetadataBase::typed("Decomposition"), &mut warnings);
        assert_eq!(e.edge_type, "Decomposition");
        assert_eq!(e.weight, 1.0);
        assert!(!e.bidirectional);
        assert_eq!(e.confidence.means, [0.5; 4]);
        assert!(warnings.is_empty());

        let bad = EdgeMetadataBase {
            weight: Some(f64::INFINITY),
            ..EdgeMetadataBase::typed("  ")
        };
        let e = build_edge_metadata(bad, &mut warnings);
        assert_eq!(e.edge_type, "related");
        assert_eq!(e.weight, 1.0);
        assert_eq!(warnings.len(), 2);
    }
}
