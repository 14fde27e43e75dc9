//! # Parameter Catalog
//!
//! The 28 framework parameters P1.0 to P1.27.
//!
//! The catalog is descriptive metadata: it is reported by `initialize` and
//! the read-only surfaces, and no parameter drives any computation.

use serde::Serialize;

/// Version of the catalog contents.
pub const CATALOG_VERSION: &str = "1.0";

/// A framework parameter.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Parameter {
    P1_0,
    P1_1,
    P1_2,
    P1_3,
    P1_4,
    P1_5,
    P1_6,
    P1_7,
    P1_8,
    P1_9,
    P1_10,
    P1_11,
    P1_12,
    P1_13,
    P1_14,
    P1_15,
    P1_16,
    P1_17,
    P1_18,
    P1_19,
    P1_20,
    P1_21,
    P1_22,
    P1_23,
    P1_24,
    P1_25,
    P1_26,
    P1_27,
}

/// Serializable view of one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
}

impl Parameter {
    /// Every parameter in code order.
    pub const ALL: [Parameter; 28] = [
        Parameter::P1_0,
        Parameter::P1_1,
        Parameter::P1_2,
        Parameter::P1_3,
        Parameter::P1_4,
        Parameter::P1_5,
        Parameter::P1_6,
        Parameter::P1_7,
        Parameter::P1_8,
        Parameter::P1_9,
        Parameter::P1_10,
        Parameter::P1_11,
        Parameter::P1_12,
        Parameter::P1_13,
        Parameter::P1_14,
        Parameter::P1_15,
        Parameter::P1_16,
        Parameter::P1_17,
        Parameter::P1_18,
        Parameter::P1_19,
        Parameter::P1_20,
        Parameter::P1_21,
        Parameter::P1_22,
        Parameter::P1_23,
        Parameter::P1_24,
        Parameter::P1_25,
        Parameter::P1_26,
        Parameter::P1_27,
    ];

    /// The catalog row: (code, name, category, description).
    fn row(&self) -> (&'static str, &'static str, &'static str, &'static str) {
        match self {
            Parameter::P1_0 => (
                "P1.0",
                "Mandatory staged execution",
                "framework",
                "Reasoning proceeds through the fixed stage sequence, one stage at a time",
            ),
            Parameter::P1_1 => (
                "P1.1",
                "Root node initialization",
                "initialization",
                "A single root node captures the task with an initial confidence vector",
            ),
            Parameter::P1_2 => (
                "P1.2",
                "Default decomposition dimensions",
                "decomposition",
                "The task is split into scope, objectives, constraints, data needs, use cases, biases and gaps",
            ),
            Parameter::P1_3 => (
                "P1.3",
                "Hypothesis generation",
                "hypothesis",
                "Each dimension receives between three and five candidate hypotheses",
            ),
            Parameter::P1_4 => (
                "P1.4",
                "Evidence integration",
                "evidence",
                "Evidence nodes update the confidence of the hypotheses they bear on",
            ),
            Parameter::P1_5 => (
                "P1.5",
                "Multi-dimensional confidence",
                "confidence",
                "Confidence is a vector of empirical, theoretical, methodological and consensus scores",
            ),
            Parameter::P1_6 => (
                "P1.6",
                "Node typing",
                "structure",
                "Every node has a kind: root, dimension, hypothesis, evidence, bridge or gap",
            ),
            Parameter::P1_7 => (
                "P1.7",
                "Audit checkpoints",
                "reflection",
                "Stage transitions are recorded for later audit",
            ),
            Parameter::P1_8 => (
                "P1.8",
                "Falsifiability",
                "hypothesis",
                "Hypotheses should state the observation that would refute them",
            ),
            Parameter::P1_9 => (
                "P1.9",
                "Pruning and merging",
                "refinement",
                "Low-confidence or redundant nodes are pruned or merged",
            ),
            Parameter::P1_10 => (
                "P1.10",
                "Edge typing",
                "structure",
                "Every edge carries a relation type such as decomposition or hypothesis",
            ),
            Parameter::P1_11 => (
                "P1.11",
                "Bias detection",
                "quality",
                "Content is scanned for wording that signals cognitive bias",
            ),
            Parameter::P1_12 => (
                "P1.12",
                "Knowledge gap placeholders",
                "structure",
                "Unanswered questions are kept as explicit gap nodes",
            ),
            Parameter::P1_13 => (
                "P1.13",
                "Subgraph extraction",
                "extraction",
                "High-value subgraphs are extracted for composition",
            ),
            Parameter::P1_14 => (
                "P1.14",
                "Narrative composition",
                "composition",
                "Extracted subgraphs are composed into a narrative report",
            ),
            Parameter::P1_15 => (
                "P1.15",
                "Attribution tracking",
                "provenance",
                "Nodes record who or what contributed them",
            ),
            Parameter::P1_16 => (
                "P1.16",
                "Impact estimation",
                "quality",
                "Each node carries an impact score between 0 and 1",
            ),
            Parameter::P1_17 => (
                "P1.17",
                "Statistical power",
                "statistics",
                "Nodes may be annotated with the statistical power of their support",
            ),
            Parameter::P1_18 => (
                "P1.18",
                "Temporal edge metadata",
                "temporal",
                "Edges may carry temporal ordering information",
            ),
            Parameter::P1_19 => (
                "P1.19",
                "Hyperedges",
                "structure",
                "Relations among more than two nodes are represented as hyperedges",
            ),
            Parameter::P1_20 => (
                "P1.20",
                "Multi-layer network",
                "structure",
                "Nodes are assigned to base, methodological, empirical, theoretical or interdisciplinary layers",
            ),
            Parameter::P1_21 => (
                "P1.21",
                "Revision history",
                "provenance",
                "Every node and edge keeps a history of its revisions",
            ),
            Parameter::P1_22 => (
                "P1.22",
                "Topology metrics",
                "topology",
                "Structural metrics such as density and centrality describe the graph",
            ),
            Parameter::P1_23 => (
                "P1.23",
                "Information metrics",
                "information",
                "Nodes reserve fields for entropy and information gain",
            ),
            Parameter::P1_24 => (
                "P1.24",
                "Causal annotations",
                "causality",
                "Edges reserve fields for causal inference annotations",
            ),
            Parameter::P1_25 => (
                "P1.25",
                "Belief updating",
                "confidence",
                "Confidence is stored as a distribution ready for belief updates",
            ),
            Parameter::P1_26 => (
                "P1.26",
                "Research planning",
                "planning",
                "Hypotheses carry a plan describing how they would be tested",
            ),
            Parameter::P1_27 => (
                "P1.27",
                "Reflection",
                "reflection",
                "The final stage audits the whole graph for quality and bias",
            ),
        }
    }

    /// Parameter code, e.g. `P1.5`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.row().0
    }

    /// Short name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.row().1
    }

    /// Category tag.
    #[must_use]
    pub fn category(&self) -> &'static str {
        self.row().2
    }

    /// One-sentence description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        self.row().3
    }

    /// Lookup by code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Parameter> {
        Self::ALL.iter().copied().find(|p| p.code() == code)
    }

    /// Serializable view.
    #[must_use]
    pub fn info(&self) -> ParameterInfo {
        let (code, name, category, description) = self.row();
        ParameterInfo {
            code,
            name,
            description,
            category,
        }
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.name())
    }
}

/// `"<code>: <name>"` for every parameter, as reported by `initialize`.
#[must_use]
pub fn active_parameters() -> Vec<String> {
    Parameter::ALL.iter().map(ToString::to_string).collect()
}

/// The whole catalog.
#[must_use]
pub fn catalog() -> Vec<ParameterInfo> {
    Parameter::ALL.iter().map(Parameter::info).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn catalog_has_28_unique_codes_in_order() {
        let codes: Vec<&str> = Parameter::ALL.iter().map(Parameter::code).collect();
        assert_eq!(codes.len(), 28);
        assert_eq!(codes.iter().collect::<BTreeSet<_>>().len(), 28);
        for (i, code) in codes.iter().enumerate() {
            assert_eq!(*code, format!("P1.{i}"));
        }
    }

    #[test]
    fn lookup_and_display() {
        let p = Parameter::from_code("P1.20").expect("P1.20");
        assert_eq!(p, Parameter::P1_20);
        assert_eq!(p.to_string(), "P1.20: Multi-layer network");
        assert!(Parameter::from_code("P2.0").is_none());
        assert_eq!(active_parameters().len(), 28);
        assert_eq!(catalog()[5].category, "confidence");
    }
}
