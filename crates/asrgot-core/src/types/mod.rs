//! # Core Type Definitions
//!
//! This module contains the core types of the research reasoning graph:
//! - Graph identifiers (`NodeId`, `EdgeId`) with the hierarchical id scheme
//! - Graph elements (`Node`, `Edge`, `Hyperedge`, `Layer`)
//! - Classification enums (`NodeKind`, `LayerId`)
//! - Error types (`AsrGotError`, `ValidationError`, `ErrorKind`)
//! - The `Warnings` collector shared by validation and metadata construction
//!
//! ## Ordering Guarantees
//!
//! Every identifier implements `Ord`, and all collections built from them use
//! `BTreeMap`/`BTreeSet`, so summaries and exports list elements in a stable order.

use crate::metadata::{EdgeMetadata, NodeMetadata};
use crate::system::Stage;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use thiserror::Error;

// =============================================================================
// GRAPH IDENTIFIERS
// =============================================================================

/// Identifier of a node in the reasoning graph.
///
/// The textual form encodes the node's place in the hierarchy:
/// - `n0` for the root (task) node
/// - `2.<k>` for the k-th dimension (1-based)
/// - `3.<d>.<k>` for the k-th hypothesis under dimension `d`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Textual id of the root node.
    pub const ROOT: &'static str = "n0";

    /// The singular root node id.
    #[must_use]
    pub fn root() -> Self {
        Self(Self::ROOT.to_string())
    }

    /// Id of the `index`-th dimension node (1-based).
    #[must_use]
    pub fn dimension(index: usize) -> Self {
        Self(format!("2.{index}"))
    }

    /// Id of the `index`-th hypothesis under dimension `dimension` (both 1-based).
    #[must_use]
    pub fn hypothesis(dimension: usize, index: usize) -> Self {
        Self(format!("3.{dimension}.{index}"))
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Is this the root id?
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }

    /// Parse the dimension index out of a `2.<k>` id.
    ///
    /// Returns `None` for any other shape, including `2.0`.
    #[must_use]
    pub fn dimension_index(&self) -> Option<usize> {
        parse_dimension_index(&self.0)
    }
}

/// Parse `2.<positive integer>` into its index.
pub(crate) fn parse_dimension_index(raw: &str) -> Option<usize> {
    let digits = raw.strip_prefix("2.")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match digits.parse::<usize>() {
        Ok(0) | Err(_) => None,
        Ok(index) => Some(index),
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a directed edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    /// Deterministic id for the edge `source -> target`.
    #[must_use]
    pub fn between(source: &NodeId, target: &NodeId) -> Self {
        Self(format!("e_{source}_{target}"))
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EdgeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// NODE KINDS & LAYERS
// =============================================================================

/// Kind of a reasoning node.
///
/// `Evidence`, `Bridge` and `PlaceholderGap` are reserved for the later
/// stages and never created by the current operation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    Dimension,
    Hypothesis,
    Evidence,
    Bridge,
    PlaceholderGap,
}

impl NodeKind {
    /// Snake-case name used in summaries and exports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Dimension => "dimension",
            NodeKind::Hypothesis => "hypothesis",
            NodeKind::Evidence => "evidence",
            NodeKind::Bridge => "bridge",
            NodeKind::PlaceholderGap => "placeholder_gap",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five fixed layers seeded into every graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerId {
    Base,
    Methodological,
    Empirical,
    Theoretical,
    Interdisciplinary,
}

impl LayerId {
    /// All layers in seeding order.
    pub const ALL: [LayerId; 5] = [
        LayerId::Base,
        LayerId::Methodological,
        LayerId::Empirical,
        LayerId::Theoretical,
        LayerId::Interdisciplinary,
    ];

    /// Snake-case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerId::Base => "base",
            LayerId::Methodological => "methodological",
            LayerId::Empirical => "empirical",
            LayerId::Theoretical => "theoretical",
            LayerId::Interdisciplinary => "interdisciplinary",
        }
    }

    /// Human-readable description of the layer's role.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            LayerId::Base => "Task framing and structural scaffolding",
            LayerId::Methodological => "Study design, constraints and bias control",
            LayerId::Empirical => "Data needs, observations and applied use cases",
            LayerId::Theoretical => "Objectives, mechanisms and open questions",
            LayerId::Interdisciplinary => "Links that cross discipline boundaries",
        }
    }

    /// Route a dimension to a layer by keywords in its name.
    ///
    /// Names without a recognised keyword stay in `Base`.
    #[must_use]
    pub fn for_dimension(name: &str) -> Self {
        let lower = name.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if has(&["interdisciplin", "cross-disciplin", "bridge"]) {
            LayerId::Interdisciplinary
        } else if has(&["method", "constraint", "bias"]) {
            LayerId::Methodological
        } else if has(&["data", "use case", "evidence"]) {
            LayerId::Empirical
        } else if has(&["objective", "gap", "theor", "mechanism"]) {
            LayerId::Theoretical
        } else {
            LayerId::Base
        }
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// GRAPH ELEMENTS
// =============================================================================

/// A reasoning node.
///
/// The confidence distribution lives inside the metadata bundle so that a
/// node can never exist without one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub kind: NodeKind,
    pub content: String,
    pub metadata: NodeMetadata,
}

impl Node {
    /// Create a new node.
    #[must_use]
    pub fn new(
        id: NodeId,
        label: impl Into<String>,
        kind: NodeKind,
        content: impl Into<String>,
        metadata: NodeMetadata,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            kind,
            content: content.into(),
            metadata,
        }
    }

    /// The wrapped confidence distribution.
    #[must_use]
    pub fn confidence(&self) -> &crate::confidence::ConfidenceDistribution {
        &self.metadata.confidence
    }

    /// Layer this node is assigned to, if any.
    #[must_use]
    pub fn layer(&self) -> Option<LayerId> {
        self.metadata.layer
    }
}

/// A directed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub metadata: EdgeMetadata,
}

impl Edge {
    /// Create an edge with the deterministic `e_<source>_<target>` id.
    #[must_use]
    pub fn new(source: NodeId, target: NodeId, metadata: EdgeMetadata) -> Self {
        Self {
            id: EdgeId::between(&source, &target),
            source,
            target,
            metadata,
        }
    }
}

/// A hyperedge joining an arbitrary node set.
///
/// Hyperedges are part of the store's shape but no current operation creates one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperedge {
    pub id: String,
    pub nodes: BTreeSet<NodeId>,
    pub metadata: EdgeMetadata,
}

/// A named partition of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub description: String,
    pub nodes: BTreeSet<NodeId>,
    pub edges: BTreeSet<EdgeId>,
}

impl Layer {
    /// Create an empty layer.
    #[must_use]
    pub fn new(id: LayerId) -> Self {
        Self {
            id,
            description: id.description().to_string(),
            nodes: BTreeSet::new(),
            edges: BTreeSet::new(),
        }
    }

    /// Check if the layer has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

// =============================================================================
// WARNINGS
// =============================================================================

/// Non-fatal diagnostics collected while an operation runs.
///
/// Every pushed message is also emitted as a `tracing` warning, so the
/// observability channel sees exactly what the caller gets back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Warnings(Vec<String>);

impl Warnings {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log a warning.
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(target: "asrgot_core", "{}", message);
        self.0.push(message);
    }

    /// Number of recorded warnings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Recorded messages in order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Consume the collector.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// Append messages already logged by another collector.
    pub fn merge(&mut self, other: Warnings) {
        self.0.extend(other.0);
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Detail of a rejected parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Name of the offending field (dotted path for nested fields).
    pub field: String,
    /// Rendering of what was received.
    pub received: String,
    /// Description of the accepted shape.
    pub expected: String,
    /// Up to three example valid values.
    pub examples: Vec<String>,
}

impl ValidationError {
    /// Maximum number of examples carried by an error.
    pub const MAX_EXAMPLES: usize = 3;

    /// Create a validation error without examples.
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        received: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            received: received.into(),
            expected: expected.into(),
            examples: Vec::new(),
        }
    }

    /// Attach example valid values (truncated to three).
    #[must_use]
    pub fn with_examples<S: AsRef<str>>(mut self, examples: &[S]) -> Self {
        self.examples = examples
            .iter()
            .take(Self::MAX_EXAMPLES)
            .map(|e| e.as_ref().to_string())
            .collect();
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid parameter '{}': expected {}, received {}",
            self.field, self.expected, self.received
        )?;
        if !self.examples.is_empty() {
            write!(f, " (examples: {})", self.examples.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Machine-readable error category forwarded to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidParameter,
    WrongStage,
    MissingNode,
    Internal,
    Critical,
}

/// Errors that can occur in the reasoning engine.
///
/// - No silent failures
/// - Use `Result<T, AsrGotError>` for fallible operations
/// - Operation boundaries convert every variant into a structured result
#[derive(Debug, Error)]
pub enum AsrGotError {
    /// Caller input failed a validation check.
    #[error("{0}")]
    InvalidParameter(#[from] ValidationError),

    /// Operation invoked out of order.
    #[error(
        "Operation '{operation}' requires stage {expected} but the graph is at stage {current}"
    )]
    WrongStage {
        operation: &'static str,
        current: Stage,
        expected: Stage,
    },

    /// A referenced node does not exist.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// A referenced node exists but has the wrong kind.
    #[error("Node {id} is a {found} node, expected a {expected} node")]
    WrongNodeKind {
        id: String,
        expected: crate::NodeKind,
        found: crate::NodeKind,
    },

    /// A node id is already taken.
    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    /// An edge id is already taken.
    #[error("Duplicate edge id: {0}")]
    DuplicateEdge(String),

    /// Every item of a hypothesis batch was rejected.
    #[error("No hypotheses were accepted ({} rejected): {}", .0.len(), .0.join("; "))]
    NoHypothesesAccepted(Vec<String>),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// An invariant was violated inside the engine.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Recovery from an internal error failed.
    #[error("Critical error: {0}")]
    Critical(String),
}

impl AsrGotError {
    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            AsrGotError::InvalidParameter(_) | AsrGotError::NoHypothesesAccepted(_) => {
                ErrorKind::InvalidParameter
            }
            AsrGotError::WrongStage { .. } => ErrorKind::WrongStage,
            AsrGotError::NodeNotFound(_) | AsrGotError::WrongNodeKind { .. } => {
                ErrorKind::MissingNode
            }
            AsrGotError::DuplicateNode(_)
            | AsrGotError::DuplicateEdge(_)
            | AsrGotError::SerializationError(_)
            | AsrGotError::IoError(_)
            | AsrGotError::Internal(_) => ErrorKind::Internal,
            AsrGotError::Critical(_) => ErrorKind::Critical,
        }
    }

    /// The validation detail, if this is a parameter error.
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            AsrGotError::InvalidParameter(v) => Some(v),
            _ => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_scheme() {
        assert_eq!(NodeId::root().as_str(), "n0");
        assert_eq!(NodeId::dimension(6).as_str(), "2.6");
        assert_eq!(NodeId::hypothesis(6, 2).as_str(), "3.6.2");
        assert!(NodeId::root().is_root());
    }

    #[test]
    fn dimension_index_parsing() {
        assert_eq!(NodeId::dimension(12).dimension_index(), Some(12));
        assert_eq!(NodeId::from("2.0").dimension_index(), None);
        assert_eq!(NodeId::from("2.").dimension_index(), None);
        assert_eq!(NodeId::from("2.1a").dimension_index(), None);
        assert_eq!(NodeId::from("3.1.1").dimension_index(), None);
        assert_eq!(NodeId::from("n0").dimension_index(), None);
    }

    #[test]
    fn edge_id_is_deterministic() {
        let id = EdgeId::between(&NodeId::root(), &NodeId::dimension(1));
        assert_eq!(id.as_str(), "e_n0_2.1");
    }

    #[test]
    fn layer_routing_by_dimension_name() {
        assert_eq!(LayerId::for_dimension("Scope"), LayerId::Base);
        assert_eq!(LayerId::for_dimension("Constraints"), LayerId::Methodological);
        assert_eq!(LayerId::for_dimension("Potential Biases"), LayerId::Methodological);
        assert_eq!(LayerId::for_dimension("Data Needs"), LayerId::Empirical);
        assert_eq!(LayerId::for_dimension("Knowledge Gaps"), LayerId::Theoretical);
        assert_eq!(
            LayerId::for_dimension("Interdisciplinary Links"),
            LayerId::Interdisciplinary
        );
    }

    #[test]
    fn validation_error_display_lists_examples() {
        let err = ValidationError::new("format", "\"xml\"", "one of json, yaml")
            .with_examples(&["json", "yaml", "JSON", "YAML"]);
        assert_eq!(err.examples.len(), 3);
        let text = err.to_string();
        assert!(text.contains("'format'"));
        assert!(text.contains("examples: json, yaml, JSON"));
    }

    #[test]
    fn error_kinds() {
        let err = AsrGotError::WrongStage {
            operation: "decompose",
            current: Stage::S0,
            expected: Stage::S1,
        };
        assert_eq!(err.kind(), ErrorKind::WrongStage);
        assert_eq!(
            AsrGotError::NodeNotFound("2.9".into()).kind(),
            ErrorKind::MissingNode
        );
        assert_eq!(
            AsrGotError::DuplicateNode("n0".into()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn warnings_collect_in_order() {
        let mut warnings = Warnings::new();
        warnings.push("first");
        warnings.push(String::from("second"));
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings.as_slice(), ["first", "second"]);
    }
}
