//! # Session Module
//!
//! [`ResearchSession`] owns one graph, its stage cursor and the settings
//! chosen at initialization, and exposes the five operations:
//!
//! | Operation | Stage | Mutates |
//! |-----------|-------|---------|
//! | `initialize` | S0 -> S1 | yes |
//! | `decompose` | S1 -> S2 | yes |
//! | `generate_hypotheses` | S2 -> S3 | yes |
//! | `summary` | any | no |
//! | `export` | any | no |
//!
//! Every operation returns an [`OperationResult`] and never an `Err`.
//! Mutating operations build their changes on a staged copy of the graph and
//! commit graph and cursor together as the last step, so a failure leaves no
//! partial mutation behind.
//!
//! The session is not synchronized. Hosts serving concurrent callers must
//! hold one exclusive lock per session around every mutating call.

use crate::config::{EngineConfig, SessionConfig};
use crate::confidence::ConfidenceVector;
use crate::export::{ExportFormat, export_graph};
use crate::graph::ResearchGraph;
use crate::metadata::{
    EdgeMetadataBase, EpistemicStatus, NodeMetadataBase, ResearchPlan, build_edge_metadata,
    build_node_metadata, detect_bias_flags,
};
use crate::parameters::active_parameters;
use crate::primitives::{MAX_HYPOTHESES, disciplines_for_dimension};
use crate::summary::GraphSummary;
use crate::system::{Operation, Stage, StageCursor, StageStatus, StageTransition, TRANSITIONS, Transition};
use crate::validation::{HypothesisSpec, Validator};
use crate::{
    AsrGotError, Edge, EdgeId, ErrorKind, LayerId, Node, NodeId, NodeKind, ValidationError,
    Warnings,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label of the root node.
pub const ROOT_LABEL: &str = "Task Understanding";

/// Edge type from the root to each dimension.
pub const DECOMPOSITION_EDGE: &str = "Decomposition";

/// Edge type from a dimension to each hypothesis.
pub const HYPOTHESIS_EDGE: &str = "Hypothesis";

// =============================================================================
// REQUESTS
// =============================================================================

/// Arguments of `initialize`.
///
/// Fields are raw JSON so that every value goes through validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitializeRequest {
    #[serde(default)]
    pub task_description: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_confidence: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl InitializeRequest {
    /// Request with only a task description.
    #[must_use]
    pub fn new(task_description: impl Into<String>) -> Self {
        Self {
            task_description: Value::String(task_description.into()),
            ..Self::default()
        }
    }

    /// Set the initial confidence.
    #[must_use]
    pub fn with_confidence(mut self, confidence: [f64; 4]) -> Self {
        self.initial_confidence = Some(Value::from(confidence.to_vec()));
        self
    }

    /// Set the config object.
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }
}

/// Arguments of `decompose`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecomposeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_dimensions: Option<Value>,
}

impl DecomposeRequest {
    /// Request with custom dimension names.
    #[must_use]
    pub fn with_dimensions<S: AsRef<str>>(dimensions: &[S]) -> Self {
        Self {
            custom_dimensions: Some(Value::from(
                dimensions.iter().map(|d| d.as_ref()).collect::<Vec<_>>(),
            )),
        }
    }
}

/// Arguments of `generate_hypotheses`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HypothesesRequest {
    #[serde(default)]
    pub dimension_node_id: Value,
    #[serde(default)]
    pub hypotheses: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl HypothesesRequest {
    /// Request for a dimension with a JSON array of items.
    #[must_use]
    pub fn new(dimension_node_id: &str, hypotheses: Value) -> Self {
        Self {
            dimension_node_id: Value::String(dimension_node_id.to_string()),
            hypotheses,
            config: None,
        }
    }

    /// Set the config object.
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// Structured outcome of an operation.
///
/// On success `data` is flattened into the record; on failure `error` and
/// `error_kind` describe what went wrong.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub operation: &'static str,
    pub current_stage: u8,
    pub stage_name: &'static str,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_attempted: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl<T> OperationResult<T> {
    fn succeeded(operation: &'static str, stage: Stage, data: T, warnings: Warnings) -> Self {
        Self {
            success: true,
            operation,
            current_stage: stage.index(),
            stage_name: stage.name(),
            data: Some(data),
            error: None,
            error_kind: None,
            validation: None,
            recovery_attempted: None,
            warnings: warnings.into_vec(),
        }
    }

    fn failed(
        operation: &'static str,
        stage: Stage,
        error: &AsrGotError,
        recovery_attempted: Option<bool>,
        warnings: Warnings,
    ) -> Self {
        Self {
            success: false,
            operation,
            current_stage: stage.index(),
            stage_name: stage.name(),
            data: None,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
            validation: error.validation().cloned(),
            recovery_attempted,
            warnings: warnings.into_vec(),
        }
    }

    /// Did the operation succeed?
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The payload, if the operation succeeded.
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }
}

/// Payload of `initialize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializeData {
    pub root_node_id: NodeId,
    pub task_description: String,
    pub initial_confidence: [f64; 4],
    pub disciplinary_tags: Vec<String>,
    pub active_parameters: Vec<String>,
}

/// One created dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionInfo {
    pub node_id: NodeId,
    pub label: String,
    pub layer: LayerId,
    pub disciplinary_tags: Vec<String>,
}

/// Payload of `decompose`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecomposeData {
    pub dimension_node_ids: Vec<NodeId>,
    pub dimensions: Vec<DimensionInfo>,
    pub edges_created: usize,
}

/// Payload of `generate_hypotheses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypothesesData {
    pub dimension_node_id: NodeId,
    pub hypothesis_node_ids: Vec<NodeId>,
    pub hypotheses_created: usize,
    /// One message per rejected item.
    pub errors: Vec<String>,
}

/// Payload of `export`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportData {
    pub format: ExportFormat,
    pub content: String,
    /// BLAKE3 checksum of the graph, with the `crypto-hash` feature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

/// Where the session stands in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub current_stage: u8,
    pub stage_name: String,
    pub next_operation: Option<String>,
    pub next_operation_available: bool,
    pub stages: Vec<StageStatus>,
    pub trace: Vec<StageTransition>,
}

// =============================================================================
// SESSION
// =============================================================================

/// The dimension a hypothesis batch attaches to.
struct HypothesisParent {
    id: NodeId,
    index: usize,
    layer: LayerId,
    tags: Vec<String>,
}

/// A research reasoning session.
#[derive(Debug, Clone)]
pub struct ResearchSession {
    config: EngineConfig,
    graph: ResearchGraph,
    cursor: StageCursor,
    settings: SessionConfig,
    task_description: Option<String>,
}

impl Default for ResearchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ResearchSession {
    /// Create a session with the default engine configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a session with a custom engine configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            settings: SessionConfig::from_engine(&config),
            config,
            graph: ResearchGraph::new(),
            cursor: StageCursor::new(),
            task_description: None,
        }
    }

    /// Get the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the graph.
    #[must_use]
    pub fn graph(&self) -> &ResearchGraph {
        &self.graph
    }

    /// Get the stage cursor.
    #[must_use]
    pub fn cursor(&self) -> &StageCursor {
        &self.cursor
    }

    /// Get the current stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.cursor.current()
    }

    /// Settings chosen at initialization.
    #[must_use]
    pub fn settings(&self) -> &SessionConfig {
        &self.settings
    }

    /// The validated task description, once initialized.
    #[must_use]
    pub fn task_description(&self) -> Option<&str> {
        self.task_description.as_deref()
    }

    /// Drop the graph and return to S0.
    ///
    /// Fails with `Critical` if the graph is not pristine afterwards.
    pub fn reset(&mut self) -> Result<(), AsrGotError> {
        self.graph.clear();
        self.cursor.reset();
        self.task_description = None;
        self.settings = SessionConfig::from_engine(&self.config);

        if self.graph.is_pristine() && self.cursor.current() == Stage::S0 {
            Ok(())
        } else {
            Err(AsrGotError::Critical(
                "graph reset left residual state".to_string(),
            ))
        }
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Create the root node from a task description.
    ///
    /// A populated graph is discarded first. Any failure resets the session.
    pub fn initialize(&mut self, request: &InitializeRequest) -> OperationResult<InitializeData> {
        let mut warnings = Warnings::new();
        let outcome = self.run_initialize(request, &mut warnings);
        self.conclude(Operation::Initialize, outcome, warnings, true)
    }

    /// Create one dimension node per dimension, linked from the root.
    pub fn decompose(&mut self, request: &DecomposeRequest) -> OperationResult<DecomposeData> {
        let mut warnings = Warnings::new();
        let outcome = self.run_decompose(request, &mut warnings);
        self.conclude(Operation::Decompose, outcome, warnings, false)
    }

    /// Attach 3 to 5 hypotheses to a dimension.
    ///
    /// Items are validated one by one; rejected items are reported in
    /// `errors` and the batch succeeds if at least one item was accepted.
    pub fn generate_hypotheses(
        &mut self,
        request: &HypothesesRequest,
    ) -> OperationResult<HypothesesData> {
        let mut warnings = Warnings::new();
        let outcome = self.run_generate_hypotheses(request, &mut warnings);
        self.conclude(Operation::GenerateHypotheses, outcome, warnings, false)
    }

    /// Summarize the graph.
    #[must_use]
    pub fn summary(&self) -> OperationResult<GraphSummary> {
        let summary =
            GraphSummary::from_graph(&self.graph, &self.cursor, self.task_description.as_deref());
        OperationResult::succeeded("get_summary", self.stage(), summary, Warnings::new())
    }

    /// Export the graph as `json` or `yaml`.
    ///
    /// Read-only: a failure is reported without touching the session.
    #[must_use]
    pub fn export(&self, format: &str) -> OperationResult<ExportData> {
        match self.run_export(format) {
            Ok(data) => OperationResult::succeeded("export_graph", self.stage(), data, Warnings::new()),
            Err(e) => {
                tracing::warn!(operation = "export_graph", "Export rejected: {}", e);
                OperationResult::failed("export_graph", self.stage(), &e, None, Warnings::new())
            }
        }
    }

    /// Stage table, trace and the next legal operation.
    #[must_use]
    pub fn stage_report(&self) -> StageReport {
        let current = self.cursor.current();
        let next = TRANSITIONS.iter().find(|t| t.from == current).map(|t| t.operation);
        StageReport {
            current_stage: current.index(),
            stage_name: current.name().to_string(),
            next_operation: next.map(|op| op.name().to_string()),
            next_operation_available: next.is_some_and(|op| op.is_implemented()),
            stages: self.cursor.progress(),
            trace: self.cursor.trace().to_vec(),
        }
    }

    // =========================================================================
    // OPERATION BODIES
    // =========================================================================

    fn run_initialize(
        &mut self,
        request: &InitializeRequest,
        warnings: &mut Warnings,
    ) -> Result<InitializeData, AsrGotError> {
        let task = Validator::task_description(&request.task_description)?;
        let confidence = match &request.initial_confidence {
            Some(value) => Validator::confidence("initial_confidence", value)?,
            None => ConfidenceVector::new(self.config.default_confidence)?,
        };
        let settings = Validator::session_config(request.config.as_ref(), &self.config, warnings)?;

        if !self.graph.is_empty() || self.cursor.current() != Stage::S0 {
            warnings.push(format!(
                "Graph already initialized; discarding {} node(s) and {} edge(s)",
                self.graph.node_count(),
                self.graph.edge_count()
            ));
            self.reset()?;
        }
        let transition = self.cursor.check(Operation::Initialize)?;

        let metadata = build_node_metadata(
            NodeMetadataBase {
                provenance: Some("task_initialization".to_string()),
                epistemic_status: Some(EpistemicStatus::Established),
                disciplinary_tags: Some(settings.disciplinary_tags.clone()),
                attribution: Some(settings.attribution.clone()),
                layer: Some(LayerId::Base),
                confidence: Some(confidence.values().to_vec()),
                ..NodeMetadataBase::default()
            },
            warnings,
        );

        let mut staged = ResearchGraph::new();
        staged
            .insert_node(Node::new(
                NodeId::root(),
                ROOT_LABEL,
                NodeKind::Root,
                task.clone(),
                metadata,
            ))
            .map_err(internal)?;

        self.commit(staged, transition)?;
        self.task_description = Some(task.clone());
        let disciplinary_tags = settings.disciplinary_tags.clone();
        self.settings = settings;

        Ok(InitializeData {
            root_node_id: NodeId::root(),
            task_description: task,
            initial_confidence: confidence.values(),
            disciplinary_tags,
            active_parameters: active_parameters(),
        })
    }

    fn run_decompose(
        &mut self,
        request: &DecomposeRequest,
        warnings: &mut Warnings,
    ) -> Result<DecomposeData, AsrGotError> {
        let transition = self.cursor.check(Operation::Decompose)?;
        let names = match Validator::custom_dimensions(request.custom_dimensions.as_ref(), warnings)? {
            Some(custom) => custom,
            None => self.config.default_dimensions.clone(),
        };

        let root = NodeId::root();
        if self.graph.node(NodeId::ROOT).is_none() {
            return Err(AsrGotError::Internal(
                "root node missing at decomposition".to_string(),
            ));
        }

        let confidence = self.config.dimension_confidence.to_vec();
        let mut staged = self.graph.clone();
        let mut dimensions = Vec::with_capacity(names.len());

        for (i, name) in names.iter().enumerate() {
            let id = NodeId::dimension(i + 1);
            let layer = if self.settings.enable_multi_layer {
                LayerId::for_dimension(name)
            } else {
                LayerId::Base
            };
            let tags = disciplines_for_dimension(name);

            let metadata = build_node_metadata(
                NodeMetadataBase {
                    provenance: Some("task_decomposition".to_string()),
                    epistemic_status: Some(EpistemicStatus::Established),
                    disciplinary_tags: Some(tags.clone()),
                    attribution: Some(self.settings.attribution.clone()),
                    layer: Some(layer),
                    confidence: Some(confidence.clone()),
                    ..NodeMetadataBase::default()
                },
                warnings,
            );
            staged
                .insert_node(Node::new(id.clone(), name.clone(), NodeKind::Dimension, name.clone(), metadata))
                .map_err(internal)?;

            let edge_metadata = build_edge_metadata(
                EdgeMetadataBase {
                    confidence: Some(confidence.clone()),
                    layer_connection: layer_connection(LayerId::Base, layer),
                    ..EdgeMetadataBase::typed(DECOMPOSITION_EDGE)
                },
                warnings,
            );
            staged
                .insert_edge(Edge::new(root.clone(), id.clone(), edge_metadata))
                .map_err(internal)?;

            dimensions.push(DimensionInfo {
                node_id: id,
                label: name.clone(),
                layer,
                disciplinary_tags: tags,
            });
        }

        self.commit(staged, transition)?;

        Ok(DecomposeData {
            dimension_node_ids: dimensions.iter().map(|d| d.node_id.clone()).collect(),
            edges_created: dimensions.len(),
            dimensions,
        })
    }

    fn run_generate_hypotheses(
        &mut self,
        request: &HypothesesRequest,
        warnings: &mut Warnings,
    ) -> Result<HypothesesData, AsrGotError> {
        let transition = self.cursor.check(Operation::GenerateHypotheses)?;
        let limits = Validator::hypothesis_config(request.config.as_ref(), &self.config, warnings)?;
        let dimension_id = Validator::dimension_node_id(&request.dimension_node_id)?;

        let parent = {
            let Some(dimension) = self.graph.node(dimension_id.as_str()) else {
                let available: Vec<String> = self
                    .graph
                    .ids_of_kind(NodeKind::Dimension)
                    .into_iter()
                    .map(|id| id.0)
                    .collect();
                return Err(AsrGotError::NodeNotFound(format!(
                    "{dimension_id} (available dimension nodes: {})",
                    available.join(", ")
                )));
            };
            if dimension.kind != NodeKind::Dimension {
                return Err(AsrGotError::WrongNodeKind {
                    id: dimension_id.to_string(),
                    expected: NodeKind::Dimension,
                    found: dimension.kind,
                });
            }
            HypothesisParent {
                index: dimension_id.dimension_index().ok_or_else(|| {
                    AsrGotError::Internal(format!("dimension id {dimension_id} has no index"))
                })?,
                layer: dimension.layer().unwrap_or(LayerId::Base),
                tags: dimension.metadata.disciplinary_tags.clone(),
                id: dimension_id,
            }
        };

        let items = Validator::hypotheses_collection(&request.hypotheses)?;
        let limit = limits.max_hypotheses.min(MAX_HYPOTHESES);
        if items.len() > limit {
            warnings.push(format!(
                "Only the first {limit} of {} hypotheses are processed",
                items.len()
            ));
        }

        let mut staged = self.graph.clone();
        let mut created = Vec::new();
        let mut errors = Vec::new();

        for (offset, item) in items.iter().take(limit).enumerate() {
            let position = offset + 1;
            let mut item_warnings = Warnings::new();
            let outcome =
                Validator::hypothesis_item(position, item, &mut item_warnings).and_then(|spec| {
                    add_hypothesis(
                        &mut staged,
                        &parent,
                        position,
                        spec,
                        &self.settings.attribution,
                        &mut item_warnings,
                    )
                });
            match outcome {
                Ok(id) => {
                    warnings.merge(item_warnings);
                    created.push(id);
                }
                Err(e) => {
                    let message = format!("Hypothesis {position}: {e}");
                    tracing::warn!("{}", message);
                    errors.push(message);
                }
            }
        }

        if created.is_empty() {
            return Err(AsrGotError::NoHypothesesAccepted(errors));
        }
        if !errors.is_empty() {
            warnings.push(format!(
                "{} of {} hypotheses rejected",
                errors.len(),
                items.len().min(limit)
            ));
        }

        self.commit(staged, transition)?;

        Ok(HypothesesData {
            dimension_node_id: parent.id,
            hypotheses_created: created.len(),
            hypothesis_node_ids: created,
            errors,
        })
    }

    fn run_export(&self, format: &str) -> Result<ExportData, AsrGotError> {
        let parsed = Validator::export_format(format)?;
        let content = export_graph(
            &self.graph,
            &self.cursor,
            self.task_description.as_deref(),
            parsed.as_str(),
        )?;

        #[cfg(feature = "crypto-hash")]
        let checksum = Some(crate::export::graph_checksum(&self.graph, &self.cursor)?);
        #[cfg(not(feature = "crypto-hash"))]
        let checksum = None;

        Ok(ExportData {
            format: parsed,
            content,
            checksum,
        })
    }

    // =========================================================================
    // COMMIT & RECOVERY
    // =========================================================================

    /// Swap in the staged graph and advance the cursor together.
    fn commit(&mut self, staged: ResearchGraph, transition: Transition) -> Result<(), AsrGotError> {
        let mut cursor = self.cursor.clone();
        cursor.advance(transition)?;
        self.graph = staged;
        self.cursor = cursor;
        Ok(())
    }

    /// Turn an operation outcome into a result, resetting when required.
    fn conclude<T>(
        &mut self,
        operation: Operation,
        outcome: Result<T, AsrGotError>,
        warnings: Warnings,
        reset_on_any_failure: bool,
    ) -> OperationResult<T> {
        let err = match outcome {
            Ok(data) => {
                return OperationResult::succeeded(operation.name(), self.stage(), data, warnings);
            }
            Err(err) => err,
        };

        let internal_failure = matches!(err.kind(), ErrorKind::Internal | ErrorKind::Critical);
        if !internal_failure && !reset_on_any_failure {
            tracing::warn!(operation = operation.name(), "Operation rejected: {}", err);
            return OperationResult::failed(operation.name(), self.stage(), &err, None, warnings);
        }

        if internal_failure {
            tracing::error!(operation = operation.name(), "Operation failed: {}; resetting graph", err);
        } else {
            tracing::warn!(operation = operation.name(), "Operation rejected: {}; resetting graph", err);
        }

        let reset = self.reset();
        self.recovered(operation, &err, reset, warnings)
    }

    /// Result of a failed operation after a reset attempt.
    ///
    /// A failed reset escalates the failure to `Critical`.
    fn recovered<T>(
        &self,
        operation: Operation,
        err: &AsrGotError,
        reset: Result<(), AsrGotError>,
        warnings: Warnings,
    ) -> OperationResult<T> {
        match reset {
            Ok(()) => OperationResult::failed(operation.name(), self.stage(), err, Some(true), warnings),
            Err(reset_err) => {
                let critical = AsrGotError::Critical(format!(
                    "recovery from '{err}' failed: {reset_err}"
                ));
                tracing::error!(operation = operation.name(), "{}", critical);
                OperationResult::failed(operation.name(), self.stage(), &critical, Some(true), warnings)
            }
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Insert one validated hypothesis and its edge from the parent dimension.
fn add_hypothesis(
    graph: &mut ResearchGraph,
    parent: &HypothesisParent,
    position: usize,
    spec: HypothesisSpec,
    default_attribution: &[String],
    warnings: &mut Warnings,
) -> Result<NodeId, AsrGotError> {
    let id = NodeId::hypothesis(parent.index, position);
    let edge_id = EdgeId::between(&parent.id, &id);
    if graph.node(id.as_str()).is_some() {
        return Err(AsrGotError::DuplicateNode(id.to_string()));
    }
    if graph.contains_edge(&edge_id) {
        return Err(AsrGotError::DuplicateEdge(edge_id.to_string()));
    }

    let confidence = spec.confidence.map(|c| c.values().to_vec());
    let mut base = NodeMetadataBase {
        provenance: Some("hypothesis_generation".to_string()),
        epistemic_status: Some(EpistemicStatus::Hypothetical),
        disciplinary_tags: Some(
            spec.disciplinary_tags
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| parent.tags.clone()),
        ),
        falsification_criteria: spec.falsification_criteria,
        bias_flags: Some(detect_bias_flags(&spec.content)),
        layer: Some(parent.layer),
        impact_score: spec.impact_score,
        attribution: Some(
            spec.attribution
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| default_attribution.to_vec()),
        ),
        confidence: confidence.clone(),
        plan: Some(spec.plan.unwrap_or_else(ResearchPlan::default_literature_search)),
        ..NodeMetadataBase::default()
    };
    base.absorb_extras(spec.extras, warnings);
    let metadata = build_node_metadata(base, warnings);

    let label = format!("Hypothesis {}.{}", parent.index, position);
    graph.insert_node(Node::new(id.clone(), label, NodeKind::Hypothesis, spec.content, metadata))?;

    let edge_metadata = build_edge_metadata(
        EdgeMetadataBase {
            confidence,
            ..EdgeMetadataBase::typed(HYPOTHESIS_EDGE)
        },
        warnings,
    );
    graph.insert_edge(Edge::new(parent.id.clone(), id.clone(), edge_metadata))?;
    Ok(id)
}

/// `"<from>-><to>"` when an edge crosses layers.
fn layer_connection(from: LayerId, to: LayerId) -> Option<String> {
    (from != to).then(|| format!("{from}->{to}"))
}

/// Reclassify a store error raised where the store should never fail.
fn internal(err: AsrGotError) -> AsrGotError {
    match err {
        AsrGotError::Internal(_) | AsrGotError::Critical(_) => err,
        other => AsrGotError::Internal(other.to_string()),
    }
}

// =============================================================================
// TESTS
// =============================================================================
