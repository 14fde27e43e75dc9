//! # asrgot-core
//!
//! The stage-gated research reasoning engine.
//!
//! A [`ResearchSession`] owns one in-memory graph and walks it through a fixed
//! stage sequence. The first three stages are implemented:
//!
//! - **S1 Initialization**: a root node captures the task
//! - **S2 Decomposition**: one dimension node per research dimension
//! - **S3 Hypothesis/Planning**: 3 to 5 hypotheses per dimension
//!
//! Summary and export are read-only and legal at any stage.
//!
//! ## Guarantees
//!
//! - Every externally supplied value is validated before it can touch the graph
//! - Every node and edge carries a complete metadata bundle
//! - The stage cursor only moves forward, except for an explicit reset
//! - A failed operation leaves no partial mutation behind
//! - No async, no network, no persistence: hosts live in `apps/`

// =============================================================================
// MODULES
// =============================================================================

pub mod confidence;
pub mod config;
pub mod export;
pub mod graph;
pub mod metadata;
pub mod parameters;
pub mod primitives;
pub mod session;
pub mod summary;
pub mod system;
pub mod types;
pub mod validation;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AsrGotError, Edge, EdgeId, ErrorKind, Hyperedge, Layer, LayerId, Node, NodeId, NodeKind,
    ValidationError, Warnings,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use confidence::{ConfidenceDistribution, ConfidenceVector};
pub use config::{EngineConfig, SessionConfig};
pub use export::{ExportFormat, export_graph};
pub use graph::ResearchGraph;
pub use metadata::{EdgeMetadata, EpistemicStatus, NodeMetadata, ResearchPlan};
pub use parameters::{Parameter, ParameterInfo};
pub use session::{
    DecomposeData, DecomposeRequest, ExportData, HypothesesData, HypothesesRequest,
    InitializeData, InitializeRequest, OperationResult, ResearchSession, StageReport,
};
pub use summary::GraphSummary;
pub use validation::Validator;

#[cfg(feature = "crypto-hash")]
pub use export::graph_checksum;

// =============================================================================
// RE-EXPORTS: System (from system module)
// =============================================================================

pub use system::{Operation, Stage, StageCursor, StageStatus, StageTransition, TopologySummary};
