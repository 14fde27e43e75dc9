//! # Scripted Pipelines
//!
//! A pipeline file lists operations to replay against one session:
//!
//! ```json
//! {
//!   "steps": [
//!     { "operation": "initialize", "task_description": "Investigate the role of skin microbiome in disease" },
//!     { "operation": "decompose" },
//!     { "operation": "generate_hypotheses", "dimension_node_id": "2.6",
//!       "hypotheses": ["H1 text", "H2 text", "H3 text"] },
//!     { "operation": "summary" },
//!     { "operation": "export", "format": "yaml" }
//!   ]
//! }
//! ```
//!
//! Steps run in order whether or not earlier ones failed; a step that runs
//! out of order reports `wrong_stage` like any other caller would see.

use asrgot_core::{
    AsrGotError, DecomposeRequest, HypothesesRequest, InitializeRequest, OperationResult,
    ResearchSession,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An ordered list of operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub steps: Vec<PipelineStep>,
}

impl Pipeline {
    /// Parse a pipeline document.
    pub fn from_json(raw: &str) -> Result<Self, AsrGotError> {
        serde_json::from_str(raw)
            .map_err(|e| AsrGotError::SerializationError(format!("Invalid pipeline: {e}")))
    }
}

/// One operation and its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum PipelineStep {
    Initialize(InitializeRequest),
    Decompose(DecomposeRequest),
    GenerateHypotheses(HypothesesRequest),
    Summary,
    StageReport,
    Export {
        #[serde(default)]
        format: Option<String>,
    },
}

/// Results of a replay.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineOutcome {
    pub results: Vec<Value>,
    pub failures: usize,
}

/// Replay `pipeline` against `session`, collecting every result as JSON.
///
/// Only a result that cannot be serialized aborts the replay.
pub fn run_pipeline(
    session: &mut ResearchSession,
    pipeline: &Pipeline,
) -> Result<PipelineOutcome, AsrGotError> {
    let mut outcome = PipelineOutcome::default();

    for (position, step) in pipeline.steps.iter().enumerate() {
        let (value, ok) = match step {
            PipelineStep::Initialize(request) => record(&session.initialize(request))?,
            PipelineStep::Decompose(request) => record(&session.decompose(request))?,
            PipelineStep::GenerateHypotheses(request) => {
                record(&session.generate_hypotheses(request))?
            }
            PipelineStep::Summary => record(&session.summary())?,
            PipelineStep::StageReport => (to_value(&session.stage_report())?, true),
            PipelineStep::Export { format } => {
                record(&session.export(format.as_deref().unwrap_or("json")))?
            }
        };

        if !ok {
            outcome.failures += 1;
            tracing::warn!(step = position + 1, "Pipeline step failed");
        }
        outcome.results.push(value);
    }

    tracing::info!(
        steps = pipeline.steps.len(),
        failures = outcome.failures,
        stage = session.stage().index(),
        "Pipeline replayed"
    );
    Ok(outcome)
}

fn record<T: Serialize>(result: &OperationResult<T>) -> Result<(Value, bool), AsrGotError> {
    Ok((to_value(result)?, result.is_success()))
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, AsrGotError> {
    serde_json::to_value(value).map_err(|e| AsrGotError::SerializationError(e.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use asrgot_core::Stage;

    const SCRIPT: &str = r#"{
        "steps": [
            { "operation": "initialize",
              "task_description": "Investigate the role of skin microbiome in disease",
              "initial_confidence": [0.8, 0.7, 0.9, 0.6] },
            { "operation": "decompose" },
            { "operation": "generate_hypotheses", "dimension_node_id": "2.6",
              "hypotheses": ["H1 text", "H2 text", "H3 text"] },
            { "operation": "summary" },
            { "operation": "stage_report" },
            { "operation": "export", "format": "yaml" }
        ]
    }"#;

    #[test]
    fn parses_every_step_kind() {
        let pipeline = Pipeline::from_json(SCRIPT).unwrap_or_default();
        assert_eq!(pipeline.steps.len(), 6);
        assert!(matches!(pipeline.steps[1], PipelineStep::Decompose(_)));
        assert!(matches!(
            pipeline.steps[5],
            PipelineStep::Export { format: Some(ref f) } if f == "yaml"
        ));
    }

    #[test]
    fn full_script_reaches_hypothesis_stage() {
        let pipeline = Pipeline::from_json(SCRIPT).unwrap_or_default();
        let mut session = ResearchSession::new();
        let outcome = run_pipeline(&mut session, &pipeline);

        assert!(outcome.is_ok());
        let outcome = outcome.unwrap_or_default();
        assert_eq!(outcome.failures, 0);
        assert_eq!(outcome.results.len(), 6);
        assert_eq!(session.stage(), Stage::S3);
        assert_eq!(session.graph().node_count(), 11);
        assert_eq!(outcome.results[2]["hypotheses_created"], 3);
    }

    #[test]
    fn out_of_order_step_is_counted() {
        let raw = r#"{ "steps": [ { "operation": "decompose" }, { "operation": "summary" } ] }"#;
        let pipeline = Pipeline::from_json(raw).unwrap_or_default();
        let mut session = ResearchSession::new();
        let outcome = run_pipeline(&mut session, &pipeline).unwrap_or_default();

        assert_eq!(outcome.failures, 1);
        assert_eq!(outcome.results[0]["error_kind"], "wrong_stage");
        assert_eq!(outcome.results[1]["success"], true);
        assert_eq!(session.stage(), Stage::S0);
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let raw = r#"{ "steps": [ { "operation": "integrate_evidence" } ] }"#;
        assert!(matches!(
            Pipeline::from_json(raw),
            Err(AsrGotError::SerializationError(_))
        ));
    }
}
