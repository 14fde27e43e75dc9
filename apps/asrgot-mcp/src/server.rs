//! # ASR-GoT MCP Server
//!
//! Implements `ServerHandler` with 7 MCP tools over one in-process
//! `ResearchSession`.
//!
//! Operation failures are tool-level errors (`is_error: true`) carrying the
//! structured result; `McpError` is reserved for serialization problems.

use asrgot_core::parameters::catalog;
use asrgot_core::{
    DecomposeRequest, EngineConfig, HypothesesRequest, InitializeRequest, OperationResult,
    ResearchSession,
};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

// =============================================================================
// MCP SERVER
// =============================================================================

/// MCP server owning one research session.
#[derive(Clone)]
pub struct AsrGotMcp {
    session: Arc<Mutex<ResearchSession>>,
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

// =============================================================================
// TOOL PARAMETER STRUCTS
// =============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct InitializeParams {
    /// The research task to reason about.
    #[schemars(description = "The research task, 10 to 1000 characters")]
    pub task_description: Value,
    /// Initial confidence vector.
    #[schemars(
        description = "Initial confidence [empirical, theoretical, methodological, consensus], each 0-1 (default [0.8, 0.8, 0.8, 0.8])"
    )]
    #[serde(default)]
    pub initial_confidence: Option<Value>,
    /// Session settings.
    #[schemars(
        description = "Optional object: disciplinary_tags (string list), attribution (string list), enable_multi_layer (boolean)"
    )]
    #[serde(default)]
    pub config: Option<Value>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DecomposeParams {
    /// Dimension names replacing the default seven.
    #[schemars(
        description = "Optional list of dimension names; 'Potential Biases' and 'Knowledge Gaps' are always included"
    )]
    #[serde(default)]
    pub custom_dimensions: Option<Value>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct HypothesesParams {
    /// The dimension node to attach hypotheses to.
    #[schemars(description = "Dimension node id of the form 2.<k>, e.g. '2.6'")]
    pub dimension_node_id: Value,
    /// Three to five hypotheses.
    #[schemars(
        description = "3 to 5 hypotheses: strings, or objects with 'content' and optional confidence, falsification_criteria, plan, impact_score, disciplinary_tags, attribution"
    )]
    pub hypotheses: Value,
    /// Batch settings.
    #[schemars(description = "Optional object: max_hypotheses (1-5)")]
    #[serde(default)]
    pub config: Option<Value>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExportParams {
    /// Export format.
    #[schemars(description = "Export format: 'json' (default) or 'yaml'")]
    #[serde(default)]
    pub format: Option<String>,
}

// =============================================================================
// TOOL IMPLEMENTATIONS
// =============================================================================

#[tool_router]
impl AsrGotMcp {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            session: Arc::new(Mutex::new(ResearchSession::with_config(config))),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Stage 1: initialize the research graph with a root node for the task. Discards any existing graph."
    )]
    async fn initialize_asr_got(
        &self,
        params: Parameters<InitializeParams>,
    ) -> Result<CallToolResult, McpError> {
        let InitializeParams {
            task_description,
            initial_confidence,
            config,
        } = params.0;
        let request = InitializeRequest {
            task_description,
            initial_confidence,
            config,
        };
        let result = self.session.lock().await.initialize(&request);
        respond(&result)
    }

    #[tool(description = "Stage 2: decompose the task into dimension nodes linked to the root")]
    async fn decompose_research_task(
        &self,
        params: Parameters<DecomposeParams>,
    ) -> Result<CallToolResult, McpError> {
        let request = DecomposeRequest {
            custom_dimensions: params.0.custom_dimensions,
        };
        let result = self.session.lock().await.decompose(&request);
        respond(&result)
    }

    #[tool(description = "Stage 3: attach 3 to 5 hypotheses to one dimension node")]
    async fn generate_hypotheses(
        &self,
        params: Parameters<HypothesesParams>,
    ) -> Result<CallToolResult, McpError> {
        let HypothesesParams {
            dimension_node_id,
            hypotheses,
            config,
        } = params.0;
        let request = HypothesesRequest {
            dimension_node_id,
            hypotheses,
            config,
        };
        let result = self.session.lock().await.generate_hypotheses(&request);
        respond(&result)
    }

    #[tool(description = "Summarize the graph: counts, layers, node types, topology and quality metrics")]
    async fn get_graph_summary(&self) -> Result<CallToolResult, McpError> {
        let result = self.session.lock().await.summary();
        respond(&result)
    }

    #[tool(description = "Export the whole graph as JSON or as a YAML report")]
    async fn export_graph_data(
        &self,
        params: Parameters<ExportParams>,
    ) -> Result<CallToolResult, McpError> {
        let format = params.0.format.unwrap_or_else(|| "json".to_string());
        let result = self.session.lock().await.export(&format);
        match result.data() {
            Some(data) => {
                let mut content = vec![Content::text(data.content.clone())];
                if let Some(checksum) = &data.checksum {
                    content.push(Content::text(format!("BLAKE3: {checksum}")));
                }
                Ok(CallToolResult::success(content))
            }
            None => respond(&result),
        }
    }

    #[tool(description = "Current stage, next legal operation, the 9-stage table and the transition trace")]
    async fn get_stage_status(&self) -> Result<CallToolResult, McpError> {
        let report = self.session.lock().await.stage_report();
        Ok(CallToolResult::success(vec![Content::text(to_json(&report)?)]))
    }

    #[tool(description = "List the 28 framework parameters P1.0 to P1.27")]
    async fn list_parameters(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(to_json(&catalog())?)]))
    }
}

// =============================================================================
// SERVER HANDLER
// =============================================================================

#[tool_handler]
impl ServerHandler for AsrGotMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "ASR-GoT research reasoning server. Call initialize_asr_got, then \
                 decompose_research_task, then generate_hypotheses for one dimension. \
                 get_graph_summary, export_graph_data and get_stage_status work at any stage."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// =============================================================================
// RESPONSE FORMATTING
// =============================================================================

/// Render an operation result; failures become tool-level errors.
fn respond<T: Serialize>(result: &OperationResult<T>) -> Result<CallToolResult, McpError> {
    let text = to_json(result)?;
    if result.is_success() {
        Ok(CallToolResult::success(vec![Content::text(text)]))
    } else {
        Ok(CallToolResult::error(vec![Content::text(text)]))
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))
}

// =============================================================================
// TESTS
// =============================================================================
