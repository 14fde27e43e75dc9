//! # ASR-GoT MCP Server
//!
//! Entry point for the MCP (Model Context Protocol) tool-call server.
//!
//! Reads configuration from environment variables:
//! - `ASRGOT_CONFIG`: optional path to an engine configuration TOML file
//! - `RUST_LOG`: log filter (default: `asrgot_mcp=info,asrgot_core=info`)
//!
//! Communicates with AI clients (Claude, GPT) via MCP over stdio and keeps
//! one research session in memory for the lifetime of the process.

mod server;

use asrgot_core::EngineConfig;
use rmcp::{ServiceExt, transport::stdio};
use server::AsrGotMcp;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging to stderr only; stdout is reserved for MCP stdio transport.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("asrgot_mcp=info,asrgot_core=info")),
        )
        .init();

    let config = match std::env::var("ASRGOT_CONFIG") {
        Ok(path) => {
            let config = EngineConfig::load(&PathBuf::from(&path))?;
            tracing::info!("Engine configuration loaded from {}", path);
            config
        }
        Err(_) => EngineConfig::default(),
    };

    tracing::info!("ASR-GoT MCP server starting");

    let mcp = AsrGotMcp::new(config);

    let service = mcp.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("MCP serve error: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}
