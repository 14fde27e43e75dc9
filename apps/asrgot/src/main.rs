//! # ASR-GoT - Research Reasoning Server
//!
//! The main binary for the stage-gated research reasoning graph.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for scripted pipelines and catalog inspection
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │            apps/asrgot (THE BINARY)           │
//! │                                               │
//! │   ┌─────────────┐         ┌─────────────┐     │
//! │   │    CLI      │         │  HTTP API   │     │
//! │   │   (clap)    │         │   (axum)    │     │
//! │   └──────┬──────┘         └──────┬──────┘     │
//! │          └───────────┬───────────┘            │
//! │                      ▼                        │
//! │              ┌───────────────┐                │
//! │              │  asrgot-core  │                │
//! │              │  (THE ENGINE) │                │
//! │              └───────────────┘                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! asrgot serve --host 0.0.0.0 --port 8080
//!
//! # Replay a scripted pipeline
//! asrgot run --file pipeline.json
//! asrgot export --file pipeline.json --format yaml --output report.yaml
//! ```

use asrgot::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // ASRGOT_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("ASRGOT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "asrgot=info,asrgot_core=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
   ASR-GoT v{}
   Stage-gated research reasoning graph
"#,
        env!("CARGO_PKG_VERSION")
    );
}
