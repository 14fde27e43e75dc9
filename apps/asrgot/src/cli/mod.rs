//! # ASR-GoT CLI Module
//!
//! ## Available Commands
//!
//! - `serve` - Start the HTTP server
//! - `run` - Replay a scripted pipeline and print every result
//! - `stages` - Show the stage table and which operations are available
//! - `parameters` - List the framework parameter catalog
//! - `export` - Replay a pipeline and write the resulting graph

mod commands;
mod pipeline;

use asrgot_core::AsrGotError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;
pub use pipeline::{Pipeline, PipelineOutcome, PipelineStep, run_pipeline};

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// ASR-GoT - stage-gated research reasoning graph
///
/// Builds a layered graph of a research task, its dimensions and hypotheses,
/// one gated stage at a time.
#[derive(Parser, Debug)]
#[command(name = "asrgot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Engine configuration file (TOML); falls back to ASRGOT_CONFIG
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Replay a pipeline file against a fresh session
    Run {
        /// Path to the pipeline file (JSON)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show the stage table
    Stages,

    /// List framework parameters P1.0 to P1.27
    Parameters,

    /// Replay a pipeline file and export the resulting graph
    Export {
        /// Path to the pipeline file (JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Export format (json, yaml)
        #[arg(short = 't', long, default_value = "json")]
        format: String,

        /// Output file path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AsrGotError> {
    let config = load_engine_config(cli.config.as_deref())?;
    if cli.verbose {
        tracing::info!(?config, "Engine configuration");
    }
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Serve { host, port }) => cmd_serve(config, &host, port).await,
        Some(Commands::Run { file }) => cmd_run(config, &file, json_mode),
        Some(Commands::Stages) | None => cmd_stages(json_mode),
        Some(Commands::Parameters) => cmd_parameters(json_mode),
        Some(Commands::Export {
            file,
            format,
            output,
        }) => cmd_export(config, &file, &format, output.as_deref(), json_mode),
    }
}
