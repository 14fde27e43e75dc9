//! # CLI Command Implementations

use super::pipeline::{Pipeline, PipelineOutcome, run_pipeline};
use crate::api;
use asrgot_core::parameters::{CATALOG_VERSION, catalog};
use asrgot_core::{AsrGotError, EngineConfig, ResearchSession};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE LIMITS
// =============================================================================

/// Maximum pipeline file size (10 MB).
const MAX_PIPELINE_FILE_SIZE: u64 = 10 * 1024 * 1024;

fn validate_file_size(path: &Path, max_size: u64) -> Result<(), AsrGotError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| AsrGotError::IoError(format!("Cannot read file metadata: {e}")))?;

    if metadata.len() > max_size {
        return Err(AsrGotError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve `path` to an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, AsrGotError> {
    let canonical = path.canonicalize().map_err(|e| {
        AsrGotError::IoError(format!("Invalid file path '{}': {e}", path.display()))
    })?;

    if !canonical.is_file() {
        return Err(AsrGotError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }
    Ok(canonical)
}

/// Resolve the parent of `path`, which must be an existing directory.
fn validate_output_path(path: &Path) -> Result<PathBuf, AsrGotError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        AsrGotError::IoError(format!("Invalid output directory '{}': {e}", parent.display()))
    })?;

    if !canonical_parent.is_dir() {
        return Err(AsrGotError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| AsrGotError::IoError("Output path has no filename".to_string()))?;
    Ok(canonical_parent.join(filename))
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Engine configuration from `path`, else `ASRGOT_CONFIG`, else defaults.
pub fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig, AsrGotError> {
    let from_env = std::env::var_os("ASRGOT_CONFIG").map(PathBuf::from);
    match path.map(Path::to_path_buf).or(from_env) {
        Some(p) => EngineConfig::load(&validate_file_path(&p)?),
        None => Ok(EngineConfig::default()),
    }
}

/// Read and parse a pipeline file.
pub fn load_pipeline(path: &Path) -> Result<Pipeline, AsrGotError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_PIPELINE_FILE_SIZE)?;
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| AsrGotError::IoError(format!("{}: {e}", path.display())))?;
    Pipeline::from_json(&raw)
}

fn replay(
    config: EngineConfig,
    file: &Path,
) -> Result<(ResearchSession, PipelineOutcome), AsrGotError> {
    let pipeline = load_pipeline(file)?;
    let mut session = ResearchSession::with_config(config);
    let outcome = run_pipeline(&mut session, &pipeline)?;
    Ok((session, outcome))
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP server over a fresh session.
pub async fn cmd_serve(config: EngineConfig, host: &str, port: u16) -> Result<(), AsrGotError> {
    println!("ASR-GoT Research Reasoning Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:           {host}");
    println!("  Port:           {port}");
    println!("  Max hypotheses: {}", config.max_hypotheses);
    println!();
    println!("Endpoints:");
    println!("  POST /initialize - Stage 1: root node");
    println!("  POST /decompose  - Stage 2: dimensions");
    println!("  POST /hypotheses - Stage 3: hypotheses");
    println!("  GET  /summary    - Graph summary");
    println!("  POST /export     - Export (json, yaml)");
    println!("  GET  /stage      - Stage status");
    println!("  GET  /parameters - Parameter catalog");
    println!("  GET  /hash       - BLAKE3 checksum");
    println!("  GET  /health     - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{host}:{port}");
    api::run_server(&addr, ResearchSession::with_config(config)).await
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Replay a pipeline and print every result.
pub fn cmd_run(config: EngineConfig, file: &Path, json_mode: bool) -> Result<(), AsrGotError> {
    let (session, outcome) = replay(config, file)?;

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&outcome).unwrap_or_default());
        return Ok(());
    }

    println!("ASR-GoT Pipeline Replay");
    println!("=======================");
    println!("File: {}", file.display());
    println!();
    for (position, result) in outcome.results.iter().enumerate() {
        let operation = result["operation"].as_str().unwrap_or("stage_report");
        let status = match result["success"].as_bool() {
            Some(false) => result["error"].as_str().unwrap_or("failed"),
            _ => "ok",
        };
        println!("  {:>2}. {:<20} {}", position + 1, operation, status);
    }
    println!();
    println!("Steps:    {}", outcome.results.len());
    println!("Failures: {}", outcome.failures);
    println!("Stage:    {}", session.stage());
    println!(
        "Graph:    {} nodes, {} edges",
        session.graph().node_count(),
        session.graph().edge_count()
    );

    Ok(())
}

// =============================================================================
// STAGES COMMAND
// =============================================================================

/// Show the stage table and the operation entering each stage.
pub fn cmd_stages(json_mode: bool) -> Result<(), AsrGotError> {
    use asrgot_core::system::{Stage, TRANSITIONS};

    let rows: Vec<_> = Stage::ALL
        .into_iter()
        .map(|stage| {
            let entered_by = TRANSITIONS.iter().find(|t| t.to == stage).map(|t| t.operation);
            (stage, entered_by)
        })
        .collect();

    if json_mode {
        let output: Vec<_> = rows
            .iter()
            .map(|(stage, op)| {
                serde_json::json!({
                    "index": stage.index(),
                    "name": stage.name(),
                    "entered_by": op.map(|o| o.name()),
                    "available": op.is_some_and(|o| o.is_implemented()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        return Ok(());
    }

    println!("ASR-GoT Stages");
    println!("==============");
    for (stage, op) in rows {
        let entry = match op {
            Some(o) if o.is_implemented() => o.name().to_string(),
            Some(o) => format!("{} (not available)", o.name()),
            None => "-".to_string(),
        };
        println!("  S{}  {:<22} {}", stage.index(), stage.name(), entry);
    }
    Ok(())
}

// =============================================================================
// PARAMETERS COMMAND
// =============================================================================

/// List the parameter catalog.
pub fn cmd_parameters(json_mode: bool) -> Result<(), AsrGotError> {
    let parameters = catalog();

    if json_mode {
        let output = serde_json::json!({
            "catalog_version": CATALOG_VERSION,
            "parameters": parameters,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        return Ok(());
    }

    println!("ASR-GoT Parameters (catalog {CATALOG_VERSION})");
    println!("==============================");
    for p in &parameters {
        println!("  {:<6} {:<34} [{}]", p.code, p.name, p.category);
    }
    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Replay a pipeline, then export the graph to a file or stdout.
pub fn cmd_export(
    config: EngineConfig,
    file: &Path,
    format: &str,
    output: Option<&Path>,
    json_mode: bool,
) -> Result<(), AsrGotError> {
    let (session, outcome) = replay(config, file)?;
    if outcome.failures > 0 {
        tracing::warn!(failures = outcome.failures, "Exporting after failed pipeline steps");
    }

    let result = session.export(format);
    let Some(data) = result.data() else {
        return Err(AsrGotError::SerializationError(
            result.error.clone().unwrap_or_else(|| "Export failed".to_string()),
        ));
    };

    let Some(output) = output else {
        print!("{}", data.content);
        return Ok(());
    };

    let target = validate_output_path(output)?;
    std::fs::write(&target, &data.content)
        .map_err(|e| AsrGotError::IoError(format!("{}: {e}", target.display())))?;

    if json_mode {
        let summary = serde_json::json!({
            "output": target.to_string_lossy(),
            "format": data.format,
            "bytes": data.content.len(),
            "checksum": data.checksum,
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
    } else {
        println!("Exported {} bytes to {}", data.content.len(), target.display());
        if let Some(checksum) = &data.checksum {
            println!("Checksum: {checksum}");
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::io::Write;

    const SCRIPT: &str = r#"{ "steps": [
        { "operation": "initialize", "task_description": "Investigate the role of skin microbiome in disease" },
        { "operation": "decompose" }
    ] }"#;

    fn script_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = load_pipeline(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(AsrGotError::IoError(_))));
    }

    #[test]
    fn pipeline_file_loads() {
        let file = script_file(SCRIPT);
        let pipeline = load_pipeline(file.path()).unwrap();
        assert_eq!(pipeline.steps.len(), 2);
    }

    #[test]
    fn export_writes_yaml_file() {
        let file = script_file(SCRIPT);
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("report.yaml");

        cmd_export(EngineConfig::default(), file.path(), "yaml", Some(target.as_path()), true).unwrap();

        let written = std::fs::read_to_string(&target).unwrap();
        assert!(written.contains("Investigate the role of skin microbiome in disease"));
    }

    #[test]
    fn export_rejects_unknown_format() {
        let file = script_file(SCRIPT);
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("report.xml");

        let result = cmd_export(EngineConfig::default(), file.path(), "xml", Some(target.as_path()), true);
        assert!(result.is_err());
        assert!(!target.exists());
    }

    #[test]
    fn explicit_config_path_is_loaded() {
        let file = script_file("max_hypotheses = 3\n");
        let config = load_engine_config(Some(file.path())).unwrap();
        assert_eq!(config.max_hypotheses, 3);
    }

    #[test]
    fn output_in_missing_directory_is_rejected() {
        let result = validate_output_path(Path::new("/definitely/not/here/out.json"));
        assert!(matches!(result, Err(AsrGotError::IoError(_))));
    }
}
