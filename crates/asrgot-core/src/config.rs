//! # Engine Configuration
//!
//! [`EngineConfig`] holds the overridable defaults of the engine and is read
//! from TOML:
//!
//! ```toml
//! default_disciplinary_tags = ["immunology", "dermatology"]
//! default_confidence = [0.8, 0.8, 0.8, 0.8]
//! dimension_confidence = [0.8, 0.8, 0.8, 0.8]
//! default_dimensions = ["Scope", "Objectives", "Potential Biases", "Knowledge Gaps"]
//! max_hypotheses = 5
//! ```
//!
//! [`SessionConfig`] and [`HypothesisConfig`] are the validated forms of the
//! per-call `config` objects accepted by `initialize` and `generate_hypotheses`.

use crate::confidence::ConfidenceVector;
use crate::primitives::{
    DEFAULT_DIMENSION_CONFIDENCE, DEFAULT_DIMENSIONS, DEFAULT_DISCIPLINARY_TAGS,
    DEFAULT_INITIAL_CONFIDENCE, MANDATORY_DIMENSIONS, MAX_HYPOTHESES,
};
use crate::{AsrGotError, ValidationError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine-wide defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Tags given to the root node when `initialize` supplies none.
    pub default_disciplinary_tags: Vec<String>,
    /// Root confidence when `initialize` supplies none.
    pub default_confidence: [f64; 4],
    /// Confidence of every dimension node.
    pub dimension_confidence: [f64; 4],
    /// Dimensions used by `decompose` without custom dimensions.
    pub default_dimensions: Vec<String>,
    /// Items processed per hypothesis batch (1..=5).
    pub max_hypotheses: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_disciplinary_tags: DEFAULT_DISCIPLINARY_TAGS
                .iter()
                .map(|t| (*t).to_string())
                .collect(),
            default_confidence: DEFAULT_INITIAL_CONFIDENCE,
            dimension_confidence: DEFAULT_DIMENSION_CONFIDENCE,
            default_dimensions: DEFAULT_DIMENSIONS.iter().map(|d| (*d).to_string()).collect(),
            max_hypotheses: MAX_HYPOTHESES,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, AsrGotError> {
        let config: Self =
            toml::from_str(raw).map_err(|e| AsrGotError::SerializationError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, AsrGotError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AsrGotError::IoError(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&raw)?;
        tracing::info!(path = %path.display(), "Loaded engine configuration");
        Ok(config)
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), AsrGotError> {
        if self.default_disciplinary_tags.is_empty()
            || self.default_disciplinary_tags.iter().any(|t| t.trim().is_empty())
        {
            return Err(ValidationError::new(
                "default_disciplinary_tags",
                format!("{:?}", self.default_disciplinary_tags),
                "a non-empty list of non-empty strings",
            )
            .with_examples(&["[\"immunology\"]", "[\"oncology\", \"genomics\"]"])
            .into());
        }

        ConfidenceVector::new(self.default_confidence).map_err(|_| {
            ValidationError::new(
                "default_confidence",
                format!("{:?}", self.default_confidence),
                "four numbers between 0 and 1",
            )
        })?;
        ConfidenceVector::new(self.dimension_confidence).map_err(|_| {
            ValidationError::new(
                "dimension_confidence",
                format!("{:?}", self.dimension_confidence),
                "four numbers between 0 and 1",
            )
        })?;

        let has_all_mandatory = MANDATORY_DIMENSIONS.iter().all(|m| {
            self.default_dimensions
                .iter()
                .any(|d| d.trim().eq_ignore_ascii_case(m))
        });
        if !has_all_mandatory || self.default_dimensions.iter().any(|d| d.trim().is_empty()) {
            return Err(ValidationError::new(
                "default_dimensions",
                format!("{:?}", self.default_dimensions),
                "non-empty names including \"Potential Biases\" and \"Knowledge Gaps\"",
            )
            .into());
        }

        if !(1..=MAX_HYPOTHESES).contains(&self.max_hypotheses) {
            return Err(ValidationError::new(
                "max_hypotheses",
                self.max_hypotheses.to_string(),
                format!("an integer between 1 and {MAX_HYPOTHESES}"),
            )
            .with_examples(&["3", "5"])
            .into());
        }

        Ok(())
    }
}

/// Validated `initialize` config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub disciplinary_tags: Vec<String>,
    pub attribution: Vec<String>,
    pub enable_multi_layer: bool,
}

impl SessionConfig {
    /// Defaults drawn from the engine configuration.
    #[must_use]
    pub fn from_engine(engine: &EngineConfig) -> Self {
        Self {
            disciplinary_tags: engine.default_disciplinary_tags.clone(),
            attribution: Vec::new(),
            enable_multi_layer: true,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_engine(&EngineConfig::default())
    }
}

/// Validated `generate_hypotheses` config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypothesisConfig {
    pub max_hypotheses: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str("max_hypotheses = 3\n").expect("parse");
        assert_eq!(config.max_hypotheses, 3);
        assert_eq!(config.default_dimensions.len(), 7);
        assert_eq!(config.default_confidence, [0.8; 4]);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(EngineConfig::from_toml_str("max_hypotheses = 9\n").is_err());
        assert!(EngineConfig::from_toml_str("default_confidence = [0.8, 0.8, 0.8, 1.8]\n").is_err());
        assert!(EngineConfig::from_toml_str("default_dimensions = [\"Scope\"]\n").is_err());
        assert!(EngineConfig::from_toml_str("unknown_key = 1\n").is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "default_disciplinary_tags = [\"oncology\"]").expect("write");
        let config = EngineConfig::load(file.path()).expect("load");
        assert_eq!(config.default_disciplinary_tags, vec!["oncology"]);

        let missing = EngineConfig::load(Path::new("/nonexistent/asrgot.toml"));
        assert!(matches!(missing, Err(AsrGotError::IoError(_))));
    }
}
