//! # Validation Module
//!
//! Checks and normalizes every externally supplied value before it can reach
//! the graph.
//!
//! - Strict checks return `Err(AsrGotError::InvalidParameter)` naming the
//!   field, what was received, what was expected and up to three examples
//! - Lenient checks (config keys, tag lists) never fail the call: each field
//!   is checked on its own and [`or_default`] applies the fallback, recording
//!   a warning
//! - Validation never touches graph state

use crate::config::{EngineConfig, HypothesisConfig, SessionConfig};
use crate::confidence::ConfidenceVector;
use crate::export::ExportFormat;
use crate::metadata::ResearchPlan;
use crate::primitives::{
    MANDATORY_DIMENSIONS, MAX_HYPOTHESES, MAX_HYPOTHESIS_CONTENT_LENGTH,
    MAX_RECEIVED_RENDER_LENGTH, MAX_TASK_DESCRIPTION_LENGTH, MIN_HYPOTHESES,
    MIN_TASK_DESCRIPTION_LENGTH,
};
use crate::types::parse_dimension_index;
use crate::{AsrGotError, NodeId, ValidationError, Warnings};
use serde_json::{Map, Value};

/// A hypothesis item after validation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HypothesisSpec {
    pub content: String,
    pub confidence: Option<ConfidenceVector>,
    pub falsification_criteria: Option<String>,
    pub plan: Option<ResearchPlan>,
    pub impact_score: Option<f64>,
    pub disciplinary_tags: Option<Vec<String>>,
    pub attribution: Option<Vec<String>>,
    /// Keys the item carried beyond the known ones.
    pub extras: Map<String, Value>,
}

/// Input validation entry points.
pub struct Validator;

impl Validator {
    /// Validate a 4-component confidence vector.
    ///
    /// Elements may be numbers or numeric strings; any bad element fails the
    /// whole vector.
    pub fn confidence(field: &str, value: &Value) -> Result<ConfidenceVector, AsrGotError> {
        let reject = || {
            ValidationError::new(field, describe(value), "an array of 4 numbers between 0 and 1")
                .with_examples(&["[0.8, 0.8, 0.8, 0.8]", "[0.8, 0.7, 0.9, 0.6]", "[0.5, 0.5, 0.5, 0.5]"])
        };

        let Value::Array(items) = value else {
            return Err(reject().into());
        };
        if items.len() != 4 {
            return Err(reject().into());
        }

        let mut values = [0.0; 4];
        for (slot, item) in values.iter_mut().zip(items) {
            match coerce_number(item) {
                Some(n) if (0.0..=1.0).contains(&n) => *slot = n,
                _ => return Err(reject().into()),
            }
        }
        ConfidenceVector::new(values)
    }

    /// Validate a task description and return it trimmed.
    pub fn task_description(value: &Value) -> Result<String, AsrGotError> {
        let expected = format!(
            "a string of {MIN_TASK_DESCRIPTION_LENGTH} to {MAX_TASK_DESCRIPTION_LENGTH} characters"
        );
        let examples = [
            "Investigate the role of skin microbiome in disease",
            "Assess biomarkers for early sepsis detection",
        ];

        let Some(raw) = value.as_str() else {
            return Err(ValidationError::new("task_description", describe(value), expected)
                .with_examples(&examples)
                .into());
        };
        let trimmed = raw.trim();
        let length = trimmed.chars().count();
        if !(MIN_TASK_DESCRIPTION_LENGTH..=MAX_TASK_DESCRIPTION_LENGTH).contains(&length) {
            return Err(ValidationError::new(
                "task_description",
                format!("{} ({length} characters)", describe(value)),
                expected,
            )
            .with_examples(&examples)
            .into());
        }
        Ok(trimmed.to_string())
    }

    /// Validate the shape of a dimension node id (`2.<k>`).
    ///
    /// Existence is checked against the graph by the caller.
    pub fn dimension_node_id(value: &Value) -> Result<NodeId, AsrGotError> {
        value
            .as_str()
            .map(str::trim)
            .filter(|raw| parse_dimension_index(raw).is_some())
            .map(NodeId::from)
            .ok_or_else(|| {
                ValidationError::new(
                    "dimension_node_id",
                    describe(value),
                    "a dimension node id of the form 2.<positive integer>",
                )
                .with_examples(&["2.1", "2.6", "2.7"])
                .into()
            })
    }

    /// Validate the hypotheses collection length.
    pub fn hypotheses_collection(value: &Value) -> Result<&[Value], AsrGotError> {
        match value {
            Value::Array(items) if (MIN_HYPOTHESES..=MAX_HYPOTHESES).contains(&items.len()) => {
                Ok(items)
            }
            _ => Err(ValidationError::new(
                "hypotheses",
                match value {
                    Value::Array(items) => format!("an array of {} items", items.len()),
                    other => describe(other),
                },
                format!("an array of {MIN_HYPOTHESES} to {MAX_HYPOTHESES} hypotheses"),
            )
            .with_examples(&[
                "[\"H1 text\", \"H2 text\", \"H3 text\"]",
                "[{\"content\": \"H1 text\", \"falsification_criteria\": \"...\"}, ...]",
            ])
            .into()),
        }
    }

    /// Validate one hypothesis item.
    ///
    /// `position` is 1-based and only used in messages. Missing plan or
    /// falsification criteria are reported as warnings, not failures.
    pub fn hypothesis_item(
        position: usize,
        value: &Value,
        warnings: &mut Warnings,
    ) -> Result<HypothesisSpec, AsrGotError> {
        let field = |name: &str| format!("hypotheses[{}].{name}", position.saturating_sub(1));

        let spec = match value {
            Value::String(text) => HypothesisSpec {
                content: Self::hypothesis_content(&field("content"), value, text)?,
                ..HypothesisSpec::default()
            },
            Value::Object(object) => {
                let content = match object.get("content") {
                    Some(v @ Value::String(text)) => {
                        Self::hypothesis_content(&field("content"), v, text)?
                    }
                    Some(other) => {
                        return Err(ValidationError::new(
                            field("content"),
                            describe(other),
                            "a non-empty string",
                        )
                        .into());
                    }
                    None => {
                        return Err(ValidationError::new(
                            field("content"),
                            "nothing",
                            "a non-empty string",
                        )
                        .into());
                    }
                };
                let mut spec = HypothesisSpec {
                    content,
                    ..HypothesisSpec::default()
                };

                for (key, v) in object {
                    if v.is_null() {
                        continue;
                    }
                    match key.as_str() {
                        "content" => {}
                        "confidence" => {
                            spec.confidence = Some(Self::confidence(&field("confidence"), v)?);
                        }
                        "falsification_criteria" => match v.as_str().map(str::trim) {
                            Some(text) if !text.is_empty() => {
                                spec.falsification_criteria = Some(text.to_string());
                            }
                            _ => {
                                return Err(ValidationError::new(
                                    field("falsification_criteria"),
                                    describe(v),
                                    "a non-empty string",
                                )
                                .into());
                            }
                        },
                        "plan" => spec.plan = Some(Self::plan(&field("plan"), v)?),
                        "impact_score" => match coerce_number(v) {
                            Some(n) if (0.0..=1.0).contains(&n) => spec.impact_score = Some(n),
                            _ => {
                                return Err(ValidationError::new(
                                    field("impact_score"),
                                    describe(v),
                                    "a number between 0 and 1",
                                )
                                .with_examples(&["0.5", "0.8"])
                                .into());
                            }
                        },
                        "disciplinary_tags" => {
                            spec.disciplinary_tags = Some(or_default(
                                check_string_list(&field("disciplinary_tags"), v, warnings),
                                Vec::new(),
                                warnings,
                            ));
                        }
                        "attribution" => {
                            spec.attribution = Some(or_default(
                                check_string_list(&field("attribution"), v, warnings),
                                Vec::new(),
                                warnings,
                            ));
                        }
                        _ => {
                            spec.extras.insert(key.clone(), v.clone());
                        }
                    }
                }
                spec
            }
            other => {
                return Err(ValidationError::new(
                    format!("hypotheses[{}]", position.saturating_sub(1)),
                    describe(other),
                    "a string or an object with a 'content' string",
                )
                .with_examples(&["\"H1 text\"", "{\"content\": \"H1 text\"}"])
                .into());
            }
        };

        if spec.plan.is_none() {
            warnings.push(format!(
                "Hypothesis {position}: no plan supplied; attaching a default literature_search plan"
            ));
        }
        if spec.falsification_criteria.is_none() {
            warnings.push(format!(
                "Hypothesis {position}: no falsification criteria supplied"
            ));
        }
        Ok(spec)
    }

    fn hypothesis_content(field: &str, value: &Value, text: &str) -> Result<String, AsrGotError> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.chars().count() > MAX_HYPOTHESIS_CONTENT_LENGTH {
            return Err(ValidationError::new(
                field,
                describe(value),
                format!("a non-empty string of at most {MAX_HYPOTHESIS_CONTENT_LENGTH} characters"),
            )
            .into());
        }
        Ok(trimmed.to_string())
    }

    fn plan(field: &str, value: &Value) -> Result<ResearchPlan, AsrGotError> {
        let reject = || {
            ValidationError::new(field, describe(value), "an object with a string 'type'")
                .with_examples(&[
                    "{\"type\": \"literature_search\"}",
                    "{\"type\": \"experiment\", \"timeline\": \"6 months\"}",
                ])
        };
        let has_type = value
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|t| !t.trim().is_empty());
        if !value.is_object() || !has_type {
            return Err(reject().into());
        }
        serde_json::from_value(value.clone()).map_err(|_| reject().into())
    }

    /// Validate an export format name (case-insensitive).
    pub fn export_format(value: &str) -> Result<ExportFormat, AsrGotError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "yaml" => Ok(ExportFormat::Yaml),
            _ => Err(ValidationError::new(
                "format",
                describe(&Value::String(value.to_string())),
                "one of: json, yaml",
            )
            .with_examples(&["json", "yaml"])
            .into()),
        }
    }

    /// Validate the `initialize` config object.
    ///
    /// `None` means the caller sent nothing and yields the defaults. Any
    /// present value other than an object is rejected. Recognised keys fall
    /// back to their defaults when malformed; unknown keys are ignored.
    pub fn session_config(
        value: Option<&Value>,
        engine: &EngineConfig,
        warnings: &mut Warnings,
    ) -> Result<SessionConfig, AsrGotError> {
        let defaults = SessionConfig::from_engine(engine);
        let Some(object) = Self::config_object(value)? else {
            return Ok(defaults);
        };

        let disciplinary_tags = match object.get("disciplinary_tags") {
            None => defaults.disciplinary_tags,
            Some(v) => {
                let tags = or_default(
                    check_string_list("config.disciplinary_tags", v, warnings),
                    Vec::new(),
                    warnings,
                );
                if tags.is_empty() {
                    warnings.push("config.disciplinary_tags is empty; using default tags");
                    defaults.disciplinary_tags
                } else {
                    tags
                }
            }
        };

        let attribution = match object.get("attribution") {
            None => defaults.attribution,
            Some(v) => or_default(
                check_string_list("config.attribution", v, warnings),
                defaults.attribution,
                warnings,
            ),
        };

        let enable_multi_layer = match object.get("enable_multi_layer") {
            None => defaults.enable_multi_layer,
            Some(v) => or_default(
                check_flag("config.enable_multi_layer", v),
                defaults.enable_multi_layer,
                warnings,
            ),
        };

        Ok(SessionConfig {
            disciplinary_tags,
            attribution,
            enable_multi_layer,
        })
    }

    /// Validate the `generate_hypotheses` config object.
    pub fn hypothesis_config(
        value: Option<&Value>,
        engine: &EngineConfig,
        warnings: &mut Warnings,
    ) -> Result<HypothesisConfig, AsrGotError> {
        let default = engine.max_hypotheses.min(MAX_HYPOTHESES);
        let Some(object) = Self::config_object(value)? else {
            return Ok(HypothesisConfig {
                max_hypotheses: default,
            });
        };

        let max_hypotheses = match object.get("max_hypotheses") {
            None => default,
            Some(v) => {
                let checked = match v.as_f64() {
                    Some(n) if n >= 1.0 && n.fract() == 0.0 => {
                        Ok((n.min(MAX_HYPOTHESES as f64)) as usize)
                    }
                    _ => Err(ValidationError::new(
                        "config.max_hypotheses",
                        describe(v),
                        "a positive integer",
                    )),
                };
                or_default(checked, default, warnings)
            }
        };

        Ok(HypothesisConfig { max_hypotheses })
    }

    /// Validate custom dimensions for `decompose`.
    ///
    /// Returns `None` when the caller supplied nothing. Bad and duplicate
    /// entries are dropped, missing mandatory dimensions are appended, and an
    /// empty result is rejected.
    pub fn custom_dimensions(
        value: Option<&Value>,
        warnings: &mut Warnings,
    ) -> Result<Option<Vec<String>>, AsrGotError> {
        let items = match value {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(ValidationError::new(
                    "custom_dimensions",
                    describe(other),
                    "an array of dimension names",
                )
                .with_examples(&["[\"Scope\", \"Mechanisms\"]"])
                .into());
            }
        };

        let mut dimensions: Vec<String> = Vec::new();
        for (i, item) in items.iter().enumerate() {
            let name = item.as_str().map(str::trim).filter(|n| !n.is_empty());
            match name {
                None => warnings.push(format!(
                    "custom_dimensions[{i}] is not a non-empty string; dropped"
                )),
                Some(name)
                    if dimensions.iter().any(|d| d.eq_ignore_ascii_case(name)) =>
                {
                    warnings.push(format!("Duplicate dimension '{name}' dropped"));
                }
                Some(name) => dimensions.push(name.to_string()),
            }
        }

        if dimensions.is_empty() {
            return Err(ValidationError::new(
                "custom_dimensions",
                describe(value.unwrap_or(&Value::Null)),
                "at least one non-empty dimension name",
            )
            .with_examples(&["[\"Scope\", \"Mechanisms\"]"])
            .into());
        }

        for mandatory in MANDATORY_DIMENSIONS {
            if !dimensions.iter().any(|d| d.eq_ignore_ascii_case(mandatory)) {
                warnings.push(format!("Mandatory dimension '{mandatory}' appended"));
                dimensions.push(mandatory.to_string());
            }
        }

        Ok(Some(dimensions))
    }

    fn config_object(value: Option<&Value>) -> Result<Option<&Map<String, Value>>, AsrGotError> {
        match value {
            None => Ok(None),
            Some(Value::Object(object)) => Ok(Some(object)),
            Some(other) => Err(ValidationError::new("config", describe(other), "a plain object")
                .with_examples(&["{}", "{\"enable_multi_layer\": false}"])
                .into()),
        }
    }
}

// =============================================================================
// FIELD HELPERS
// =============================================================================

/// Keep a checked value, or log why it failed and use `default`.
pub fn or_default<T>(
    checked: Result<T, ValidationError>,
    default: T,
    warnings: &mut Warnings,
) -> T {
    match checked {
        Ok(value) => value,
        Err(e) => {
            warnings.push(format!("{e}; using default"));
            default
        }
    }
}

/// An array of strings; non-string or blank entries are dropped with a warning.
fn check_string_list(
    field: &str,
    value: &Value,
    warnings: &mut Warnings,
) -> Result<Vec<String>, ValidationError> {
    let Value::Array(items) = value else {
        return Err(ValidationError::new(field, describe(value), "an array of strings"));
    };

    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item.as_str().map(str::trim) {
            Some(s) if !s.is_empty() => out.push(s.to_string()),
            _ => warnings.push(format!(
                "{field}[{i}] = {} is not a non-empty string; dropped",
                describe(item)
            )),
        }
    }
    Ok(out)
}

fn check_flag(field: &str, value: &Value) -> Result<bool, ValidationError> {
    value
        .as_bool()
        .ok_or_else(|| ValidationError::new(field, describe(value), "a boolean"))
}

/// A number, or a string that parses as a finite number.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Compact rendering of a received value for error messages.
fn describe(value: &Value) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() <= MAX_RECEIVED_RENDER_LENGTH {
        rendered
    } else {
        let head: String = rendered.chars().take(MAX_RECEIVED_RENDER_LENGTH).collect();
        format!("{head}...")
    }
}

// =============================================================================
// TESTS
// =============================================================================
