//! # Engine Primitives
//!
//! Hardcoded limits, defaults and lookup tables of the reasoning engine.
//!
//! These values are compiled into the binary. `EngineConfig` may override the
//! defaults marked as such, but never the limits.

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Minimum trimmed length of a task description.
pub const MIN_TASK_DESCRIPTION_LENGTH: usize = 10;

/// Maximum trimmed length of a task description.
pub const MAX_TASK_DESCRIPTION_LENGTH: usize = 1000;

/// Minimum number of hypotheses in one batch.
pub const MIN_HYPOTHESES: usize = 3;

/// Maximum number of hypotheses in one batch.
///
/// Also the hard cap on how many items a batch processes, regardless of config.
pub const MAX_HYPOTHESES: usize = 5;

/// Maximum length of a hypothesis' content.
pub const MAX_HYPOTHESIS_CONTENT_LENGTH: usize = 2000;

/// Maximum rendered length of a rejected value inside an error message.
pub const MAX_RECEIVED_RENDER_LENGTH: usize = 100;

// =============================================================================
// DEFAULTS (overridable through EngineConfig)
// =============================================================================

/// Confidence given to the root node when the caller supplies none.
pub const DEFAULT_INITIAL_CONFIDENCE: [f64; 4] = [0.8; 4];

/// Confidence given to every dimension node.
pub const DEFAULT_DIMENSION_CONFIDENCE: [f64; 4] = [0.8; 4];

/// Discipline tags given to the root node when the config supplies none.
pub const DEFAULT_DISCIPLINARY_TAGS: [&str; 2] = ["immunology", "dermatology"];

/// Dimensions created by `decompose` when the caller supplies none.
pub const DEFAULT_DIMENSIONS: [&str; 7] = [
    "Scope",
    "Objectives",
    "Constraints",
    "Data Needs",
    "Use Cases",
    "Potential Biases",
    "Knowledge Gaps",
];

/// Dimensions that every decomposition must contain.
pub const MANDATORY_DIMENSIONS: [&str; 2] = ["Potential Biases", "Knowledge Gaps"];

// =============================================================================
// METADATA DEFAULTS
// =============================================================================

/// Neutral value used for missing or invalid scores.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Default edge weight.
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// Tag used when a dimension matches no discipline.
pub const GENERAL_DISCIPLINE: &str = "general";

/// Default plan attached to hypotheses that arrive without one.
pub const DEFAULT_PLAN_TYPE: &str = "literature_search";
pub const DEFAULT_PLAN_TOOLS: [&str; 2] = ["pubmed_search", "citation_analysis"];
pub const DEFAULT_PLAN_TIMELINE: &str = "2-4 weeks";

// =============================================================================
// LOOKUP TABLES
// =============================================================================

/// Dimension keyword to discipline tags.
///
/// Matched case-insensitively against the dimension name; all matching rows
/// contribute.
pub const DIMENSION_DISCIPLINES: [(&str, &[&str]); 7] = [
    ("scope", &["research_design"]),
    ("objective", &["research_design", "philosophy_of_science"]),
    ("constraint", &["methodology", "ethics"]),
    ("data", &["biostatistics", "data_science"]),
    ("use case", &["clinical_research", "translational_medicine"]),
    ("bias", &["epidemiology", "methodology"]),
    ("gap", &["systematic_review", "meta_research"]),
];

/// Content keyword to bias flag.
pub const BIAS_KEYWORDS: [(&str, &[&str]); 3] = [
    ("absolute_thinking", &["always", "never"]),
    ("confirmation_bias_risk", &["obvious", "clearly"]),
    ("overconfidence_bias", &["proven", "definitively"]),
];

/// Discipline tags for a dimension name, `["general"]` when nothing matches.
#[must_use]
pub fn disciplines_for_dimension(name: &str) -> Vec<String> {
    let lower = name.to_lowercase();
    let mut tags: Vec<String> = Vec::new();
    for (keyword, disciplines) in DIMENSION_DISCIPLINES {
        if lower.contains(keyword) {
            for discipline in disciplines {
                if !tags.iter().any(|t| t.as_str() == *discipline) {
                    tags.push((*discipline).to_string());
                }
            }
        }
    }
    if tags.is_empty() {
        tags.push(GENERAL_DISCIPLINE.to_string());
    }
    tags
}
