//! # Confidence Module
//!
//! Four-component confidence vectors and their distribution wrapping.
//!
//! - Components: empirical support, theoretical basis, methodological rigor,
//!   consensus alignment, each in `[0, 1]`
//! - Stored on nodes and edges as a [`ConfidenceDistribution`]
//! - `variances[i] == means[i] * (1 - means[i])`; the family tag, sample size
//!   and interval width are fixed

use crate::primitives::NEUTRAL_SCORE;
use crate::{AsrGotError, ValidationError, Warnings};
use serde::{Deserialize, Serialize};

/// Names of the four confidence components, in vector order.
pub const CONFIDENCE_COMPONENTS: [&str; 4] = [
    "empirical_support",
    "theoretical_basis",
    "methodological_rigor",
    "consensus_alignment",
];

/// Distribution family tag carried by every wrapped vector.
pub const DISTRIBUTION_FAMILY: &str = "beta";

/// Nominal sample size carried by every wrapped vector.
pub const SAMPLE_SIZE: u32 = 100;

/// Nominal confidence interval width carried by every wrapped vector.
pub const INTERVAL_WIDTH: f64 = 0.95;

/// A validated confidence vector.
///
/// Every component is finite and within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct ConfidenceVector([f64; 4]);

impl ConfidenceVector {
    /// All components at the neutral 0.5.
    pub const UNIFORM: ConfidenceVector = ConfidenceVector([NEUTRAL_SCORE; 4]);

    /// Create a vector, rejecting non-finite or out-of-range components.
    pub fn new(values: [f64; 4]) -> Result<Self, AsrGotError> {
        if let Some(i) = values.iter().position(|v| !is_unit(*v)) {
            return Err(ValidationError::new(
                format!("confidence[{i}]"),
                values[i].to_string(),
                "a number between 0 and 1 inclusive",
            )
            .with_examples(&["0.8", "0.5", "1.0"])
            .into());
        }
        Ok(Self(values))
    }

    /// The four component values.
    #[must_use]
    pub fn values(&self) -> [f64; 4] {
        self.0
    }

    /// Mean of the four components.
    #[must_use]
    pub fn average(&self) -> f64 {
        self.0.iter().sum::<f64>() / 4.0
    }
}

impl TryFrom<[f64; 4]> for ConfidenceVector {
    type Error = AsrGotError;

    fn try_from(values: [f64; 4]) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<ConfidenceVector> for [f64; 4] {
    fn from(v: ConfidenceVector) -> Self {
        v.0
    }
}

/// A confidence vector wrapped as a per-component distribution record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceDistribution {
    pub means: [f64; 4],
    pub variances: [f64; 4],
    pub distribution: String,
    pub sample_size: u32,
    pub confidence_interval: f64,
}

impl ConfidenceDistribution {
    /// Wrap an already validated vector.
    #[must_use]
    pub fn from_vector(vector: ConfidenceVector) -> Self {
        let means = vector.values();
        Self {
            means,
            variances: means.map(|m| m * (1.0 - m)),
            distribution: DISTRIBUTION_FAMILY.to_string(),
            sample_size: SAMPLE_SIZE,
            confidence_interval: INTERVAL_WIDTH,
        }
    }

    /// The uniform 0.5 distribution.
    #[must_use]
    pub fn uniform() -> Self {
        Self::from_vector(ConfidenceVector::UNIFORM)
    }

    /// Mean of the four component means.
    #[must_use]
    pub fn average(&self) -> f64 {
        self.means.iter().sum::<f64>() / 4.0
    }

    /// Check the record's internal consistency.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.means
            .iter()
            .zip(self.variances.iter())
            .all(|(m, v)| is_unit(*m) && (m * (1.0 - m) - v).abs() < 1e-12)
    }
}

impl Default for ConfidenceDistribution {
    fn default() -> Self {
        Self::uniform()
    }
}

/// Wrap raw means into a distribution record.
///
/// Entries that are non-finite or outside `[0, 1]` are clamped to 0.5, and a
/// slice of the wrong length is padded or truncated to four entries. Every
/// correction is recorded in `warnings`.
pub fn wrap_confidence(means: &[f64], warnings: &mut Warnings) -> ConfidenceDistribution {
    if means.len() != 4 {
        warnings.push(format!(
            "Confidence vector has {} components, expected 4; missing components set to {}",
            means.len(),
            NEUTRAL_SCORE
        ));
    }

    let mut clean = [NEUTRAL_SCORE; 4];
    for (i, slot) in clean.iter_mut().enumerate() {
        if let Some(&m) = means.get(i) {
            if is_unit(m) {
                *slot = m;
            } else {
                warnings.push(format!(
                    "Confidence component '{}' value {} is outside [0, 1]; using {}",
                    CONFIDENCE_COMPONENTS[i], m, NEUTRAL_SCORE
                ));
            }
        }
    }

    ConfidenceDistribution::from_vector(ConfidenceVector(clean))
}

fn is_unit(v: f64) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

// =============================================================================
// TESTS
// =============================================================================
