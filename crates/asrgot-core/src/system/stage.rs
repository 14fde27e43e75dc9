//! # Stage Controller
//!
//! A single cursor gates which graph operation may run next.
//!
//! ## Stage Definitions
//!
//! | Stage | Name | Entered by |
//! |-------|------|------------|
//! | S0 | Uninitialized | construction, reset |
//! | S1 | Initialization | `initialize` |
//! | S2 | Decomposition | `decompose` |
//! | S3 | Hypothesis/Planning | `generate_hypotheses` |
//! | S4 | Evidence Integration | (no operation) |
//! | S5 | Pruning/Merging | (no operation) |
//! | S6 | Subgraph Extraction | (no operation) |
//! | S7 | Composition | (no operation) |
//! | S8 | Reflection | (no operation) |
//!
//! The cursor advances by exactly one per successful operation and only moves
//! backwards through [`StageCursor::reset`]. The transition table is defined
//! once, in [`TRANSITIONS`].

use crate::AsrGotError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// STAGE ENUM
// =============================================================================

/// Pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// S0: nothing has run yet
    S0,
    /// S1: Initialization
    S1,
    /// S2: Decomposition
    S2,
    /// S3: Hypothesis/Planning
    S3,
    /// S4: Evidence Integration
    S4,
    /// S5: Pruning/Merging
    S5,
    /// S6: Subgraph Extraction
    S6,
    /// S7: Composition
    S7,
    /// S8: Reflection (all stages completed)
    S8,
}

impl Stage {
    /// Every stage in order.
    pub const ALL: [Stage; 9] = [
        Stage::S0,
        Stage::S1,
        Stage::S2,
        Stage::S3,
        Stage::S4,
        Stage::S5,
        Stage::S6,
        Stage::S7,
        Stage::S8,
    ];

    /// Get the stage name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Stage::S0 => "Uninitialized",
            Stage::S1 => "Initialization",
            Stage::S2 => "Decomposition",
            Stage::S3 => "Hypothesis/Planning",
            Stage::S4 => "Evidence Integration",
            Stage::S5 => "Pruning/Merging",
            Stage::S6 => "Subgraph Extraction",
            Stage::S7 => "Composition",
            Stage::S8 => "Reflection",
        }
    }

    /// Numeric cursor value (0..=8).
    #[must_use]
    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// Stage for a numeric cursor value.
    #[must_use]
    pub fn from_index(index: u8) -> Option<Stage> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Get the next stage, if any.
    #[must_use]
    pub fn next(&self) -> Option<Stage> {
        Stage::from_index(self.index().saturating_add(1))
    }

    /// Get the previous stage, if any.
    #[must_use]
    pub fn previous(&self) -> Option<Stage> {
        self.index().checked_sub(1).and_then(Stage::from_index)
    }

    /// Check if this stage is terminal (S8).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::S8)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self, self.name())
    }
}

// =============================================================================
// OPERATIONS & TRANSITION TABLE
// =============================================================================

/// Stage-advancing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Initialize,
    Decompose,
    GenerateHypotheses,
    IntegrateEvidence,
    PruneAndMerge,
    ExtractSubgraphs,
    Compose,
    Reflect,
}

impl Operation {
    /// Operation name as exposed to callers.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Initialize => "initialize",
            Operation::Decompose => "decompose",
            Operation::GenerateHypotheses => "generate_hypotheses",
            Operation::IntegrateEvidence => "integrate_evidence",
            Operation::PruneAndMerge => "prune_and_merge",
            Operation::ExtractSubgraphs => "extract_subgraphs",
            Operation::Compose => "compose",
            Operation::Reflect => "reflect",
        }
    }

    /// Whether the engine ships an implementation.
    #[must_use]
    pub fn is_implemented(&self) -> bool {
        matches!(
            self,
            Operation::Initialize | Operation::Decompose | Operation::GenerateHypotheses
        )
    }

    /// This operation's row in [`TRANSITIONS`].
    #[must_use]
    pub fn transition(&self) -> Transition {
        match self {
            Operation::Initialize => TRANSITIONS[0],
            Operation::Decompose => TRANSITIONS[1],
            Operation::GenerateHypotheses => TRANSITIONS[2],
            Operation::IntegrateEvidence => TRANSITIONS[3],
            Operation::PruneAndMerge => TRANSITIONS[4],
            Operation::ExtractSubgraphs => TRANSITIONS[5],
            Operation::Compose => TRANSITIONS[6],
            Operation::Reflect => TRANSITIONS[7],
        }
    }
}

/// One legal step of the stage machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub operation: Operation,
    pub from: Stage,
    pub to: Stage,
}

const fn step(operation: Operation, from: Stage, to: Stage) -> Transition {
    Transition {
        operation,
        from,
        to,
    }
}

/// The transition table.
pub const TRANSITIONS: [Transition; 8] = [
    step(Operation::Initialize, Stage::S0, Stage::S1),
    step(Operation::Decompose, Stage::S1, Stage::S2),
    step(Operation::GenerateHypotheses, Stage::S2, Stage::S3),
    step(Operation::IntegrateEvidence, Stage::S3, Stage::S4),
    step(Operation::PruneAndMerge, Stage::S4, Stage::S5),
    step(Operation::ExtractSubgraphs, Stage::S5, Stage::S6),
    step(Operation::Compose, Stage::S6, Stage::S7),
    step(Operation::Reflect, Stage::S7, Stage::S8),
];

// =============================================================================
// STAGE CURSOR
// =============================================================================

/// A recorded stage transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransition {
    pub operation: Operation,
    pub from: Stage,
    pub to: Stage,
    pub timestamp: DateTime<Utc>,
}

/// Status line for one stage in a progress table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStatus {
    pub index: u8,
    pub name: String,
    pub completed: bool,
    pub current: bool,
}

/// The stage cursor plus its transition trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCursor {
    current: Stage,
    trace: Vec<StageTransition>,
}

impl Default for StageCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl StageCursor {
    /// Create a cursor at S0 with an empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: Stage::S0,
            trace: Vec::new(),
        }
    }

    /// The current stage.
    #[must_use]
    pub fn current(&self) -> Stage {
        self.current
    }

    /// Every transition taken since the last reset.
    #[must_use]
    pub fn trace(&self) -> &[StageTransition] {
        &self.trace
    }

    /// Check that `operation` may run now and return its transition.
    ///
    /// Never mutates the cursor.
    pub fn check(&self, operation: Operation) -> Result<Transition, AsrGotError> {
        let transition = operation.transition();
        if self.current != transition.from {
            return Err(AsrGotError::WrongStage {
                operation: operation.name(),
                current: self.current,
                expected: transition.from,
            });
        }
        Ok(transition)
    }

    /// Apply a checked transition.
    ///
    /// Fails with `Internal` if the cursor moved since the check.
    pub fn advance(&mut self, transition: Transition) -> Result<(), AsrGotError> {
        if self.current != transition.from {
            return Err(AsrGotError::Internal(format!(
                "stage cursor at {} cannot apply {} -> {}",
                self.current, transition.from, transition.to
            )));
        }
        self.current = transition.to;
        self.trace.push(StageTransition {
            operation: transition.operation,
            from: transition.from,
            to: transition.to,
            timestamp: Utc::now(),
        });
        tracing::info!(
            operation = transition.operation.name(),
            from = transition.from.index(),
            to = transition.to.index(),
            "Stage advanced to {}",
            transition.to
        );
        Ok(())
    }

    /// Return to S0 and forget the trace.
    pub fn reset(&mut self) {
        self.current = Stage::S0;
        self.trace.clear();
    }

    /// The 9-stage table with completed/current flags.
    #[must_use]
    pub fn progress(&self) -> Vec<StageStatus> {
        Stage::ALL
            .iter()
            .map(|stage| StageStatus {
                index: stage.index(),
                name: stage.name().to_string(),
                completed: *stage != Stage::S0 && *stage <= self.current,
                current: *stage == self.current,
            })
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_ordering() {
        assert!(Stage::S0 < Stage::S1);
        assert!(Stage::S3 < Stage::S4);
        assert!(Stage::S7 < Stage::S8);
    }

    #[test]
    fn stage_navigation() {
        assert_eq!(Stage::S0.previous(), None);
        assert_eq!(Stage::S0.next(), Some(Stage::S1));
        assert_eq!(Stage::S8.next(), None);
        assert!(Stage::S8.is_terminal());
        assert_eq!(Stage::from_index(3), Some(Stage::S3));
        assert_eq!(Stage::from_index(9), None);
    }

    #[test]
    fn stage_display() {
        assert_eq!(format!("{}", Stage::S0), "S0: Uninitialized");
        assert_eq!(format!("{}", Stage::S3), "S3: Hypothesis/Planning");
    }

    #[test]
    fn transition_table_steps_by_one() {
        for (i, t) in TRANSITIONS.iter().enumerate() {
            assert_eq!(t.from.index() as usize, i);
            assert_eq!(t.to.index(), t.from.index() + 1);
            assert_eq!(t.operation.transition(), *t);
        }
    }

    #[test]
    fn check_rejects_out_of_order() {
        let cursor = StageCursor::new();
        let err = cursor
            .check(Operation::Decompose)
            .expect_err("decompose at S0");
        assert!(matches!(
            err,
            AsrGotError::WrongStage {
                current: Stage::S0,
                expected: Stage::S1,
                ..
            }
        ));
        assert_eq!(cursor.current(), Stage::S0);
    }

    #[test]
    fn advance_records_trace() {
        let mut cursor = StageCursor::new();
        let t = cursor.check(Operation::Initialize).expect("check");
        cursor.advance(t).expect("advance");
        assert_eq!(cursor.current(), Stage::S1);
        assert_eq!(cursor.trace().len(), 1);
        assert_eq!(cursor.trace()[0].operation, Operation::Initialize);

        // Stale transition
        assert!(cursor.advance(t).is_err());
        assert_eq!(cursor.current(), Stage::S1);
    }

    #[test]
    fn progress_flags() {
        let mut cursor = StageCursor::new();
        for op in [Operation::Initialize, Operation::Decompose] {
            let t = cursor.check(op).expect("check");
            cursor.advance(t).expect("advance");
        }
        let table = cursor.progress();
        assert_eq!(table.len(), 9);
        assert!(table[1].completed && table[2].completed);
        assert!(table[2].current);
        assert!(!table[3].completed);
        assert!(!table[0].completed);

        cursor.reset();
        assert_eq!(cursor.current(), Stage::S0);
        assert!(cursor.trace().is_empty());
    }
}
