// crates/intake-core/src/core/predicate.rs
// ============================================================================
// Module: Intake Visibility Predicates
// Description: Authored show/hide conditions attached to block definitions.
// Purpose: Describe a single leaf comparison between a question's answer and
//          a constant, paired with the action it drives.
// Dependencies: crate::core::{path, value}, serde
// ============================================================================

//! ## Overview
//! A visibility predicate is an expression tree with one supported shape:
//! a single leaf comparing a question's scalar answer to an authored
//! constant. The paired action decides what a `true` outcome means for the
//! block the predicate is attached to. Evaluation lives in
//! [`crate::runtime::evaluator`]; this module is the authored, read-only
//! data model.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::path::Path;
use crate::core::value::ScalarValue;

// ============================================================================
// SECTION: Predicate Model
// ============================================================================

/// Action applied when a predicate evaluates to `true`.
///
/// # Invariants
/// - Variants are stable for serialization and schema matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateAction {
    /// The block is visible iff the predicate is true.
    ShowBlock,
    /// The block is hidden iff the predicate is true.
    HideBlock,
}

/// Comparison operator for a leaf predicate.
///
/// # Invariants
/// - Variants are stable for serialization and schema matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateOperator {
    /// Answer equals the constant.
    Equals,
    /// Answer differs from the constant.
    NotEquals,
    /// Answer orders strictly above the constant.
    GreaterThan,
    /// Answer orders at or above the constant.
    GreaterThanOrEqual,
    /// Answer orders strictly below the constant.
    LessThan,
    /// Answer orders at or below the constant.
    LessThanOrEqual,
    /// Any of the answered list members appears in the constant list.
    AnyOf,
    /// No answered list member appears in the constant list.
    NoneOf,
    /// The scalar answer appears in the constant list.
    In,
    /// The scalar answer does not appear in the constant list.
    NotIn,
}

impl PredicateOperator {
    /// Returns true for the operators that an unanswered question satisfies.
    ///
    /// This is the engine's absence policy: absence fails every positive
    /// comparison and satisfies every negative one.
    #[must_use]
    pub const fn satisfied_by_absence(self) -> bool {
        matches!(self, Self::NotEquals | Self::NoneOf | Self::NotIn)
    }
}

/// Leaf comparison between one question scalar and a constant.
///
/// # Invariants
/// - `question_path` is relative to the concrete block's entity context and
///   includes the scalar segment (for example `favorite_color.text`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafComparison {
    /// Context-relative path of the compared scalar.
    pub question_path: Path,
    /// Comparison operator.
    pub operator: PredicateOperator,
    /// Authored constant on the right-hand side.
    pub value: ScalarValue,
}

/// Visibility predicate attached to a block definition.
///
/// # Invariants
/// - Authored once; read-only for this engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityPredicate {
    /// Action driven by the comparison outcome.
    pub action: PredicateAction,
    /// The single supported leaf comparison.
    pub comparison: LeafComparison,
}

impl VisibilityPredicate {
    /// Creates a show-block predicate from a leaf comparison.
    #[must_use]
    pub const fn show_when(comparison: LeafComparison) -> Self {
        Self {
            action: PredicateAction::ShowBlock,
            comparison,
        }
    }

    /// Creates a hide-block predicate from a leaf comparison.
    #[must_use]
    pub const fn hide_when(comparison: LeafComparison) -> Self {
        Self {
            action: PredicateAction::HideBlock,
            comparison,
        }
    }
}
