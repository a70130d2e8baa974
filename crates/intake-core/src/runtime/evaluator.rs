// crates/intake-core/src/runtime/evaluator.rs
// ============================================================================
// Module: Intake Predicate Evaluator
// Description: Leaf comparison evaluation against the answer document.
// Purpose: Convert authored predicates into show/hide decisions.
// Dependencies: crate::core::{document, path, predicate, value}
// ============================================================================

//! ## Overview
//! The evaluator interprets a block's visibility predicate against a locked
//! answer document, contextualized to the block's entity path so that a
//! predicate inside a repeated block reads the correct entity instance.
//!
//! Absence policy: an unanswered question fails every positive comparison
//! and satisfies every negative one (`NotEquals`, `NoneOf`, `NotIn`). A
//! stored value that cannot be coerced to the comparison type is treated as
//! unanswered rather than an error, so a corrupted scalar never aborts
//! resolution.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;

use crate::core::document::AnswerDocument;
use crate::core::path::Path;
use crate::core::predicate::LeafComparison;
use crate::core::predicate::PredicateAction;
use crate::core::predicate::PredicateOperator;
use crate::core::predicate::VisibilityPredicate;
use crate::core::value::ScalarType;
use crate::core::value::ScalarValue;

// ============================================================================
// SECTION: Visibility
// ============================================================================

/// Decides whether a block with the given predicate is visible.
///
/// A block with no predicate is always visible.
#[must_use]
pub fn is_visible(
    predicate: Option<&VisibilityPredicate>,
    document: &AnswerDocument,
    context: &Path,
) -> bool {
    let Some(predicate) = predicate else {
        return true;
    };
    let holds = evaluate_leaf(&predicate.comparison, document, context);
    match predicate.action {
        PredicateAction::ShowBlock => holds,
        PredicateAction::HideBlock => !holds,
    }
}

/// Evaluates one leaf comparison against the document at `context`.
#[must_use]
pub fn evaluate_leaf(leaf: &LeafComparison, document: &AnswerDocument, context: &Path) -> bool {
    let path = context.append(&leaf.question_path);
    match leaf.operator {
        PredicateOperator::Equals
        | PredicateOperator::NotEquals
        | PredicateOperator::GreaterThan
        | PredicateOperator::GreaterThanOrEqual
        | PredicateOperator::LessThan
        | PredicateOperator::LessThanOrEqual => evaluate_scalar(leaf, document, &path),
        PredicateOperator::AnyOf | PredicateOperator::NoneOf => {
            evaluate_list_overlap(leaf, document, &path)
        }
        PredicateOperator::In | PredicateOperator::NotIn => {
            evaluate_membership(leaf, document, &path)
        }
    }
}

// ============================================================================
// SECTION: Scalar Comparisons
// ============================================================================

/// Evaluates equality and ordering operators over typed scalars.
fn evaluate_scalar(leaf: &LeafComparison, document: &AnswerDocument, path: &Path) -> bool {
    let expected = constant_scalar_type(&leaf.value);
    let Some(answer) = read_or_absent(document, path, expected) else {
        return leaf.operator.satisfied_by_absence();
    };
    match leaf.operator {
        PredicateOperator::Equals => answer == leaf.value,
        PredicateOperator::NotEquals => answer != leaf.value,
        PredicateOperator::GreaterThan
        | PredicateOperator::GreaterThanOrEqual
        | PredicateOperator::LessThan
        | PredicateOperator::LessThanOrEqual => answer
            .partial_cmp_same(&leaf.value)
            .is_some_and(|ordering| ordering_matches(leaf.operator, ordering)),
        PredicateOperator::AnyOf
        | PredicateOperator::NoneOf
        | PredicateOperator::In
        | PredicateOperator::NotIn => false,
    }
}

/// Maps an ordering operator onto a computed ordering.
const fn ordering_matches(operator: PredicateOperator, ordering: Ordering) -> bool {
    match operator {
        PredicateOperator::GreaterThan => ordering.is_gt(),
        PredicateOperator::GreaterThanOrEqual => ordering.is_ge(),
        PredicateOperator::LessThan => ordering.is_lt(),
        PredicateOperator::LessThanOrEqual => ordering.is_le(),
        _ => false,
    }
}

// ============================================================================
// SECTION: List Comparisons
// ============================================================================

/// Evaluates `AnyOf`/`NoneOf`: overlap between an answered list and the
/// constant list, with whitespace trimmed on both sides.
fn evaluate_list_overlap(leaf: &LeafComparison, document: &AnswerDocument, path: &Path) -> bool {
    let ScalarValue::TextList(constant) = &leaf.value else {
        return leaf.operator.satisfied_by_absence();
    };
    let Some(ScalarValue::TextList(answered)) =
        read_or_absent(document, path, ScalarType::Selections)
    else {
        return leaf.operator.satisfied_by_absence();
    };
    let overlap = answered.iter().any(|item| {
        constant
            .iter()
            .any(|candidate| candidate.trim() == item.trim())
    });
    match leaf.operator {
        PredicateOperator::AnyOf => overlap,
        PredicateOperator::NoneOf => !overlap,
        _ => false,
    }
}

/// Evaluates `In`/`NotIn`: membership of a scalar answer in the constant
/// list, compared by trimmed rendered strings.
fn evaluate_membership(leaf: &LeafComparison, document: &AnswerDocument, path: &Path) -> bool {
    let ScalarValue::TextList(constant) = &leaf.value else {
        return leaf.operator.satisfied_by_absence();
    };
    let Some(rendered) = document.read_display(path) else {
        return leaf.operator.satisfied_by_absence();
    };
    let member = constant
        .iter()
        .any(|candidate| candidate.trim() == rendered.trim());
    match leaf.operator {
        PredicateOperator::In => member,
        PredicateOperator::NotIn => !member,
        _ => false,
    }
}

// ============================================================================
// SECTION: Reads
// ============================================================================

/// Reads an answer for comparison; a type mismatch counts as absent.
fn read_or_absent(
    document: &AnswerDocument,
    path: &Path,
    expected: ScalarType,
) -> Option<ScalarValue> {
    document.read(path, expected).ok().flatten()
}

/// Declared read type implied by the authored constant.
const fn constant_scalar_type(constant: &ScalarValue) -> ScalarType {
    match constant {
        ScalarValue::Text(_) => ScalarType::Text,
        ScalarValue::Long(_) => ScalarType::Long,
        ScalarValue::Date(_) => ScalarType::Date,
        ScalarValue::TextList(_) => ScalarType::Selections,
    }
}
