// crates/intake-core/tests/proptest_predicate.rs
// ============================================================================
// Module: Predicate Property-Based Tests
// Description: Property tests for predicate evaluation invariants.
// Purpose: Detect panics and operator-complement drift across wide inputs.
// ============================================================================

//! Property-based tests for predicate operator invariants.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use intake_core::AnswerDocument;
use intake_core::LeafComparison;
use intake_core::Path;
use intake_core::PredicateOperator;
use intake_core::ScalarValue;
use intake_core::runtime::evaluator::evaluate_leaf;
use proptest::prelude::*;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

fn comparison(operator: PredicateOperator, value: ScalarValue) -> LeafComparison {
    LeafComparison {
        question_path: Path::parse("answer.value").unwrap(),
        operator,
        value,
    }
}

fn evaluate(operator: PredicateOperator, value: ScalarValue, document: &AnswerDocument) -> bool {
    evaluate_leaf(&comparison(operator, value), document, &Path::root())
}

fn document_with(value: Option<&ScalarValue>) -> AnswerDocument {
    let mut document = AnswerDocument::new();
    if let Some(value) = value {
        document
            .write(&Path::parse("answer.value").unwrap(), value)
            .unwrap();
    }
    document
}

fn list(values: Vec<String>) -> ScalarValue {
    ScalarValue::TextList(values)
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    #[test]
    fn equals_and_not_equals_are_complements(
        answered in prop::option::of(any::<i64>()),
        constant in any::<i64>(),
    ) {
        let document = document_with(answered.map(ScalarValue::Long).as_ref());
        let equals = evaluate(PredicateOperator::Equals, ScalarValue::Long(constant), &document);
        let not_equals =
            evaluate(PredicateOperator::NotEquals, ScalarValue::Long(constant), &document);
        prop_assert_ne!(equals, not_equals);
        prop_assert_eq!(equals, answered == Some(constant));
    }

    #[test]
    fn ordering_matches_integer_ordering(answered in any::<i64>(), constant in any::<i64>()) {
        let document = document_with(Some(&ScalarValue::Long(answered)));
        let cases = [
            (PredicateOperator::GreaterThan, answered > constant),
            (PredicateOperator::GreaterThanOrEqual, answered >= constant),
            (PredicateOperator::LessThan, answered < constant),
            (PredicateOperator::LessThanOrEqual, answered <= constant),
        ];
        for (operator, expected) in cases {
            prop_assert_eq!(
                evaluate(operator, ScalarValue::Long(constant), &document),
                expected
            );
        }
    }

    #[test]
    fn membership_operators_are_complements(
        answered in prop::option::of("[a-z]{1,6}"),
        constant in prop::collection::vec("[a-z]{1,6}", 0 .. 5),
    ) {
        let document = document_with(answered.clone().map(ScalarValue::Text).as_ref());
        let member = evaluate(PredicateOperator::In, list(constant.clone()), &document);
        let not_member = evaluate(PredicateOperator::NotIn, list(constant.clone()), &document);
        prop_assert_ne!(member, not_member);
        let expected = answered.is_some_and(|value| constant.contains(&value));
        prop_assert_eq!(member, expected);
    }

    #[test]
    fn overlap_operators_are_complements(
        answered in prop::option::of(prop::collection::vec("[a-z]{1,6}", 0 .. 5)),
        constant in prop::collection::vec("[a-z]{1,6}", 0 .. 5),
    ) {
        let document = document_with(answered.clone().map(list).as_ref());
        let any_of = evaluate(PredicateOperator::AnyOf, list(constant.clone()), &document);
        let none_of = evaluate(PredicateOperator::NoneOf, list(constant.clone()), &document);
        prop_assert_ne!(any_of, none_of);
        let expected = answered
            .is_some_and(|values| values.iter().any(|value| constant.contains(value)));
        prop_assert_eq!(any_of, expected);
    }

    #[test]
    fn evaluation_never_panics_on_mismatched_shapes(
        stored in "[a-zA-Z0-9 ]{0,12}",
        constant in any::<i64>(),
    ) {
        let document = document_with(Some(&ScalarValue::Text(stored)));
        for operator in [
            PredicateOperator::Equals,
            PredicateOperator::NotEquals,
            PredicateOperator::GreaterThan,
            PredicateOperator::GreaterThanOrEqual,
            PredicateOperator::LessThan,
            PredicateOperator::LessThanOrEqual,
            PredicateOperator::AnyOf,
            PredicateOperator::NoneOf,
            PredicateOperator::In,
            PredicateOperator::NotIn,
        ] {
            let _ = evaluate(operator, ScalarValue::Long(constant), &document);
        }
    }
}
