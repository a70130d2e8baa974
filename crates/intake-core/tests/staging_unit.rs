// crates/intake-core/tests/staging_unit.rs
// ============================================================================
// Module: Update Staging Unit Tests
// Description: Validate transactional staging of proposed answer updates.
// Purpose: Ensure structural failures reject whole batches, parse failures
//          stay recoverable, and provenance is recorded per question.
// ============================================================================

//! Update staging tests for batch rejection, partial application, and
//! provenance.

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

use std::collections::BTreeMap;

use intake_core::AnswerDocument;
use intake_core::BlockDefinition;
use intake_core::BlockDefinitionId;
use intake_core::Path;
use intake_core::ProgramDefinition;
use intake_core::ProgramId;
use intake_core::ProgramSession;
use intake_core::QuestionDefinition;
use intake_core::QuestionId;
use intake_core::QuestionKind;
use intake_core::ScalarDeclaration;
use intake_core::ScalarType;
use intake_core::ScalarValue;
use intake_core::Timestamp;
use intake_core::UpdateError;
use intake_core::ValidationErrorKind;
use intake_core::stage_update;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

const THIS_PROGRAM: ProgramId = ProgramId::new(42);
const NOW: Timestamp = Timestamp::from_unix_millis(5_000);

fn path(raw: &str) -> Path {
    Path::parse(raw).unwrap()
}

fn proposed(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

/// One block asking for a name (two scalars) and a household size.
fn applicant_program() -> ProgramDefinition {
    ProgramDefinition::new(THIS_PROGRAM, "Benefits Application").with_block(
        BlockDefinition::new(BlockDefinitionId::new(1), "Personal")
            .with_question(QuestionDefinition::new(
                QuestionId::new(10),
                "name",
                "What is your name?",
                QuestionKind::Text,
                vec![
                    ScalarDeclaration::new("first", ScalarType::Text),
                    ScalarDeclaration::new("last", ScalarType::Text),
                ],
            ))
            .with_question(QuestionDefinition::number(
                QuestionId::new(11),
                "household_size",
                "How many people live with you?",
            )),
    )
}

fn household_program() -> ProgramDefinition {
    ProgramDefinition::new(THIS_PROGRAM, "Household Survey").with_block(
        BlockDefinition::new(BlockDefinitionId::new(1), "Household").with_question(
            QuestionDefinition::enumerator(
                QuestionId::new(20),
                "household_members",
                "Who lives with you?",
            ),
        ),
    )
}

// ============================================================================
// SECTION: Structural Rejection Tests
// ============================================================================

#[test]
fn reserved_metadata_keys_reject_the_whole_batch() {
    let mut document = AnswerDocument::new();
    let result = stage_update(
        &mut document,
        &applicant_program(),
        &"1".parse().unwrap(),
        &proposed(&[("name.first", "Alice"), ("name.updated_at", "999")]),
        NOW,
    );
    assert!(matches!(result, Err(UpdateError::ReservedKey { .. })));
    assert!(!document.has_value(&path("name.first")));
}

#[test]
fn paths_outside_the_block_reject_the_whole_batch() {
    let mut document = AnswerDocument::new();
    let result = stage_update(
        &mut document,
        &applicant_program(),
        &"1".parse().unwrap(),
        &proposed(&[("name.first", "Alice"), ("favorite_color.text", "blue")]),
        NOW,
    );
    assert!(matches!(result, Err(UpdateError::PathNotInBlock { .. })));
    assert!(!document.has_value(&path("name.first")));
}

#[test]
fn file_keys_cannot_be_set_through_staging() {
    let program = ProgramDefinition::new(THIS_PROGRAM, "Proof").with_block(
        BlockDefinition::new(BlockDefinitionId::new(1), "Proof").with_question(
            QuestionDefinition::file_upload(
                QuestionId::new(30),
                "proof",
                "Upload proof of residence.",
            ),
        ),
    );
    let mut document = AnswerDocument::new();
    let result = stage_update(
        &mut document,
        &program,
        &"1".parse().unwrap(),
        &proposed(&[("proof.file_key", "uploads/forged")]),
        NOW,
    );
    assert!(matches!(
        result,
        Err(UpdateError::UnsupportedScalarType { .. })
    ));
}

#[test]
fn unknown_blocks_are_rejected() {
    let mut document = AnswerDocument::new();
    let result = stage_update(
        &mut document,
        &applicant_program(),
        &"9".parse().unwrap(),
        &proposed(&[("name.first", "Alice")]),
        NOW,
    );
    assert!(matches!(result, Err(UpdateError::UnknownBlock { .. })));
}

#[test]
fn malformed_keys_are_rejected() {
    let mut document = AnswerDocument::new();
    let result = stage_update(
        &mut document,
        &applicant_program(),
        &"1".parse().unwrap(),
        &proposed(&[("name..first", "Alice")]),
        NOW,
    );
    assert!(matches!(result, Err(UpdateError::Path(_))));
}

// ============================================================================
// SECTION: Application Tests
// ============================================================================

#[test]
fn valid_batches_apply_and_report_readiness() {
    let mut document = AnswerDocument::new();
    let staged = stage_update(
        &mut document,
        &applicant_program(),
        &"1".parse().unwrap(),
        &proposed(&[
            ("name.first", "Alice"),
            ("name.last", "Smith"),
            ("household_size.number", "4"),
        ]),
        NOW,
    )
    .unwrap();

    assert!(staged.errors.is_empty());
    assert_eq!(staged.applied.len(), 3);
    assert!(staged.ready_to_persist);
    assert_eq!(
        document.read(&path("household_size.number"), ScalarType::Long).unwrap(),
        Some(ScalarValue::Long(4))
    );
}

#[test]
fn parse_failures_keep_the_valid_subset() {
    let mut document = AnswerDocument::new();
    let staged = stage_update(
        &mut document,
        &applicant_program(),
        &"1".parse().unwrap(),
        &proposed(&[
            ("name.first", "Alice"),
            ("household_size.number", "four"),
        ]),
        NOW,
    )
    .unwrap();

    assert_eq!(staged.applied, vec![path("name.first")]);
    assert_eq!(staged.errors.len(), 1);
    assert_eq!(staged.errors[0].path, path("household_size.number"));
    assert!(matches!(
        staged.errors[0].kind,
        ValidationErrorKind::Malformed { expected: ScalarType::Long, .. }
    ));
    assert!(!staged.ready_to_persist);
    assert!(document.has_value(&path("name.first")));
    assert!(!document.has_value(&path("household_size.number")));
}

#[test]
fn incomplete_blocks_are_not_ready_to_persist() {
    let mut document = AnswerDocument::new();
    let staged = stage_update(
        &mut document,
        &applicant_program(),
        &"1".parse().unwrap(),
        &proposed(&[("name.first", "Alice")]),
        NOW,
    )
    .unwrap();
    assert!(staged.errors.is_empty());
    assert!(!staged.ready_to_persist);
}

#[test]
fn provenance_is_written_once_per_question() {
    let mut document = AnswerDocument::new();
    stage_update(
        &mut document,
        &applicant_program(),
        &"1".parse().unwrap(),
        &proposed(&[("name.first", "Alice"), ("name.last", "Smith")]),
        NOW,
    )
    .unwrap();

    assert_eq!(document.updated_at(&path("name")), Some(NOW));
    assert_eq!(document.updated_in_program(&path("name")), Some(THIS_PROGRAM));
    assert_eq!(document.updated_at(&path("name.first")), None);
    assert_eq!(document.updated_at(&path("household_size")), None);
}

#[test]
fn enumerator_answers_split_and_merge_entities() {
    let mut document = AnswerDocument::new();
    let staged = stage_update(
        &mut document,
        &household_program(),
        &"1".parse().unwrap(),
        &proposed(&[("household_members[]", "alice, bob")]),
        NOW,
    )
    .unwrap();

    assert!(staged.ready_to_persist);
    assert_eq!(
        document.entity_names(&path("household_members")),
        vec!["alice".to_string(), "bob".to_string()]
    );
    assert_eq!(document.updated_at(&path("household_members")), Some(NOW));

    // Renaming through the plain question path keeps the same destination.
    stage_update(
        &mut document,
        &household_program(),
        &"1".parse().unwrap(),
        &proposed(&[("household_members", "alice, robert")]),
        NOW,
    )
    .unwrap();
    assert_eq!(
        document.entity_names(&path("household_members")),
        vec!["alice".to_string(), "robert".to_string()]
    );
}

#[test]
fn repeated_block_updates_land_under_their_entity() {
    let program = household_program().with_block(
        BlockDefinition::new(BlockDefinitionId::new(2), "Member Details")
            .repeated_under(BlockDefinitionId::new(1))
            .with_question(QuestionDefinition::number(
                QuestionId::new(21),
                "age",
                "How old is this person?",
            )),
    );
    let mut document = AnswerDocument::new();
    document
        .write_entity_names(
            &path("household_members"),
            &["alice".to_string(), "bob".to_string()],
        )
        .unwrap();

    let staged = stage_update(
        &mut document,
        &program,
        &"2-1".parse().unwrap(),
        &proposed(&[("household_members[1].age.number", "12")]),
        NOW,
    )
    .unwrap();

    assert!(staged.ready_to_persist);
    assert_eq!(
        document
            .read(&path("household_members[1].age.number"), ScalarType::Long)
            .unwrap(),
        Some(ScalarValue::Long(12))
    );
    assert!(!document.has_value(&path("household_members[0].age.number")));
}

#[test]
fn staging_after_errors_can_recover() {
    let mut document = AnswerDocument::new();
    stage_update(
        &mut document,
        &applicant_program(),
        &"1".parse().unwrap(),
        &proposed(&[
            ("name.first", "Alice"),
            ("name.last", "Smith"),
            ("household_size.number", "four"),
        ]),
        NOW,
    )
    .unwrap();

    let staged = stage_update(
        &mut document,
        &applicant_program(),
        &"1".parse().unwrap(),
        &proposed(&[("household_size.number", "4")]),
        NOW,
    )
    .unwrap();
    assert!(staged.errors.is_empty());
    assert!(staged.ready_to_persist);
}

#[test]
fn staged_answers_resolve_repeated_blocks_next_session() {
    let program = household_program().with_block(
        BlockDefinition::new(BlockDefinitionId::new(2), "Member Details")
            .repeated_under(BlockDefinitionId::new(1))
            .with_question(QuestionDefinition::number(
                QuestionId::new(21),
                "age",
                "How old is this person?",
            )),
    );
    let mut document = AnswerDocument::new();
    stage_update(
        &mut document,
        &program,
        &"1".parse().unwrap(),
        &proposed(&[("household_members[]", "alice, bob")]),
        NOW,
    )
    .unwrap();

    let session = ProgramSession::new(program, &document);
    let ids: Vec<String> = session
        .all_blocks()
        .iter()
        .map(|block| block.id().to_string())
        .collect();
    assert_eq!(ids, vec!["1", "2-0", "2-1"]);
}
