// crates/intake-core/tests/completion_unit.rs
// ============================================================================
// Module: Block Completion Unit Tests
// Description: Validate completion, validation errors, and program provenance.
// Purpose: Ensure completion checks, navigation over in-progress blocks, and
//          summary rows reflect the answer document.
// ============================================================================

//! Completion and navigation tests over resolved blocks.

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
use intake_core::BlockDefinition;
use intake_core::BlockDefinitionId;
use intake_core::Path;
use intake_core::ProgramDefinition;
use intake_core::ProgramId;
use intake_core::ProgramSession;
use intake_core::QuestionDefinition;
use intake_core::QuestionId;
use intake_core::ScalarValue;
use intake_core::Timestamp;
use intake_core::ValidationErrorKind;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

const THIS_PROGRAM: ProgramId = ProgramId::new(42);
const OTHER_PROGRAM: ProgramId = ProgramId::new(7);

fn path(raw: &str) -> Path {
    Path::parse(raw).unwrap()
}

fn text(value: &str) -> ScalarValue {
    ScalarValue::Text(value.to_string())
}

/// Three unrepeated blocks: name, favorite color, proof upload.
fn three_block_program() -> ProgramDefinition {
    ProgramDefinition::new(THIS_PROGRAM, "Benefits Application")
        .with_block(
            BlockDefinition::new(BlockDefinitionId::new(1), "Personal").with_question(
                QuestionDefinition::text(QuestionId::new(10), "name", "What is your name?"),
            ),
        )
        .with_block(
            BlockDefinition::new(BlockDefinitionId::new(2), "Favorites").with_question(
                QuestionDefinition::text(
                    QuestionId::new(11),
                    "favorite_color",
                    "What is your favorite color?",
                ),
            ),
        )
        .with_block(
            BlockDefinition::new(BlockDefinitionId::new(3), "Proof").with_question(
                QuestionDefinition::file_upload(
                    QuestionId::new(12),
                    "proof",
                    "Upload proof of residence.",
                ),
            ),
        )
}

fn answer_name(document: &mut AnswerDocument, program: ProgramId) {
    document.write(&path("name.text"), &text("Alice")).unwrap();
    document
        .write_metadata(&path("name"), program, Timestamp::from_unix_millis(1_000))
        .unwrap();
}

// ============================================================================
// SECTION: Completion Tests
// ============================================================================

#[test]
fn block_is_complete_once_every_question_is_answered() {
    let mut document = AnswerDocument::new();
    let session = ProgramSession::new(three_block_program(), &document);
    assert!(!session
        .block(&"1".parse().unwrap())
        .unwrap()
        .is_complete_without_errors());

    answer_name(&mut document, THIS_PROGRAM);
    let session = ProgramSession::new(three_block_program(), &document);
    assert!(session
        .block(&"1".parse().unwrap())
        .unwrap()
        .is_complete_without_errors());
}

#[test]
fn enumerator_needs_at_least_one_entity() {
    let program = ProgramDefinition::new(THIS_PROGRAM, "Household Survey").with_block(
        BlockDefinition::new(BlockDefinitionId::new(1), "Household").with_question(
            QuestionDefinition::enumerator(
                QuestionId::new(20),
                "household_members",
                "Who lives with you?",
            ),
        ),
    );
    let mut document = AnswerDocument::new();
    let session = ProgramSession::new(program.clone(), &document);
    assert!(!session
        .block(&"1".parse().unwrap())
        .unwrap()
        .is_complete_without_errors());

    document
        .write_entity_names(&path("household_members"), &["alice".to_string()])
        .unwrap();
    let session = ProgramSession::new(program, &document);
    assert!(session
        .block(&"1".parse().unwrap())
        .unwrap()
        .is_complete_without_errors());
}

#[test]
fn text_length_bounds_produce_validation_errors() {
    let program = ProgramDefinition::new(THIS_PROGRAM, "Essay").with_block(
        BlockDefinition::new(BlockDefinitionId::new(1), "Statement").with_question(
            QuestionDefinition::text_with_bounds(
                QuestionId::new(30),
                "statement",
                "Tell us about yourself.",
                Some(3),
                Some(5),
            ),
        ),
    );

    let mut document = AnswerDocument::new();
    document.write(&path("statement.text"), &text("hi")).unwrap();
    let session = ProgramSession::new(program.clone(), &document);
    let block = session.block(&"1".parse().unwrap()).unwrap();
    let errors = block.validation_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].kind,
        ValidationErrorKind::TooShort { min: 3, actual: 2 }
    );
    assert!(!block.is_complete_without_errors());

    document
        .write(&path("statement.text"), &text("too long"))
        .unwrap();
    let session = ProgramSession::new(program.clone(), &document);
    let block = session.block(&"1".parse().unwrap()).unwrap();
    assert_eq!(
        block.validation_errors()[0].kind,
        ValidationErrorKind::TooLong { max: 5, actual: 8 }
    );

    document.write(&path("statement.text"), &text("okay")).unwrap();
    let session = ProgramSession::new(program, &document);
    let block = session.block(&"1".parse().unwrap()).unwrap();
    assert!(block.is_complete_without_errors());
}

#[test]
fn completion_provenance_names_the_writing_program() {
    let mut document = AnswerDocument::new();
    answer_name(&mut document, OTHER_PROGRAM);
    let session = ProgramSession::new(three_block_program(), &document);
    let block = session.block(&"1".parse().unwrap()).unwrap();
    assert!(block.is_complete_without_errors());
    assert!(block.was_completed_in_program(OTHER_PROGRAM));
    assert!(!block.was_completed_in_program(THIS_PROGRAM));
}

// ============================================================================
// SECTION: Navigation Tests
// ============================================================================

#[test]
fn first_incomplete_block_scans_in_order() {
    let mut document = AnswerDocument::new();
    let session = ProgramSession::new(three_block_program(), &document);
    assert_eq!(
        session.first_incomplete_block().unwrap().id().to_string(),
        "1"
    );

    answer_name(&mut document, THIS_PROGRAM);
    let session = ProgramSession::new(three_block_program(), &document);
    assert_eq!(
        session.first_incomplete_block().unwrap().id().to_string(),
        "2"
    );
}

#[test]
fn blocks_completed_elsewhere_leave_the_in_progress_list() {
    let mut document = AnswerDocument::new();
    answer_name(&mut document, OTHER_PROGRAM);
    let session = ProgramSession::new(three_block_program(), &document);
    let ids: Vec<String> = session
        .in_progress_blocks()
        .iter()
        .map(|block| block.id().to_string())
        .collect();
    assert_eq!(ids, vec!["2", "3"]);
}

#[test]
fn blocks_completed_here_stay_in_progress() {
    let mut document = AnswerDocument::new();
    answer_name(&mut document, THIS_PROGRAM);
    let session = ProgramSession::new(three_block_program(), &document);
    let ids: Vec<String> = session
        .in_progress_blocks()
        .iter()
        .map(|block| block.id().to_string())
        .collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[test]
fn block_after_walks_the_in_progress_list() {
    let mut document = AnswerDocument::new();
    answer_name(&mut document, OTHER_PROGRAM);
    let session = ProgramSession::new(three_block_program(), &document);
    assert_eq!(
        session
            .block_after(&"2".parse().unwrap())
            .unwrap()
            .id()
            .to_string(),
        "3"
    );
    assert!(session.block_after(&"3".parse().unwrap()).is_none());
    assert!(session.block_after(&"1".parse().unwrap()).is_none());
}

// ============================================================================
// SECTION: Summary Tests
// ============================================================================

#[test]
fn summary_rows_carry_answers_and_provenance() {
    let mut document = AnswerDocument::new();
    answer_name(&mut document, OTHER_PROGRAM);
    document
        .write(&path("proof.file_key"), &text("uploads/proof-123"))
        .unwrap();
    document
        .write_metadata(
            &path("proof"),
            THIS_PROGRAM,
            Timestamp::from_unix_millis(2_000),
        )
        .unwrap();

    let session = ProgramSession::new(three_block_program(), &document);
    let rows = session.summary();
    assert_eq!(rows.len(), 3);

    let name_row = &rows[0];
    assert_eq!(name_row.question_text, "What is your name?");
    assert_eq!(name_row.answer_text, "Alice");
    assert_eq!(name_row.file_key, None);
    assert_eq!(name_row.updated_at, Some(Timestamp::from_unix_millis(1_000)));
    assert!(name_row.is_previous_response);

    let color_row = &rows[1];
    assert_eq!(color_row.answer_text, "");
    assert_eq!(color_row.updated_at, None);
    assert!(!color_row.is_previous_response);

    let proof_row = &rows[2];
    assert_eq!(proof_row.file_key.as_deref(), Some("uploads/proof-123"));
    assert!(!proof_row.is_previous_response);
}

#[test]
fn enumerator_summary_joins_entity_names() {
    let program = ProgramDefinition::new(THIS_PROGRAM, "Household Survey").with_block(
        BlockDefinition::new(BlockDefinitionId::new(1), "Household").with_question(
            QuestionDefinition::enumerator(
                QuestionId::new(20),
                "household_members",
                "Who lives with you?",
            ),
        ),
    );
    let mut document = AnswerDocument::new();
    document
        .write_entity_names(
            &path("household_members"),
            &["alice".to_string(), "bob".to_string()],
        )
        .unwrap();
    let session = ProgramSession::new(program, &document);
    assert_eq!(session.summary()[0].answer_text, "alice, bob");
}
