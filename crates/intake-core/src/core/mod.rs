// crates/intake-core/src/core/mod.rs
// ============================================================================
// Module: Intake Core Data Model
// Description: Paths, scalar values, the answer document, and the schema.
// Purpose: Group the read-side data model the runtime evaluates against.
// Dependencies: crate::core submodules
// ============================================================================

//! ## Overview
//! The core module holds the engine's data model: path-addressed answers,
//! typed scalar values, the answer document with provenance metadata, the
//! authored program schema, and visibility predicates. Evaluation and
//! mutation logic live in [`crate::runtime`].

/// Answer document with provenance metadata and locked snapshots.
pub mod document;
/// Opaque program, block, and question identifiers.
pub mod identifiers;
/// Hierarchical path values addressing the answer document.
pub mod path;
/// Authored visibility predicates.
pub mod predicate;
/// Program, block, and question definitions.
pub mod schema;
/// Caller-supplied timestamps.
pub mod time;
/// Scalar types, values, coercion, and validation errors.
pub mod value;

pub use self::document::ANSWER_ROOT;
pub use self::document::AnswerDocument;
pub use self::document::DocumentError;
pub use self::document::METADATA_ROOT;
pub use self::document::METADATA_UPDATED_AT;
pub use self::document::METADATA_UPDATED_IN_PROGRAM;
pub use self::document::is_reserved_metadata_key;
pub use self::identifiers::BlockDefinitionId;
pub use self::identifiers::ProgramId;
pub use self::identifiers::QuestionId;
pub use self::path::Path;
pub use self::path::PathError;
pub use self::path::Segment;
pub use self::path::Selector;
pub use self::predicate::LeafComparison;
pub use self::predicate::PredicateAction;
pub use self::predicate::PredicateOperator;
pub use self::predicate::VisibilityPredicate;
pub use self::schema::BlockDefinition;
pub use self::schema::ProgramDefinition;
pub use self::schema::QuestionDefinition;
pub use self::schema::QuestionKind;
pub use self::schema::ScalarDeclaration;
pub use self::schema::TextLengthBounds;
pub use self::time::Timestamp;
pub use self::value::ENTITY_NAME_KEY;
pub use self::value::ScalarType;
pub use self::value::ScalarValue;
pub use self::value::ValidationError;
pub use self::value::ValidationErrorKind;
