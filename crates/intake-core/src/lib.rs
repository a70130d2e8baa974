// crates/intake-core/src/lib.rs
// ============================================================================
// Module: Intake Core Library
// Description: Program block resolution and predicate evaluation engine.
// Purpose: Resolve authored intake programs against path-addressed answer
//          documents into concrete, navigable question blocks.
// Dependencies: serde, serde_json, serde_jcs, smallvec, thiserror, time
// ============================================================================

//! ## Overview
//! Intake programs group questions into blocks, repeat blocks per enumerated
//! entity, and gate blocks behind visibility predicates over earlier answers.
//! This crate owns the data model and the evaluation engine: the answer
//! document, the authored schema, block expansion, predicate evaluation,
//! completion checks, and transactional update staging.
//!
//! Resolution is deterministic and side-effect free. Every read happens
//! against a locked snapshot of the answer document, and the only mutation
//! surface is [`runtime::stage_update`], which validates a whole batch before
//! writing anything.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::AnswerDocument;
pub use crate::core::BlockDefinition;
pub use crate::core::BlockDefinitionId;
pub use crate::core::DocumentError;
pub use crate::core::LeafComparison;
pub use crate::core::Path;
pub use crate::core::PathError;
pub use crate::core::PredicateAction;
pub use crate::core::PredicateOperator;
pub use crate::core::ProgramDefinition;
pub use crate::core::ProgramId;
pub use crate::core::QuestionDefinition;
pub use crate::core::QuestionId;
pub use crate::core::QuestionKind;
pub use crate::core::ScalarDeclaration;
pub use crate::core::ScalarType;
pub use crate::core::ScalarValue;
pub use crate::core::TextLengthBounds;
pub use crate::core::Timestamp;
pub use crate::core::ValidationError;
pub use crate::core::ValidationErrorKind;
pub use crate::core::VisibilityPredicate;
pub use crate::runtime::AnswerSummaryRow;
pub use crate::runtime::BlockId;
pub use crate::runtime::ConcreteBlock;
pub use crate::runtime::ConcreteQuestion;
pub use crate::runtime::ParseBlockIdError;
pub use crate::runtime::ProgramSession;
pub use crate::runtime::RepeatedEntity;
pub use crate::runtime::StagedUpdate;
pub use crate::runtime::UpdateError;
pub use crate::runtime::stage_update;
