// crates/intake-core/src/runtime/mod.rs
// ============================================================================
// Module: Intake Runtime
// Description: Block resolution, predicate evaluation, and update staging.
// Purpose: Group the evaluation logic that resolves programs against answer
//          documents.
// Dependencies: crate::runtime submodules
// ============================================================================

//! ## Overview
//! The runtime module turns an authored program and an answer document into
//! concrete blocks: it expands repeated blocks per enumerated entity,
//! evaluates visibility predicates, checks completion, and stages proposed
//! answer updates transactionally. All reads happen against locked snapshots
//! taken by [`session::ProgramSession`].

/// Concrete block and question instances with runtime identity.
pub mod block;
/// Repeated entities enumerated from answered collections.
pub mod entity;
/// Visibility predicate evaluation.
pub mod evaluator;
/// Resolution sessions over a program and a snapshot.
pub mod session;
/// Transactional staging of proposed answer updates.
pub mod staging;
/// Review-screen summary rows.
pub mod summary;

pub use self::block::BlockId;
pub use self::block::ConcreteBlock;
pub use self::block::ConcreteQuestion;
pub use self::block::ParseBlockIdError;
pub use self::entity::RepeatedEntity;
pub use self::evaluator::evaluate_leaf;
pub use self::evaluator::is_visible;
pub use self::session::ProgramSession;
pub use self::staging::StagedUpdate;
pub use self::staging::UpdateError;
pub use self::staging::stage_update;
pub use self::summary::AnswerSummaryRow;
