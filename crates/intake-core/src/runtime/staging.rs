// crates/intake-core/src/runtime/staging.rs
// ============================================================================
// Module: Intake Update Staging
// Description: Transactional application of proposed answers to one block.
// Purpose: Validate raw form input against a block's declared scalars, apply
//          the valid subset, and record write provenance.
// Dependencies: crate::core, crate::runtime::{block, session}
// ============================================================================

//! ## Overview
//! A staged update takes the raw path/value pairs submitted for one concrete
//! block and applies them as a unit. Structural problems (a reserved
//! metadata key, a path outside the block, an unknown block) reject the
//! whole batch before any write. Per-value parse failures are recoverable:
//! the valid subset is applied and the failures come back as validation
//! errors for re-display.
//!
//! Provenance metadata is written once per distinct question touched, never
//! per scalar, so multi-scalar answers carry a single update record.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::document::AnswerDocument;
use crate::core::document::DocumentError;
use crate::core::document::is_reserved_metadata_key;
use crate::core::path::Path;
use crate::core::path::PathError;
use crate::core::schema::ProgramDefinition;
use crate::core::time::Timestamp;
use crate::core::value::ScalarType;
use crate::core::value::ScalarValue;
use crate::core::value::ValidationError;
use crate::runtime::block::BlockId;
use crate::runtime::block::ConcreteQuestion;
use crate::runtime::session::ProgramSession;

// ============================================================================
// SECTION: Update Errors
// ============================================================================

/// Structural failure that rejects a staged update before any write.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// A proposed key collides with reserved provenance metadata.
    #[error("key `{key}` is reserved for provenance metadata")]
    ReservedKey {
        /// The offending final path segment.
        key: String,
    },
    /// A proposed path does not belong to the targeted block.
    #[error("path `{path}` is not writable in the targeted block")]
    PathNotInBlock {
        /// The offending path.
        path: Path,
    },
    /// The targeted scalar cannot be set through form input.
    #[error("scalar at `{path}` cannot be set through a staged update")]
    UnsupportedScalarType {
        /// The offending path.
        path: Path,
    },
    /// The targeted block does not resolve in the program.
    #[error("block `{id}` does not resolve in this program")]
    UnknownBlock {
        /// The missing block identity.
        id: BlockId,
    },
    /// The document rejected a write.
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// A proposed key is not a well-formed path.
    #[error(transparent)]
    Path(#[from] PathError),
}

// ============================================================================
// SECTION: Staged Update Outcome
// ============================================================================

/// Outcome of a staged update that passed structural checks.
///
/// # Invariants
/// - `applied` and `errors` partition the proposed entries: every entry
///   lands in exactly one of the two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUpdate {
    /// Paths whose values were written.
    pub applied: Vec<Path>,
    /// Recoverable parse failures, keyed by the offending path.
    pub errors: Vec<ValidationError>,
    /// True when the block is complete without errors after the update.
    pub ready_to_persist: bool,
}

/// One structurally validated write, awaiting application.
#[derive(Debug)]
struct PendingWrite {
    /// Destination of the value.
    path: Path,
    /// Declared type of the destination.
    scalar_type: ScalarType,
    /// Parsed value.
    value: ScalarValue,
    /// Question path the provenance record attaches to.
    question_path: Path,
}

// ============================================================================
// SECTION: Staging
// ============================================================================

/// Stages `proposed` raw form input against one concrete block.
///
/// Keys are document paths relative to the answer root; enumerator answers
/// may target either the question path or its collection form. The document
/// is only mutated once every entry has passed structural checks.
///
/// # Errors
///
/// Returns [`UpdateError`] when any key is malformed or reserved, targets a
/// path outside the block, targets an unsupported scalar, the block does not
/// resolve, or the document rejects a write.
pub fn stage_update(
    document: &mut AnswerDocument,
    program: &ProgramDefinition,
    block_id: &BlockId,
    proposed: &BTreeMap<String, String>,
    now: Timestamp,
) -> Result<StagedUpdate, UpdateError> {
    let entries = parse_keys(proposed)?;

    let (pending, errors) = {
        let session = ProgramSession::new(program.clone(), document);
        let block = session.block(block_id).ok_or_else(|| UpdateError::UnknownBlock {
            id: block_id.clone(),
        })?;
        let targets = writable_targets(block.questions());
        validate_entries(&entries, &targets)?
    };

    let mut applied = Vec::with_capacity(pending.len());
    let mut touched_questions = BTreeSet::new();
    for write in pending {
        apply_write(document, &write)?;
        touched_questions.insert(write.question_path);
        applied.push(write.path);
    }
    for question_path in &touched_questions {
        document.write_metadata(question_path, program.id, now)?;
    }

    let ready_to_persist = errors.is_empty() && {
        let session = ProgramSession::new(program.clone(), document);
        session
            .block(block_id)
            .is_some_and(|block| block.is_complete_without_errors())
    };

    Ok(StagedUpdate {
        applied,
        errors,
        ready_to_persist,
    })
}

/// Parses proposed keys into paths and rejects reserved metadata keys.
fn parse_keys(proposed: &BTreeMap<String, String>) -> Result<Vec<(Path, &str)>, UpdateError> {
    let mut entries = Vec::with_capacity(proposed.len());
    for (key, raw) in proposed {
        let path = Path::parse(key)?;
        if path.key_name().is_some_and(is_reserved_metadata_key) {
            return Err(UpdateError::ReservedKey {
                key: key.clone(),
            });
        }
        entries.push((path, raw.as_str()));
    }
    Ok(entries)
}

/// One writable destination within the targeted block.
#[derive(Debug)]
struct WriteTarget {
    /// Canonical destination path for the value.
    path: Path,
    /// Declared type of the destination.
    scalar_type: ScalarType,
    /// Question path the provenance record attaches to.
    question_path: Path,
}

/// Collects the writable destinations declared by a block's questions.
///
/// Enumerator answers are addressable by both the question path and its
/// collection form; both resolve to the same destination.
fn writable_targets(questions: &[ConcreteQuestion<'_>]) -> BTreeMap<Path, WriteTarget> {
    let mut targets = BTreeMap::new();
    for question in questions {
        let question_path = question.contextualized_path();
        if question.definition().is_enumerator() {
            for key in [question_path.as_collection(), question_path.clone()] {
                targets.insert(
                    key,
                    WriteTarget {
                        path: question_path.clone(),
                        scalar_type: ScalarType::EntityNames,
                        question_path: question_path.clone(),
                    },
                );
            }
            continue;
        }
        for declaration in &question.definition().scalars {
            let path = question_path.join(&declaration.segment);
            targets.insert(
                path.clone(),
                WriteTarget {
                    path,
                    scalar_type: declaration.scalar_type,
                    question_path: question_path.clone(),
                },
            );
        }
    }
    targets
}

/// Splits entries into pending writes and recoverable parse failures.
///
/// Structural problems fail the whole batch; nothing is applied.
fn validate_entries(
    entries: &[(Path, &str)],
    targets: &BTreeMap<Path, WriteTarget>,
) -> Result<(Vec<PendingWrite>, Vec<ValidationError>), UpdateError> {
    let mut pending = Vec::with_capacity(entries.len());
    let mut errors = Vec::new();
    for (path, raw) in entries {
        let target = targets
            .get(path)
            .ok_or_else(|| UpdateError::PathNotInBlock { path: path.clone() })?;
        if target.scalar_type == ScalarType::FileKey {
            return Err(UpdateError::UnsupportedScalarType { path: path.clone() });
        }
        match target.scalar_type.parse_input(raw) {
            Ok(value) => pending.push(PendingWrite {
                path: target.path.clone(),
                scalar_type: target.scalar_type,
                value,
                question_path: target.question_path.clone(),
            }),
            Err(kind) => errors.push(ValidationError {
                path: target.path.clone(),
                kind,
            }),
        }
    }
    Ok((pending, errors))
}

/// Applies one validated write to the live document.
fn apply_write(document: &mut AnswerDocument, write: &PendingWrite) -> Result<(), DocumentError> {
    match (write.scalar_type, &write.value) {
        (ScalarType::EntityNames, ScalarValue::TextList(names)) => {
            document.write_entity_names(&write.path, names)
        }
        (_other, value) => document.write(&write.path, value),
    }
}
