// crates/intake-core/src/runtime/block.rs
// ============================================================================
// Module: Intake Concrete Blocks
// Description: Runtime materialization of block definitions per entity context.
// Purpose: Provide completion, error, and provenance checks for one resolved
//          block instance.
// Dependencies: crate::core, crate::runtime::entity, smallvec
// ============================================================================

//! ## Overview
//! A concrete block is one block definition resolved for one entity context.
//! Its identity is the definition id plus an ordered vector of zero-based
//! entity indices through the enumerator nesting; the dash-joined display
//! form (`"8-1-2"`: definition 8, first entity's third nested entity) is
//! derived from that vector, never parsed back as the source of truth.
//!
//! Concrete blocks are recreated on every resolution pass. Each instance
//! holds a reference to the locked snapshot it was resolved against and
//! memoizes its question list for its own lifetime only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::OnceCell;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::core::document::AnswerDocument;
use crate::core::identifiers::BlockDefinitionId;
use crate::core::identifiers::ProgramId;
use crate::core::path::Path;
use crate::core::schema::BlockDefinition;
use crate::core::schema::QuestionDefinition;
use crate::core::schema::QuestionKind;
use crate::core::schema::TextLengthBounds;
use crate::core::time::Timestamp;
use crate::core::value::ScalarType;
use crate::core::value::ScalarValue;
use crate::core::value::ValidationError;
use crate::core::value::ValidationErrorKind;
use crate::runtime::entity::RepeatedEntity;

// ============================================================================
// SECTION: Block Identity
// ============================================================================

/// Inline capacity for entity-index vectors; nesting deeper than this is
/// rare and spills to the heap.
type IndexVec = SmallVec<[usize; 4]>;

/// Error parsing a dash-joined block identifier.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed block id `{raw}`")]
pub struct ParseBlockIdError {
    /// The raw identifier text.
    pub raw: String,
}

/// Identity of one concrete block.
///
/// # Invariants
/// - Comparison and hashing use the definition id and index vector; the
///   dash-joined string is display-only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockId {
    /// Block definition identifier.
    definition: BlockDefinitionId,
    /// Zero-based entity indices through the enumerator nesting.
    entity_indices: IndexVec,
}

impl BlockId {
    /// Identity from explicit entity indices.
    #[must_use]
    pub fn new(definition: BlockDefinitionId, entity_indices: &[usize]) -> Self {
        Self {
            definition,
            entity_indices: IndexVec::from_slice(entity_indices),
        }
    }

    /// Returns the block definition identifier.
    #[must_use]
    pub const fn definition(&self) -> BlockDefinitionId {
        self.definition
    }

    /// Returns the entity indices through the enumerator nesting.
    #[must_use]
    pub fn entity_indices(&self) -> &[usize] {
        &self.entity_indices
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.definition)?;
        for index in &self.entity_indices {
            write!(f, "-{index}")?;
        }
        Ok(())
    }
}

impl FromStr for BlockId {
    type Err = ParseBlockIdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.split('-');
        let malformed = || ParseBlockIdError {
            raw: raw.to_string(),
        };
        let definition: u64 = parts
            .next()
            .and_then(|part| part.parse().ok())
            .ok_or_else(malformed)?;
        let mut entity_indices = IndexVec::new();
        for part in parts {
            entity_indices.push(part.parse().map_err(|_ignored| malformed())?);
        }
        Ok(Self {
            definition: BlockDefinitionId::new(definition),
            entity_indices,
        })
    }
}

impl TryFrom<String> for BlockId {
    type Error = ParseBlockIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BlockId> for String {
    fn from(id: BlockId) -> Self {
        id.to_string()
    }
}

// ============================================================================
// SECTION: Concrete Questions
// ============================================================================

/// One question resolved at a concrete block's entity context.
#[derive(Debug, Clone)]
pub struct ConcreteQuestion<'resolution> {
    /// The authored question.
    definition: &'resolution QuestionDefinition,
    /// Snapshot the answers are read from.
    document: &'resolution AnswerDocument,
    /// Entity context of the enclosing block.
    context: Path,
}

impl<'resolution> ConcreteQuestion<'resolution> {
    /// Creates a concrete question at the given context.
    pub(crate) const fn new(
        definition: &'resolution QuestionDefinition,
        document: &'resolution AnswerDocument,
        context: Path,
    ) -> Self {
        Self {
            definition,
            document,
            context,
        }
    }

    /// Returns the authored question definition.
    #[must_use]
    pub const fn definition(&self) -> &'resolution QuestionDefinition {
        self.definition
    }

    /// Returns the contextualized question path (parent of its scalars).
    #[must_use]
    pub fn contextualized_path(&self) -> Path {
        self.definition.contextualized_path(&self.context)
    }

    /// Returns true when every declared part of the answer is present.
    ///
    /// An enumerator question counts as answered once at least one entity
    /// exists.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        if self.definition.is_enumerator() {
            return !self
                .document
                .entity_names(&self.contextualized_path())
                .is_empty();
        }
        self.definition
            .scalar_paths(&self.context)
            .iter()
            .all(|(path, _declaration)| self.document.has_value(path))
    }

    /// Collects recoverable validation errors on answered scalars.
    #[must_use]
    pub fn validation_errors(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (path, declaration) in self.definition.scalar_paths(&self.context) {
            if !self.document.has_value(&path) {
                continue;
            }
            match self.document.read(&path, declaration.scalar_type) {
                Err(_mismatch) => errors.push(ValidationError {
                    path,
                    kind: ValidationErrorKind::TypeMismatch {
                        expected: declaration.scalar_type,
                    },
                }),
                Ok(Some(ScalarValue::Text(text))) => {
                    if let Some(bounds) = declaration.text_bounds {
                        if let Some(kind) = check_text_bounds(&text, bounds) {
                            errors.push(ValidationError { path, kind });
                        }
                    }
                }
                Ok(_other) => {}
            }
        }
        errors
    }

    /// Returns true when any answered scalar fails validation.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.validation_errors().is_empty()
    }

    /// Renders the answer for a review screen.
    #[must_use]
    pub fn answer_text(&self) -> String {
        if self.definition.is_enumerator() {
            return self
                .document
                .entity_names(&self.contextualized_path())
                .join(", ");
        }
        let parts: Vec<String> = self
            .definition
            .scalar_paths(&self.context)
            .iter()
            .filter_map(|(path, _declaration)| self.document.read_display(path))
            .collect();
        parts.join(", ")
    }

    /// Returns the uploaded file key for file-upload questions.
    #[must_use]
    pub fn file_key(&self) -> Option<String> {
        if self.definition.kind != QuestionKind::FileUpload {
            return None;
        }
        self.definition
            .scalar_paths(&self.context)
            .iter()
            .find(|(_path, declaration)| declaration.scalar_type == ScalarType::FileKey)
            .and_then(|(path, _declaration)| {
                match self.document.read(path, ScalarType::FileKey) {
                    Ok(Some(ScalarValue::Text(key))) => Some(key),
                    _ => None,
                }
            })
    }

    /// Returns the last-updated provenance timestamp, if recorded.
    #[must_use]
    pub fn updated_at(&self) -> Option<Timestamp> {
        self.document.updated_at(&self.contextualized_path())
    }

    /// Returns the program context of the last write, if recorded.
    #[must_use]
    pub fn updated_in_program(&self) -> Option<ProgramId> {
        self.document.updated_in_program(&self.contextualized_path())
    }
}

/// Checks an answered text value against declared length bounds.
fn check_text_bounds(text: &str, bounds: TextLengthBounds) -> Option<ValidationErrorKind> {
    let actual = text.chars().count();
    if let Some(min) = bounds.min_length {
        if actual < min {
            return Some(ValidationErrorKind::TooShort { min, actual });
        }
    }
    if let Some(max) = bounds.max_length {
        if actual > max {
            return Some(ValidationErrorKind::TooLong { max, actual });
        }
    }
    None
}

// ============================================================================
// SECTION: Concrete Blocks
// ============================================================================

/// One block definition resolved for one entity context.
///
/// # Invariants
/// - Holds the locked snapshot it was resolved against; never the live
///   mutable document.
/// - Question list is memoized for this instance's lifetime only.
#[derive(Debug)]
pub struct ConcreteBlock<'resolution> {
    /// Runtime identity.
    id: BlockId,
    /// The authored block.
    definition: &'resolution BlockDefinition,
    /// Snapshot the answers are read from.
    document: &'resolution AnswerDocument,
    /// Entity context path (root context for top-level blocks).
    context: Path,
    /// The entity this instance repeats for, if any.
    entity: Option<RepeatedEntity>,
    /// Lazily built question list.
    questions: OnceCell<Vec<ConcreteQuestion<'resolution>>>,
}

impl<'resolution> ConcreteBlock<'resolution> {
    /// Creates a concrete block at the given context.
    pub(crate) const fn new(
        id: BlockId,
        definition: &'resolution BlockDefinition,
        document: &'resolution AnswerDocument,
        context: Path,
        entity: Option<RepeatedEntity>,
    ) -> Self {
        Self {
            id,
            definition,
            document,
            context,
            entity,
            questions: OnceCell::new(),
        }
    }

    /// Returns the runtime identity.
    #[must_use]
    pub const fn id(&self) -> &BlockId {
        &self.id
    }

    /// Returns the authored block definition.
    #[must_use]
    pub const fn definition(&self) -> &'resolution BlockDefinition {
        self.definition
    }

    /// Returns the admin-facing block name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Returns the entity context path.
    #[must_use]
    pub const fn context(&self) -> &Path {
        &self.context
    }

    /// Returns the entity this instance repeats for, if any.
    #[must_use]
    pub const fn repeated_entity(&self) -> Option<&RepeatedEntity> {
        self.entity.as_ref()
    }

    /// Returns the resolved questions, memoized for this instance.
    #[must_use]
    pub fn questions(&self) -> &[ConcreteQuestion<'resolution>] {
        self.questions.get_or_init(|| {
            self.definition
                .questions
                .iter()
                .map(|question| {
                    ConcreteQuestion::new(question, self.document, self.context.clone())
                })
                .collect()
        })
    }

    /// Returns true when any question reports a validation error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.questions().iter().any(ConcreteQuestion::has_errors)
    }

    /// Collects every validation error across the block's questions.
    #[must_use]
    pub fn validation_errors(&self) -> Vec<ValidationError> {
        self.questions()
            .iter()
            .flat_map(ConcreteQuestion::validation_errors)
            .collect()
    }

    /// Returns true when every question is answered and none has errors.
    #[must_use]
    pub fn is_complete_without_errors(&self) -> bool {
        self.questions().iter().all(ConcreteQuestion::is_answered) && !self.has_errors()
    }

    /// Returns true when the block is complete and at least one question
    /// was answered while filling out the given program.
    ///
    /// Shared questions answered under a different program keep the block
    /// out of that program's freshly-supplied set.
    #[must_use]
    pub fn was_completed_in_program(&self, program_id: ProgramId) -> bool {
        self.is_complete_without_errors()
            && self
                .questions()
                .iter()
                .any(|question| question.updated_in_program() == Some(program_id))
    }
}
