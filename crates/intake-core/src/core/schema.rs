// crates/intake-core/src/core/schema.rs
// ============================================================================
// Module: Intake Program Schema
// Description: Read-only program, block, and question definitions.
// Purpose: Describe the authored form structure the engine resolves against.
// Dependencies: crate::core::{identifiers, path, predicate, value}, serde
// ============================================================================

//! ## Overview
//! The schema model is authored once by the admin layer and consumed
//! read-only here. A program is an ordered list of block definitions; a
//! block carries ordered question definitions, an optional visibility
//! predicate, and (when it repeats per entity) a reference to the
//! enumerator block it nests under. Question definitions declare the scalar
//! paths and types the answer document is coerced through.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::BlockDefinitionId;
use crate::core::identifiers::ProgramId;
use crate::core::identifiers::QuestionId;
use crate::core::path::Path;
use crate::core::predicate::VisibilityPredicate;
use crate::core::value::ScalarType;

// ============================================================================
// SECTION: Question Definitions
// ============================================================================

/// Broad kind of a question, driving rendering and answer projection.
///
/// # Invariants
/// - Variants are stable for serialization and schema matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Free-text question.
    Text,
    /// Numeric question.
    Number,
    /// Date question.
    Date,
    /// Single-selection question (dropdown, radio).
    SingleSelect,
    /// Multi-selection question (checkboxes).
    MultiSelect,
    /// File-upload question; the key is written by the upload collaborator.
    FileUpload,
    /// Enumerator question; the answer is a list of entity display names.
    Enumerator,
}

/// Length bounds applied to answered text scalars.
///
/// # Invariants
/// - When both bounds are present, `min_length <= max_length` is an
///   authoring-layer responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLengthBounds {
    /// Inclusive minimum answer length.
    pub min_length: Option<usize>,
    /// Inclusive maximum answer length.
    pub max_length: Option<usize>,
}

/// One declared scalar of a question.
///
/// # Invariants
/// - `segment` is a non-empty path segment under the question path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarDeclaration {
    /// Path segment under the question path.
    pub segment: String,
    /// Declared scalar type.
    pub scalar_type: ScalarType,
    /// Optional text length bounds.
    pub text_bounds: Option<TextLengthBounds>,
}

impl ScalarDeclaration {
    /// Creates an unconstrained scalar declaration.
    #[must_use]
    pub fn new(segment: impl Into<String>, scalar_type: ScalarType) -> Self {
        Self {
            segment: segment.into(),
            scalar_type,
            text_bounds: None,
        }
    }
}

/// One authored question.
///
/// # Invariants
/// - `path` is relative to the concrete block's entity context.
/// - Enumerator questions declare no scalars; their answer lives at the
///   question's collection path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDefinition {
    /// Question identifier.
    pub id: QuestionId,
    /// Context-relative question path.
    pub path: Path,
    /// Display text (already localized by the caller).
    pub text: String,
    /// Question kind.
    pub kind: QuestionKind,
    /// Declared scalars under the question path.
    pub scalars: Vec<ScalarDeclaration>,
}

impl QuestionDefinition {
    /// Creates a question definition with explicit scalars.
    #[must_use]
    pub fn new(
        id: QuestionId,
        name: &str,
        text: impl Into<String>,
        kind: QuestionKind,
        scalars: Vec<ScalarDeclaration>,
    ) -> Self {
        Self {
            id,
            path: Path::root().join(name),
            text: text.into(),
            kind,
            scalars,
        }
    }

    /// Creates a free-text question with a single `text` scalar.
    #[must_use]
    pub fn text(id: QuestionId, name: &str, text: impl Into<String>) -> Self {
        Self::new(
            id,
            name,
            text,
            QuestionKind::Text,
            vec![ScalarDeclaration::new("text", ScalarType::Text)],
        )
    }

    /// Creates a free-text question with length bounds on its answer.
    #[must_use]
    pub fn text_with_bounds(
        id: QuestionId,
        name: &str,
        text: impl Into<String>,
        min_length: Option<usize>,
        max_length: Option<usize>,
    ) -> Self {
        let mut declaration = ScalarDeclaration::new("text", ScalarType::Text);
        declaration.text_bounds = Some(TextLengthBounds {
            min_length,
            max_length,
        });
        Self::new(id, name, text, QuestionKind::Text, vec![declaration])
    }

    /// Creates a numeric question with a single `number` scalar.
    #[must_use]
    pub fn number(id: QuestionId, name: &str, text: impl Into<String>) -> Self {
        Self::new(
            id,
            name,
            text,
            QuestionKind::Number,
            vec![ScalarDeclaration::new("number", ScalarType::Long)],
        )
    }

    /// Creates a date question with a single `date` scalar.
    #[must_use]
    pub fn date(id: QuestionId, name: &str, text: impl Into<String>) -> Self {
        Self::new(
            id,
            name,
            text,
            QuestionKind::Date,
            vec![ScalarDeclaration::new("date", ScalarType::Date)],
        )
    }

    /// Creates a single-selection question with a `selection` scalar.
    #[must_use]
    pub fn single_select(id: QuestionId, name: &str, text: impl Into<String>) -> Self {
        Self::new(
            id,
            name,
            text,
            QuestionKind::SingleSelect,
            vec![ScalarDeclaration::new("selection", ScalarType::Selection)],
        )
    }

    /// Creates a multi-selection question with a `selections` scalar.
    #[must_use]
    pub fn multi_select(id: QuestionId, name: &str, text: impl Into<String>) -> Self {
        Self::new(
            id,
            name,
            text,
            QuestionKind::MultiSelect,
            vec![ScalarDeclaration::new("selections", ScalarType::Selections)],
        )
    }

    /// Creates a file-upload question with a `file_key` scalar.
    #[must_use]
    pub fn file_upload(id: QuestionId, name: &str, text: impl Into<String>) -> Self {
        Self::new(
            id,
            name,
            text,
            QuestionKind::FileUpload,
            vec![ScalarDeclaration::new("file_key", ScalarType::FileKey)],
        )
    }

    /// Creates an enumerator question.
    #[must_use]
    pub fn enumerator(id: QuestionId, name: &str, text: impl Into<String>) -> Self {
        Self::new(id, name, text, QuestionKind::Enumerator, Vec::new())
    }

    /// Returns true when this question enumerates repeated entities.
    #[must_use]
    pub fn is_enumerator(&self) -> bool {
        self.kind == QuestionKind::Enumerator
    }

    /// Returns the question path placed under an entity context.
    #[must_use]
    pub fn contextualized_path(&self, context: &Path) -> Path {
        context.append(&self.path)
    }

    /// Returns the contextualized scalar paths with their declarations.
    #[must_use]
    pub fn scalar_paths<'decl>(
        &'decl self,
        context: &Path,
    ) -> Vec<(Path, &'decl ScalarDeclaration)> {
        let base = self.contextualized_path(context);
        self.scalars
            .iter()
            .map(|declaration| (base.join(&declaration.segment), declaration))
            .collect()
    }
}

// ============================================================================
// SECTION: Block Definitions
// ============================================================================

/// One authored group of questions.
///
/// # Invariants
/// - `repeater` names the enumerator block this definition repeats under,
///   or `None` for a top-level block.
/// - Question order is authoring order and drives display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDefinition {
    /// Stable block definition identifier.
    pub id: BlockDefinitionId,
    /// Admin-facing block name.
    pub name: String,
    /// Admin-facing block description.
    pub description: String,
    /// Ordered question definitions.
    pub questions: Vec<QuestionDefinition>,
    /// Enumerator block this definition repeats under, if any.
    pub repeater: Option<BlockDefinitionId>,
    /// Optional visibility predicate.
    pub visibility: Option<VisibilityPredicate>,
}

impl BlockDefinition {
    /// Creates an empty block definition.
    #[must_use]
    pub fn new(id: BlockDefinitionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            questions: Vec::new(),
            repeater: None,
            visibility: None,
        }
    }

    /// Appends a question, preserving authoring order.
    #[must_use]
    pub fn with_question(mut self, question: QuestionDefinition) -> Self {
        self.questions.push(question);
        self
    }

    /// Marks this block as repeated under the given enumerator block.
    #[must_use]
    pub const fn repeated_under(mut self, enumerator: BlockDefinitionId) -> Self {
        self.repeater = Some(enumerator);
        self
    }

    /// Attaches a visibility predicate.
    #[must_use]
    pub fn with_visibility(mut self, predicate: VisibilityPredicate) -> Self {
        self.visibility = Some(predicate);
        self
    }

    /// Returns the enumerator question when this block is an enumerator.
    #[must_use]
    pub fn enumerator_question(&self) -> Option<&QuestionDefinition> {
        self.questions
            .iter()
            .find(|question| question.is_enumerator())
    }

    /// Returns true when this block contains an enumerator question.
    #[must_use]
    pub fn is_enumerator(&self) -> bool {
        self.enumerator_question().is_some()
    }
}

// ============================================================================
// SECTION: Program Definitions
// ============================================================================

/// One authored program: the full block tree for a questionnaire.
///
/// # Invariants
/// - `blocks` holds every definition, top-level and repeated, in
///   authoring order; nesting is expressed through
///   [`BlockDefinition::repeater`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDefinition {
    /// Program identifier.
    pub id: ProgramId,
    /// Applicant-facing program title (already localized by the caller).
    pub name: String,
    /// Every block definition in authoring order.
    pub blocks: Vec<BlockDefinition>,
}

impl ProgramDefinition {
    /// Creates an empty program definition.
    #[must_use]
    pub fn new(id: ProgramId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            blocks: Vec::new(),
        }
    }

    /// Appends a block definition, preserving authoring order.
    #[must_use]
    pub fn with_block(mut self, block: BlockDefinition) -> Self {
        self.blocks.push(block);
        self
    }

    /// Returns the top-level (non-repeated) block definitions in order.
    pub fn top_level_blocks(&self) -> impl Iterator<Item = &BlockDefinition> {
        self.blocks.iter().filter(|block| block.repeater.is_none())
    }

    /// Returns the definitions repeated under the given enumerator block.
    pub fn blocks_for_enumerator(
        &self,
        enumerator: BlockDefinitionId,
    ) -> impl Iterator<Item = &BlockDefinition> {
        self.blocks
            .iter()
            .filter(move |block| block.repeater == Some(enumerator))
    }
}
