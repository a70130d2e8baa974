// crates/intake-core/src/runtime/entity.rs
// ============================================================================
// Module: Intake Repeated Entities
// Description: Runtime instances enumerated by an enumerator question.
// Purpose: Turn an enumerator answer into ordered, contextualized entities.
// Dependencies: crate::core::{document, path, schema}
// ============================================================================

//! ## Overview
//! A repeated entity is one instance named by an enumerator question's
//! answer, such as one household member or one job. Each entity carries its
//! zero-based index and its contextualized path prefix; nested enumerators
//! scope under the parent entity's prefix rather than the document root.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::document::AnswerDocument;
use crate::core::path::Path;
use crate::core::schema::QuestionDefinition;

// ============================================================================
// SECTION: Repeated Entity
// ============================================================================

/// One runtime instance enumerated by an enumerator question.
///
/// # Invariants
/// - `index` is the zero-based position in the enumerator answer.
/// - `context` addresses this entity's subtree in the answer document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatedEntity {
    /// Zero-based entity index.
    index: usize,
    /// Applicant-supplied display name.
    name: String,
    /// Contextualized path prefix for answers about this entity.
    context: Path,
}

impl RepeatedEntity {
    /// Builds the ordered entities enumerated by `question` at
    /// `parent_context`.
    ///
    /// A missing or malformed enumerator answer yields zero entities, which
    /// in turn yields zero concrete blocks for everything nested under the
    /// enumerator, leaving the rest of the form navigable.
    #[must_use]
    pub fn for_enumerator(
        question: &QuestionDefinition,
        document: &AnswerDocument,
        parent_context: &Path,
    ) -> Vec<Self> {
        let collection = question.contextualized_path(parent_context);
        document
            .entity_names(&collection)
            .into_iter()
            .enumerate()
            .map(|(index, name)| Self {
                index,
                name,
                context: collection.at_index(index),
            })
            .collect()
    }

    /// Returns the zero-based entity index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the applicant-supplied display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the contextualized path prefix for this entity.
    #[must_use]
    pub const fn context(&self) -> &Path {
        &self.context
    }
}
