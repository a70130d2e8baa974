// crates/intake-core/src/runtime/session.rs
// ============================================================================
// Module: Intake Program Session
// Description: Read-only resolution of a program against one applicant's answers.
// Purpose: Expand the block tree, apply visibility, and answer navigation and
//          summary queries over a consistent snapshot.
// Dependencies: crate::core, crate::runtime::{block, entity, evaluator, summary}
// ============================================================================

//! ## Overview
//! A session pairs a program definition with a locked snapshot of the
//! applicant's answer document, taken at construction. Every query resolves
//! fresh concrete blocks from that snapshot, so one resolution pass never
//! observes a torn view even if the live document is mutated elsewhere.
//!
//! Expansion is recursive and depth-first: concrete blocks appear in
//! authoring order, and repeated instances appear in entity-index order
//! immediately after the enumerator block that produced them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::document::AnswerDocument;
use crate::core::path::Path;
use crate::core::schema::BlockDefinition;
use crate::core::schema::ProgramDefinition;
use crate::runtime::block::BlockId;
use crate::runtime::block::ConcreteBlock;
use crate::runtime::entity::RepeatedEntity;
use crate::runtime::evaluator::is_visible;
use crate::runtime::summary::AnswerSummaryRow;

// ============================================================================
// SECTION: Program Session
// ============================================================================

/// Read-only resolution session for one applicant and one program.
///
/// # Invariants
/// - The held document is a locked snapshot; mutation happens on the live
///   document through the staging transaction, never through a session.
#[derive(Debug)]
pub struct ProgramSession {
    /// The authored program.
    program: ProgramDefinition,
    /// Locked snapshot of the applicant's answers.
    document: AnswerDocument,
}

impl ProgramSession {
    /// Creates a session over a locked snapshot of `document`.
    #[must_use]
    pub fn new(program: ProgramDefinition, document: &AnswerDocument) -> Self {
        Self {
            program,
            document: document.snapshot(),
        }
    }

    /// Returns the program being resolved.
    #[must_use]
    pub const fn program(&self) -> &ProgramDefinition {
        &self.program
    }

    /// Returns the snapshot this session resolves against.
    #[must_use]
    pub const fn document(&self) -> &AnswerDocument {
        &self.document
    }

    /// Returns the applicant-facing program title.
    #[must_use]
    pub fn program_title(&self) -> &str {
        &self.program.name
    }

    // ------------------------------------------------------------------
    // Block resolution
    // ------------------------------------------------------------------

    /// Resolves every concrete block, hidden ones included.
    #[must_use]
    pub fn all_blocks(&self) -> Vec<ConcreteBlock<'_>> {
        self.blocks_matching(&|_block| true)
    }

    /// Resolves the concrete blocks whose visibility predicate shows them.
    #[must_use]
    pub fn visible_blocks(&self) -> Vec<ConcreteBlock<'_>> {
        self.blocks_matching(&|block| {
            is_visible(
                block.definition().visibility.as_ref(),
                &self.document,
                block.context(),
            )
        })
    }

    /// Resolves the visible blocks still relevant to this program: not yet
    /// complete, or completed while filling out this program.
    #[must_use]
    pub fn in_progress_blocks(&self) -> Vec<ConcreteBlock<'_>> {
        let program_id = self.program.id;
        self.blocks_matching(&|block| {
            (!block.is_complete_without_errors() || block.was_completed_in_program(program_id))
                && is_visible(
                    block.definition().visibility.as_ref(),
                    &self.document,
                    block.context(),
                )
        })
    }

    /// Looks up one concrete block by identity.
    #[must_use]
    pub fn block(&self, id: &BlockId) -> Option<ConcreteBlock<'_>> {
        self.all_blocks().into_iter().find(|block| block.id() == id)
    }

    /// Returns the in-progress block that follows `id`, for navigation.
    #[must_use]
    pub fn block_after(&self, id: &BlockId) -> Option<ConcreteBlock<'_>> {
        let blocks = self.in_progress_blocks();
        let position = blocks.iter().position(|block| block.id() == id)?;
        blocks.into_iter().nth(position + 1)
    }

    /// Returns a block's position in the full resolved list.
    #[must_use]
    pub fn block_index(&self, id: &BlockId) -> Option<usize> {
        self.all_blocks()
            .iter()
            .position(|block| block.id() == id)
    }

    /// Returns the first visible block that is not complete-without-errors.
    ///
    /// `None` means every visible block is complete: ready to submit.
    #[must_use]
    pub fn first_incomplete_block(&self) -> Option<ConcreteBlock<'_>> {
        self.visible_blocks()
            .into_iter()
            .find(|block| !block.is_complete_without_errors())
    }

    // ------------------------------------------------------------------
    // Summary
    // ------------------------------------------------------------------

    /// Flattens every visible block's questions into review-screen rows.
    #[must_use]
    pub fn summary(&self) -> Vec<AnswerSummaryRow> {
        let mut rows = Vec::new();
        for block in self.visible_blocks() {
            for (question_index, question) in block.questions().iter().enumerate() {
                let updated_in_program = question.updated_in_program();
                rows.push(AnswerSummaryRow {
                    program_id: self.program.id,
                    block_id: block.id().clone(),
                    question_id: question.definition().id,
                    question_index,
                    question_text: question.definition().text.clone(),
                    answer_text: question.answer_text(),
                    file_key: question.file_key(),
                    updated_at: question.updated_at(),
                    is_previous_response: updated_in_program
                        .is_some_and(|program| program != self.program.id),
                });
            }
        }
        rows
    }

    // ------------------------------------------------------------------
    // Expansion
    // ------------------------------------------------------------------

    /// Resolves concrete blocks matching `filter`, in resolution order.
    ///
    /// Enumerator children are always expanded, even when the enumerator
    /// block itself is filtered out, so navigation queries stay consistent
    /// with the full tree.
    fn blocks_matching<'session>(
        &'session self,
        filter: &dyn Fn(&ConcreteBlock<'session>) -> bool,
    ) -> Vec<ConcreteBlock<'session>> {
        let mut resolved = Vec::new();
        let top_level: Vec<&BlockDefinition> = self.program.top_level_blocks().collect();
        self.expand_into(
            &top_level,
            &[],
            &Path::root(),
            None,
            filter,
            &mut resolved,
        );
        resolved
    }

    /// Depth-first expansion of `definitions` at one entity context.
    fn expand_into<'session>(
        &'session self,
        definitions: &[&'session BlockDefinition],
        entity_indices: &[usize],
        context: &Path,
        entity: Option<&RepeatedEntity>,
        filter: &dyn Fn(&ConcreteBlock<'session>) -> bool,
        resolved: &mut Vec<ConcreteBlock<'session>>,
    ) {
        for &definition in definitions {
            let block = ConcreteBlock::new(
                BlockId::new(definition.id, entity_indices),
                definition,
                &self.document,
                context.clone(),
                entity.cloned(),
            );
            if filter(&block) {
                resolved.push(block);
            }

            let Some(enumerator_question) = definition.enumerator_question() else {
                continue;
            };
            let entities =
                RepeatedEntity::for_enumerator(enumerator_question, &self.document, context);
            let repeated: Vec<&BlockDefinition> =
                self.program.blocks_for_enumerator(definition.id).collect();
            for repeated_entity in &entities {
                let mut nested_indices = entity_indices.to_vec();
                nested_indices.push(repeated_entity.index());
                self.expand_into(
                    &repeated,
                    &nested_indices,
                    repeated_entity.context(),
                    Some(repeated_entity),
                    filter,
                    resolved,
                );
            }
        }
    }
}
