// crates/intake-core/src/runtime/summary.rs
// ============================================================================
// Module: Intake Answer Summary
// Description: Flattened question/answer rows for a review screen.
// Purpose: Surface answers with provenance without exposing document internals.
// Dependencies: crate::core::{identifiers, time}, crate::runtime::block, serde
// ============================================================================

//! ## Overview
//! A summary row is one question's answer flattened for the review screen:
//! display text, resolved answer text, the file key for uploads, and the
//! provenance that tells the caller whether the answer was carried over from
//! a different program.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ProgramId;
use crate::core::identifiers::QuestionId;
use crate::core::time::Timestamp;
use crate::runtime::block::BlockId;

// ============================================================================
// SECTION: Summary Rows
// ============================================================================

/// One flattened question/answer row.
///
/// # Invariants
/// - `question_index` is the question's position within its block.
/// - `is_previous_response` is true when the answer's provenance names a
///   different program than the one being summarized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSummaryRow {
    /// Program the summary was generated for.
    pub program_id: ProgramId,
    /// Concrete block the question belongs to.
    pub block_id: BlockId,
    /// Question identifier.
    pub question_id: QuestionId,
    /// Zero-based position of the question within its block.
    pub question_index: usize,
    /// Question display text.
    pub question_text: String,
    /// Rendered answer text (empty when unanswered).
    pub answer_text: String,
    /// Uploaded file key, for file-upload questions only.
    pub file_key: Option<String>,
    /// Last-updated provenance timestamp, if recorded.
    pub updated_at: Option<Timestamp>,
    /// True when the answer was supplied under a different program.
    pub is_previous_response: bool,
}
