// crates/intake-core/src/core/document.rs
// ============================================================================
// Module: Intake Answer Document
// Description: Path-addressed, mutable answer tree with provenance metadata.
// Purpose: Hold one applicant's answers with typed access, locked snapshots,
//          and canonical round-trip serialization.
// Dependencies: crate::core::{identifiers, path, time, value}, serde_jcs, serde_json
// ============================================================================

//! ## Overview
//! The answer document is a JSON-like tree with two top-level roots:
//! `applicant` for answers and `metadata` for per-answer provenance
//! (last-updated timestamp and the program context of the write). Writing at
//! depth N auto-creates missing intermediate containers; writing through an
//! existing non-container value fails fast with [`DocumentError::PathConflict`].
//!
//! Read-only evaluation operates on a locked [`AnswerDocument::snapshot`],
//! a deep value copy whose mutators fail with [`DocumentError::Locked`], so
//! one resolution pass never observes a torn view of concurrent edits.
//!
//! The at-rest form is canonical JCS JSON; `deserialize(serialize(d)) == d`
//! is a hard contract because that string is what the repository persists.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::ProgramId;
use crate::core::path::Path;
use crate::core::path::PathError;
use crate::core::path::Segment;
use crate::core::path::Selector;
use crate::core::time::Timestamp;
use crate::core::value::ENTITY_NAME_KEY;
use crate::core::value::ScalarType;
use crate::core::value::ScalarValue;

// ============================================================================
// SECTION: Roots and Reserved Keys
// ============================================================================

/// Top-level key holding applicant answers.
pub const ANSWER_ROOT: &str = "applicant";

/// Top-level key holding provenance metadata.
pub const METADATA_ROOT: &str = "metadata";

/// Reserved metadata key: unix-millis timestamp of the last write.
pub const METADATA_UPDATED_AT: &str = "updated_at";

/// Reserved metadata key: program context of the last write.
pub const METADATA_UPDATED_IN_PROGRAM: &str = "updated_in_program";

/// Returns true when `key` is reserved for provenance metadata.
#[must_use]
pub fn is_reserved_metadata_key(key: &str) -> bool {
    key == METADATA_UPDATED_AT || key == METADATA_UPDATED_IN_PROGRAM
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by answer document access.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// A mutator was called on a locked snapshot.
    #[error("document is locked; snapshots are read-only")]
    Locked,
    /// A value exists at the path but cannot be coerced to the expected type.
    #[error("value at `{path}` cannot be read as {expected}")]
    TypeMismatch {
        /// Path of the offending value.
        path: Path,
        /// Requested scalar type.
        expected: ScalarType,
    },
    /// A write would pass through an existing non-container value.
    #[error("cannot write through non-container value on the way to `{path}`")]
    PathConflict {
        /// Path of the attempted write.
        path: Path,
    },
    /// Serialized document text is not a valid document.
    #[error("malformed document: {0}")]
    Malformed(String),
    /// Path derivation failed.
    #[error(transparent)]
    Path(#[from] PathError),
}

// ============================================================================
// SECTION: Answer Document
// ============================================================================

/// One applicant's answers and provenance metadata.
///
/// # Invariants
/// - The tree always contains object nodes at [`ANSWER_ROOT`] and
///   [`METADATA_ROOT`].
/// - A locked document rejects every mutation.
/// - Not safe for concurrent mutation; callers serialize writes per
///   applicant outside this crate.
#[derive(Debug, Clone)]
pub struct AnswerDocument {
    /// Full document tree, both roots included.
    tree: Map<String, Value>,
    /// Snapshot flag; set once by [`AnswerDocument::snapshot`].
    locked: bool,
}

impl Default for AnswerDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for AnswerDocument {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl Eq for AnswerDocument {}

impl AnswerDocument {
    /// Creates an empty document with both roots present.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Map::new();
        tree.insert(ANSWER_ROOT.to_string(), Value::Object(Map::new()));
        tree.insert(METADATA_ROOT.to_string(), Value::Object(Map::new()));
        Self {
            tree,
            locked: false,
        }
    }

    /// Returns a deep-copied, read-only view of this document.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            locked: true,
        }
    }

    /// Returns true when this document is a locked snapshot.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    // ------------------------------------------------------------------
    // Typed reads
    // ------------------------------------------------------------------

    /// Reads the value at `path`, coerced to `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::TypeMismatch`] when a value exists at the
    /// path but cannot be coerced to `expected`.
    pub fn read(
        &self,
        path: &Path,
        expected: ScalarType,
    ) -> Result<Option<ScalarValue>, DocumentError> {
        let Some(node) = self.lookup(ANSWER_ROOT, path) else {
            return Ok(None);
        };
        ScalarValue::from_json(node, expected)
            .map(Some)
            .ok_or_else(|| DocumentError::TypeMismatch {
                path: path.clone(),
                expected,
            })
    }

    /// Returns true when a non-null value exists at `path`.
    #[must_use]
    pub fn has_value(&self, path: &Path) -> bool {
        self.lookup(ANSWER_ROOT, path)
            .is_some_and(|node| !node.is_null())
    }

    /// Best-effort string rendering of whatever sits at `path`.
    ///
    /// Used for review-screen rows where the declared type is not at hand.
    #[must_use]
    pub fn read_display(&self, path: &Path) -> Option<String> {
        self.lookup(ANSWER_ROOT, path).and_then(render_display)
    }

    /// Reads the ordered entity names enumerated at a collection `path`.
    ///
    /// A missing node, a non-array node, or an array with entries that carry
    /// no entity name all degrade to an empty list, so one malformed
    /// collection never aborts resolution of the rest of the form.
    #[must_use]
    pub fn entity_names(&self, path: &Path) -> Vec<String> {
        let Some(node) = self.lookup(ANSWER_ROOT, path) else {
            return Vec::new();
        };
        match ScalarValue::from_json(node, ScalarType::EntityNames) {
            Some(ScalarValue::TextList(names)) => names,
            _ => Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Writes a scalar value at `path`, creating missing ancestors.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Locked`] on a snapshot and
    /// [`DocumentError::PathConflict`] when an ancestor holds a
    /// non-container value.
    pub fn write(&mut self, path: &Path, value: &ScalarValue) -> Result<(), DocumentError> {
        self.write_json(ANSWER_ROOT, path, value.to_json())
    }

    /// Writes an enumerator answer, merging with existing entries by name.
    ///
    /// Entities are stored as an array of objects carrying the reserved
    /// entity-name key. A retained name keeps its nested answers at whatever
    /// index it lands on; names with no match pair positionally with the
    /// remaining unmatched entries, so a rename keeps its answers while a
    /// deleted entity's answers leave with it.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`AnswerDocument::write`].
    pub fn write_entity_names(
        &mut self,
        path: &Path,
        names: &[String],
    ) -> Result<(), DocumentError> {
        let mut existing: Vec<Option<Map<String, Value>>> = match self.lookup(ANSWER_ROOT, path) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => Some(map.clone()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        let mut retained: Vec<Option<Map<String, Value>>> = names
            .iter()
            .map(|name| take_entry_named(&mut existing, name))
            .collect();
        for slot in &mut retained {
            if slot.is_none() {
                *slot = existing.iter_mut().find_map(Option::take);
            }
        }
        let merged = names
            .iter()
            .zip(retained)
            .map(|(name, entry)| {
                let mut entry = entry.unwrap_or_default();
                entry.insert(ENTITY_NAME_KEY.to_string(), Value::String(name.clone()));
                Value::Object(entry)
            })
            .collect();
        self.write_json(ANSWER_ROOT, path, Value::Array(merged))
    }

    // ------------------------------------------------------------------
    // Provenance metadata
    // ------------------------------------------------------------------

    /// Records write provenance for one question path.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`AnswerDocument::write`].
    pub fn write_metadata(
        &mut self,
        question_path: &Path,
        program_id: ProgramId,
        timestamp: Timestamp,
    ) -> Result<(), DocumentError> {
        self.write_json(
            METADATA_ROOT,
            &question_path.join(METADATA_UPDATED_AT),
            Value::Number(timestamp.unix_millis().into()),
        )?;
        self.write_json(
            METADATA_ROOT,
            &question_path.join(METADATA_UPDATED_IN_PROGRAM),
            Value::Number(program_id.get().into()),
        )
    }

    /// Returns the last-updated timestamp recorded for a question path.
    #[must_use]
    pub fn updated_at(&self, question_path: &Path) -> Option<Timestamp> {
        self.lookup(METADATA_ROOT, &question_path.join(METADATA_UPDATED_AT))
            .and_then(Value::as_i64)
            .map(Timestamp::from_unix_millis)
    }

    /// Returns the program context recorded for a question path.
    #[must_use]
    pub fn updated_in_program(&self, question_path: &Path) -> Option<ProgramId> {
        self.lookup(
            METADATA_ROOT,
            &question_path.join(METADATA_UPDATED_IN_PROGRAM),
        )
        .and_then(Value::as_u64)
        .map(ProgramId::new)
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// Serializes the document to its canonical JCS JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Malformed`] when canonicalization fails.
    pub fn serialize(&self) -> Result<String, DocumentError> {
        serde_jcs::to_string(&self.tree).map_err(|error| DocumentError::Malformed(error.to_string()))
    }

    /// Parses a document from its serialized JSON form.
    ///
    /// Missing roots are restored as empty objects so legacy documents stay
    /// readable.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Malformed`] when the text is not a JSON
    /// object.
    pub fn deserialize(text: &str) -> Result<Self, DocumentError> {
        let parsed: Value = serde_json::from_str(text)
            .map_err(|error| DocumentError::Malformed(error.to_string()))?;
        let Value::Object(mut tree) = parsed else {
            return Err(DocumentError::Malformed(
                "document root must be a JSON object".to_string(),
            ));
        };
        for root in [ANSWER_ROOT, METADATA_ROOT] {
            tree.entry(root.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        Ok(Self {
            tree,
            locked: false,
        })
    }

    // ------------------------------------------------------------------
    // Tree navigation
    // ------------------------------------------------------------------

    /// Walks the tree under `root_key` to the node addressed by `path`.
    fn lookup(&self, root_key: &str, path: &Path) -> Option<&Value> {
        let mut current = self.tree.get(root_key)?;
        for segment in path.segments() {
            current = current.as_object()?.get(segment.name())?;
            if let Selector::Element(index) = segment.selector() {
                current = current.as_array()?.get(index)?;
            }
        }
        Some(current)
    }

    /// Writes `leaf` under `root_key` at `path`, vivifying ancestors.
    fn write_json(
        &mut self,
        root_key: &str,
        path: &Path,
        leaf: Value,
    ) -> Result<(), DocumentError> {
        if self.locked {
            return Err(DocumentError::Locked);
        }
        let Some((last, ancestors)) = path.segments().split_last() else {
            return Err(DocumentError::PathConflict { path: path.clone() });
        };
        let mut current = self
            .tree
            .entry(root_key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        for segment in ancestors {
            current = descend(current, segment, path)?;
        }
        let Value::Object(parent) = current else {
            return Err(DocumentError::PathConflict { path: path.clone() });
        };
        match last.selector() {
            Selector::Scalar | Selector::Collection => {
                parent.insert(last.name().to_string(), leaf);
                Ok(())
            }
            Selector::Element(index) => {
                let slot = parent
                    .entry(last.name().to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                let Value::Array(items) = slot else {
                    return Err(DocumentError::PathConflict { path: path.clone() });
                };
                while items.len() <= index {
                    items.push(Value::Object(Map::new()));
                }
                items[index] = leaf;
                Ok(())
            }
        }
    }
}

/// Steps one segment deeper during a write, creating missing containers.
///
/// An existing non-container node on the way is never overwritten; the write
/// fails with [`DocumentError::PathConflict`] instead.
fn descend<'tree>(
    current: &'tree mut Value,
    segment: &Segment,
    full_path: &Path,
) -> Result<&'tree mut Value, DocumentError> {
    let Value::Object(map) = current else {
        return Err(DocumentError::PathConflict {
            path: full_path.clone(),
        });
    };
    let slot = map
        .entry(segment.name().to_string())
        .or_insert_with(|| default_container(segment.selector()));
    match segment.selector() {
        Selector::Scalar | Selector::Collection => Ok(slot),
        Selector::Element(index) => {
            let Value::Array(items) = slot else {
                return Err(DocumentError::PathConflict {
                    path: full_path.clone(),
                });
            };
            while items.len() <= index {
                items.push(Value::Object(Map::new()));
            }
            Ok(&mut items[index])
        }
    }
}

/// Fresh container shape for a missing segment.
fn default_container(selector: Selector) -> Value {
    match selector {
        Selector::Scalar => Value::Object(Map::new()),
        Selector::Collection | Selector::Element(_) => Value::Array(Vec::new()),
    }
}

/// Removes and returns the first unclaimed entry carrying `name`.
fn take_entry_named(
    entries: &mut [Option<Map<String, Value>>],
    name: &str,
) -> Option<Map<String, Value>> {
    entries.iter_mut().find_map(|slot| {
        let matches = slot
            .as_ref()
            .is_some_and(|entry| entry.get(ENTITY_NAME_KEY).and_then(Value::as_str) == Some(name));
        if matches { slot.take() } else { None }
    })
}

/// Renders an arbitrary node for display on a review screen.
fn render_display(node: &Value) -> Option<String> {
    match node {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(map) => {
                        map.get(ENTITY_NAME_KEY).and_then(Value::as_str).map(ToString::to_string)
                    }
                    other => render_display(other),
                })
                .collect();
            Some(parts.join(", "))
        }
        Value::Null | Value::Object(_) => None,
    }
}
