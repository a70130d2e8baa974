// crates/intake-core/src/core/path.rs
// ============================================================================
// Module: Intake Path Model
// Description: Hierarchical keys addressing nodes in the answer document.
// Purpose: Provide immutable, normalized path values with derivation operations.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Path`] is an ordered sequence of named segments addressing a node in
//! an applicant's answer document. Paths are immutable value objects: every
//! derivation (`join`, `parent`, `at_index`) returns a new path and leaves
//! the receiver untouched. Equality and hashing are by normalized segment
//! sequence, which underlies every map-keyed lookup in the engine.
//!
//! A final segment may carry the collection marker `[]`, addressing a
//! repeatable entity collection, or an index `[k]`, addressing one entity of
//! that collection. The `applicant`/`metadata` root prefixes are applied by
//! the document layer and are never stored in `Path` values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by path parsing and derivation.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// `parent()` was called on the zero-segment root path.
    #[error("root path has no parent")]
    RootHasNoParent,
    /// A parsed segment had an empty name.
    #[error("empty segment in path `{raw}`")]
    EmptySegment {
        /// The raw path text being parsed.
        raw: String,
    },
    /// A parsed segment had unbalanced or non-numeric index brackets.
    #[error("malformed segment `{raw}`")]
    MalformedSegment {
        /// The raw segment text.
        raw: String,
    },
}

// ============================================================================
// SECTION: Segments
// ============================================================================

/// Selector attached to a path segment.
///
/// # Invariants
/// - `Element` indices are zero-based entity indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Selector {
    /// Plain scalar or container segment.
    Scalar,
    /// The whole repeated-entity collection (`name[]`).
    Collection,
    /// One entity of a collection by zero-based index (`name[k]`).
    Element(usize),
}

/// One named segment of a path.
///
/// # Invariants
/// - `name` is non-empty for every segment produced by [`Path::parse`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Segment {
    name: String,
    selector: Selector,
}

impl Segment {
    /// Returns the segment name without any selector suffix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the segment selector.
    #[must_use]
    pub const fn selector(&self) -> Selector {
        self.selector
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.selector {
            Selector::Scalar => write!(f, "{}", self.name),
            Selector::Collection => write!(f, "{}[]", self.name),
            Selector::Element(index) => write!(f, "{}[{index}]", self.name),
        }
    }
}

// ============================================================================
// SECTION: Path
// ============================================================================

/// Immutable hierarchical key into the answer document.
///
/// # Invariants
/// - Segment names are non-empty.
/// - Equality and hashing are by segment sequence only; a path carries no
///   identity beyond its segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Returns the zero-segment root path.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parses a dot-joined path, honoring `[]` and `[k]` segment suffixes.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] for empty segments or malformed index brackets.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for piece in trimmed.split('.') {
            segments.push(parse_segment(piece, raw)?);
        }
        Ok(Self { segments })
    }

    /// Returns true when the path has no segments.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Returns the segments in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the final segment name, or `None` on the root path.
    #[must_use]
    pub fn key_name(&self) -> Option<&str> {
        self.segments.last().map(Segment::name)
    }

    /// Returns the path with the final segment removed.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::RootHasNoParent`] when called on the root path.
    pub fn parent(&self) -> Result<Self, PathError> {
        if self.segments.is_empty() {
            return Err(PathError::RootHasNoParent);
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Ok(Self { segments })
    }

    /// Returns a new path with one scalar segment appended.
    ///
    /// The receiver is never mutated. Segment-name validity is enforced at
    /// the [`Path::parse`] boundary; internal callers join schema-declared
    /// names.
    #[must_use]
    pub fn join(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment {
            name: name.into(),
            selector: Selector::Scalar,
        });
        Self { segments }
    }

    /// Returns a new path with every segment of `suffix` appended.
    #[must_use]
    pub fn append(&self, suffix: &Self) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(suffix.segments.iter().cloned());
        Self { segments }
    }

    /// Returns the path with the final segment marked as a collection.
    ///
    /// On the root path this is a no-op.
    #[must_use]
    pub fn as_collection(&self) -> Self {
        self.with_last_selector(Selector::Collection)
    }

    /// Returns the path with the final segment addressing entity `index`.
    ///
    /// On the root path this is a no-op.
    #[must_use]
    pub fn at_index(&self, index: usize) -> Self {
        self.with_last_selector(Selector::Element(index))
    }

    /// Returns true when the final segment carries the collection marker.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(
            self.segments.last().map(Segment::selector),
            Some(Selector::Collection)
        )
    }

    fn with_last_selector(&self, selector: Selector) -> Self {
        let mut segments = self.segments.clone();
        if let Some(last) = segments.last_mut() {
            last.selector = selector;
        }
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
            first = false;
        }
        Ok(())
    }
}

impl TryFrom<String> for Path {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}

/// Parses one raw segment, splitting off a `[]` or `[k]` suffix.
fn parse_segment(piece: &str, raw: &str) -> Result<Segment, PathError> {
    let (name, selector) = match piece.find('[') {
        None => (piece, Selector::Scalar),
        Some(open) => {
            let Some(inner) = piece[open..].strip_prefix('[').and_then(|rest| rest.strip_suffix(']'))
            else {
                return Err(PathError::MalformedSegment {
                    raw: piece.to_string(),
                });
            };
            if inner.is_empty() {
                (&piece[..open], Selector::Collection)
            } else {
                let index: usize =
                    inner
                        .parse()
                        .map_err(|_ignored| PathError::MalformedSegment {
                            raw: piece.to_string(),
                        })?;
                (&piece[..open], Selector::Element(index))
            }
        }
    };
    if name.is_empty() {
        return Err(PathError::EmptySegment {
            raw: raw.to_string(),
        });
    }
    Ok(Segment {
        name: name.to_string(),
        selector,
    })
}

// ============================================================================
// SECTION: Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::missing_docs_in_private_items,
        reason = "Test-only assertions and helpers are permitted."
    )]

    use super::*;

    #[test]
    fn parse_round_trips_display() {
        let path = Path::parse("household_members[2].income.amount").unwrap();
        assert_eq!(path.to_string(), "household_members[2].income.amount");
        assert_eq!(path.depth(), 3);
    }

    #[test]
    fn parent_of_root_fails() {
        assert_eq!(Path::root().parent(), Err(PathError::RootHasNoParent));
    }

    #[test]
    fn join_does_not_mutate_receiver() {
        let base = Path::parse("name").unwrap();
        let child = base.join("first");
        assert_eq!(base.to_string(), "name");
        assert_eq!(child.to_string(), "name.first");
        assert_eq!(child.parent().unwrap(), base);
    }

    #[test]
    fn collection_marker_and_index_transform() {
        let collection = Path::parse("members").unwrap().as_collection();
        assert!(collection.is_collection());
        assert_eq!(collection.to_string(), "members[]");
        let element = collection.at_index(1);
        assert!(!element.is_collection());
        assert_eq!(element.to_string(), "members[1]");
    }

    #[test]
    fn equality_is_by_segments() {
        let a = Path::parse("a.b[3].c").unwrap();
        let b = Path::root().join("a").join("b").at_index(3).join("c");
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_empty_and_malformed_segments() {
        assert!(matches!(
            Path::parse("a..b"),
            Err(PathError::EmptySegment { .. })
        ));
        assert!(matches!(
            Path::parse("a[x]"),
            Err(PathError::MalformedSegment { .. })
        ));
        assert!(matches!(
            Path::parse("[2]"),
            Err(PathError::EmptySegment { .. })
        ));
    }
}
