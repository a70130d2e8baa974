// crates/intake-core/src/core/time.rs
// ============================================================================
// Module: Intake Time Model
// Description: Caller-supplied timestamps for provenance metadata.
// Purpose: Keep the engine deterministic by never reading wall-clock time.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The engine records when an answer was written, but never reads the wall
//! clock itself: hosts pass a [`Timestamp`] into the staging transaction.
//! This keeps resolution and staging replayable from inputs alone.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Unix-epoch-milliseconds timestamp supplied by the caller.
///
/// # Invariants
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix milliseconds.
    #[must_use]
    pub const fn unix_millis(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
