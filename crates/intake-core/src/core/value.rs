// crates/intake-core/src/core/value.rs
// ============================================================================
// Module: Intake Scalar Values
// Description: Closed tagged-variant scalar values and declared scalar types.
// Purpose: Coerce semi-structured answers at the document boundary using the
//          schema's declared type, never inferring type from runtime shape.
// Dependencies: crate::core::path, serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Every answer in the document is one of a closed set of scalar shapes:
//! text, 64-bit integer, calendar date, or list of strings. The schema
//! declares which [`ScalarType`] each question scalar holds; reads, writes,
//! and raw form-input parsing all coerce through that declaration.
//!
//! Dates parse and render as date-only ISO strings (`YYYY-MM-DD`) and
//! compare as unix milliseconds at UTC midnight.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use time::Date;

use crate::core::path::Path;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Reserved key holding an entity's display name inside a collection entry.
pub const ENTITY_NAME_KEY: &str = "entity_name";

/// Milliseconds per day, for date-to-epoch conversion.
const MILLIS_PER_DAY: i64 = 86_400_000;

/// Julian day number of the unix epoch (1970-01-01).
const UNIX_EPOCH_JULIAN_DAY: i64 = 2_440_588;

// ============================================================================
// SECTION: Scalar Types
// ============================================================================

/// Declared type of one question scalar.
///
/// # Invariants
/// - Variants are stable for serialization and schema matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    /// Free text.
    Text,
    /// 64-bit signed integer.
    Long,
    /// Calendar date (date-only, UTC).
    Date,
    /// Single selected option value.
    Selection,
    /// Multiple selected option values.
    Selections,
    /// Key of an uploaded file, written by the upload collaborator.
    FileKey,
    /// Enumerator answer: ordered list of entity display names.
    EntityNames,
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Text => "text",
            Self::Long => "long",
            Self::Date => "date",
            Self::Selection => "selection",
            Self::Selections => "selections",
            Self::FileKey => "file_key",
            Self::EntityNames => "entity_names",
        };
        f.write_str(label)
    }
}

// ============================================================================
// SECTION: Scalar Values
// ============================================================================

/// Wire representation for [`ScalarValue`], keeping dates as ISO strings.
#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
enum ScalarValueRepr {
    /// Text value.
    Text(String),
    /// Integer value.
    Long(i64),
    /// Date value as `YYYY-MM-DD`.
    Date(String),
    /// List-of-strings value.
    TextList(Vec<String>),
}

/// One concrete answer value.
///
/// # Invariants
/// - The variant set is closed; no untyped object trees cross this boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScalarValueRepr", into = "ScalarValueRepr")]
pub enum ScalarValue {
    /// Text, selection, or file-key value.
    Text(String),
    /// 64-bit signed integer value.
    Long(i64),
    /// Calendar date value.
    Date(Date),
    /// List of strings (multi-selection or entity names).
    TextList(Vec<String>),
}

impl ScalarValue {
    /// Converts the value to its JSON document form.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Long(number) => Value::Number((*number).into()),
            Self::Date(date) => Value::String(format_iso_date(*date)),
            Self::TextList(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }

    /// Coerces a JSON document node to `expected`, or `None` on mismatch.
    ///
    /// Entity-name lists accept both plain string arrays and arrays of
    /// entity objects carrying [`ENTITY_NAME_KEY`].
    #[must_use]
    pub fn from_json(node: &Value, expected: ScalarType) -> Option<Self> {
        match expected {
            ScalarType::Text | ScalarType::Selection | ScalarType::FileKey => match node {
                Value::String(text) => Some(Self::Text(text.clone())),
                _ => None,
            },
            ScalarType::Long => node.as_i64().map(Self::Long),
            ScalarType::Date => match node {
                Value::String(text) => parse_iso_date(text).map(Self::Date),
                _ => None,
            },
            ScalarType::Selections | ScalarType::EntityNames => match node {
                Value::Array(items) => {
                    let mut out = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            Value::String(text) => out.push(text.clone()),
                            Value::Object(map) => {
                                out.push(map.get(ENTITY_NAME_KEY)?.as_str()?.to_string());
                            }
                            _ => return None,
                        }
                    }
                    Some(Self::TextList(out))
                }
                _ => None,
            },
        }
    }

    /// Orders two values of the same variant, when an ordering exists.
    ///
    /// Dates order by unix milliseconds at UTC midnight; text orders
    /// lexicographically; lists have no ordering.
    #[must_use]
    pub fn partial_cmp_same(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Long(left), Self::Long(right)) => Some(left.cmp(right)),
            (Self::Date(left), Self::Date(right)) => {
                Some(date_unix_millis(*left).cmp(&date_unix_millis(*right)))
            }
            (Self::Text(left), Self::Text(right)) => Some(left.cmp(right)),
            _ => None,
        }
    }
}

impl From<ScalarValue> for ScalarValueRepr {
    fn from(value: ScalarValue) -> Self {
        match value {
            ScalarValue::Text(text) => Self::Text(text),
            ScalarValue::Long(number) => Self::Long(number),
            ScalarValue::Date(date) => Self::Date(format_iso_date(date)),
            ScalarValue::TextList(items) => Self::TextList(items),
        }
    }
}

impl TryFrom<ScalarValueRepr> for ScalarValue {
    type Error = String;

    fn try_from(repr: ScalarValueRepr) -> Result<Self, Self::Error> {
        match repr {
            ScalarValueRepr::Text(text) => Ok(Self::Text(text)),
            ScalarValueRepr::Long(number) => Ok(Self::Long(number)),
            ScalarValueRepr::Date(raw) => parse_iso_date(&raw)
                .map(Self::Date)
                .ok_or_else(|| format!("invalid date `{raw}`")),
            ScalarValueRepr::TextList(items) => Ok(Self::TextList(items)),
        }
    }
}

// ============================================================================
// SECTION: Raw Input Parsing
// ============================================================================

impl ScalarType {
    /// Parses raw applicant form input into a typed value.
    ///
    /// List-typed scalars split on commas and trim whitespace per element.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrorKind::Malformed`] when the raw text cannot be
    /// parsed as this type.
    pub fn parse_input(self, raw: &str) -> Result<ScalarValue, ValidationErrorKind> {
        match self {
            Self::Text | Self::Selection | Self::FileKey => {
                Ok(ScalarValue::Text(raw.to_string()))
            }
            Self::Long => raw
                .trim()
                .parse::<i64>()
                .map(ScalarValue::Long)
                .map_err(|_ignored| ValidationErrorKind::Malformed {
                    expected: self,
                    raw: raw.to_string(),
                }),
            Self::Date => parse_iso_date(raw.trim()).map(ScalarValue::Date).ok_or(
                ValidationErrorKind::Malformed {
                    expected: self,
                    raw: raw.to_string(),
                },
            ),
            Self::Selections | Self::EntityNames => {
                let items: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(ToString::to_string)
                    .collect();
                Ok(ScalarValue::TextList(items))
            }
        }
    }
}

// ============================================================================
// SECTION: Validation Errors
// ============================================================================

/// Recoverable, per-question validation failure.
///
/// # Invariants
/// - `path` addresses the offending scalar within the answer document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Path of the offending scalar.
    pub path: Path,
    /// Failure detail.
    pub kind: ValidationErrorKind,
}

/// Kinds of recoverable validation failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Raw input could not be parsed as the declared type.
    #[error("value `{raw}` is not a valid {expected}")]
    Malformed {
        /// Declared scalar type.
        expected: ScalarType,
        /// Raw input text.
        raw: String,
    },
    /// Stored value exists but cannot be coerced to the declared type.
    #[error("stored value cannot be read as {expected}")]
    TypeMismatch {
        /// Declared scalar type.
        expected: ScalarType,
    },
    /// Text answer is shorter than the declared minimum length.
    #[error("answer length {actual} is below the minimum of {min}")]
    TooShort {
        /// Declared minimum length.
        min: usize,
        /// Actual answer length.
        actual: usize,
    },
    /// Text answer is longer than the declared maximum length.
    #[error("answer length {actual} exceeds the maximum of {max}")]
    TooLong {
        /// Declared maximum length.
        max: usize,
        /// Actual answer length.
        actual: usize,
    },
}

// ============================================================================
// SECTION: Date Helpers
// ============================================================================

/// Parses a date-only ISO value (`YYYY-MM-DD`).
#[must_use]
pub fn parse_iso_date(value: &str) -> Option<Date> {
    let mut parts = value.split('-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let month = time::Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

/// Renders a date as a date-only ISO string (`YYYY-MM-DD`).
#[must_use]
pub fn format_iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Converts a date to unix milliseconds at UTC midnight.
#[must_use]
pub fn date_unix_millis(date: Date) -> i64 {
    (i64::from(date.to_julian_day()) - UNIX_EPOCH_JULIAN_DAY) * MILLIS_PER_DAY
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
    fn date_epoch_millis_at_utc_midnight() {
        let epoch = parse_iso_date("1970-01-01").unwrap();
        assert_eq!(date_unix_millis(epoch), 0);
        let next_day = parse_iso_date("1970-01-02").unwrap();
        assert_eq!(date_unix_millis(next_day), MILLIS_PER_DAY);
    }

    #[test]
    fn selections_input_splits_and_trims() {
        let parsed = ScalarType::Selections.parse_input(" red ,blue , ,green").unwrap();
        assert_eq!(
            parsed,
            ScalarValue::TextList(vec![
                "red".to_string(),
                "blue".to_string(),
                "green".to_string()
            ])
        );
    }

    #[test]
    fn long_input_rejects_non_numeric() {
        let error = ScalarType::Long.parse_input("12x").unwrap_err();
        assert!(matches!(error, ValidationErrorKind::Malformed { .. }));
    }

    #[test]
    fn entity_names_coerce_from_object_array() {
        let node = serde_json::json!([
            { "entity_name": "Alice" },
            { "entity_name": "Bob", "income": { "amount": 10 } }
        ]);
        assert_eq!(
            ScalarValue::from_json(&node, ScalarType::EntityNames),
            Some(ScalarValue::TextList(vec![
                "Alice".to_string(),
                "Bob".to_string()
            ]))
        );
    }
}
