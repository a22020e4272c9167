//! FILENAME: crosstab-engine/src/field_type.rs
//! Field type inference and the single numeric coercion used by aggregation.
//!
//! A field's type is decided once, at ingestion, from the first record that
//! holds a non-blank value for it. It is a hint for the configuration surface
//! (e.g. the default aggregator); the engine itself always works on the raw
//! strings and their numeric coercion.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Inferred type of a source field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Number,
    Date,
    String,
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::String
    }
}

/// A named source field with its inferred type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Field {
            name: name.into(),
            field_type,
        }
    }
}

/// Date layouts accepted without a time component.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
];

/// Date-time layouts accepted in addition to RFC 3339 / RFC 2822.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Classifies a raw value.
///
/// Blank → `String`; a full numeric parse → `Number`; a calendar date → `Date`;
/// anything else → `String`. Numbers win over dates, so `"2024"` is a number.
pub fn infer_field_type(raw: &str) -> FieldType {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return FieldType::String;
    }
    if parse_number(trimmed).is_some() {
        return FieldType::Number;
    }
    if parse_date(trimmed).is_some() {
        return FieldType::Date;
    }
    FieldType::String
}

/// Coerces a raw value to a finite number.
///
/// Surrounding whitespace is ignored. Blank, non-numeric and non-finite
/// inputs yield `None` so that numeric aggregators can skip them.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let radix = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .iter()
        .find_map(|(prefix, radix)| s.strip_prefix(prefix).map(|digits| (digits, *radix)));
    if let Some((digits, radix)) = radix {
        return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
    }

    // Rust accepts "inf"/"nan" spellings that are not numbers in tabular data.
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }

    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parses a calendar date in one of the common textual layouts.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}
