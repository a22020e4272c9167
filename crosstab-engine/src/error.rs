//! FILENAME: crosstab-engine/src/error.rs

use thiserror::Error;

/// Errors raised while loading records or configuration.
///
/// Pivot calculation itself never fails: malformed configuration degrades
/// to empty or "no value" results instead.
#[derive(Error, Debug)]
pub enum PivotError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid records: {0}")]
    InvalidRecords(String),
}
