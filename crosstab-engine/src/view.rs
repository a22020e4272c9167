//! FILENAME: crosstab-engine/src/view.rs
//! Pivot View - the calculation output handed to the presentation layer.
//!
//! This module holds:
//! - The dense `[row][column][measure]` matrix with its axis labels
//! - Row, column and grand totals
//! - Span maps for merged row labels and column headers
//! - Display helpers (number formatting, blank labels, implicit-count blanking)

use serde::{Deserialize, Serialize};

use crate::layout::{scale_spans, SpanMap};

/// Label shown for a blank axis value.
pub const BLANK_LABEL: &str = "(blank)";

/// Label of the measure substituted when none is configured.
pub const IMPLICIT_COUNT_LABEL: &str = "Count";

// ============================================================================
// TOTALS
// ============================================================================

/// Sums over present cells; absent cells contribute zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotTotals {
    /// Per row combination: sum over all columns and measures.
    pub row_totals: Vec<f64>,
    /// Per column combination: sum over all rows and measures.
    pub column_totals: Vec<f64>,
    pub grand_total: f64,
}

impl PivotTotals {
    /// Derives all totals from a dense matrix.
    pub fn from_matrix(matrix: &[Vec<Vec<Option<f64>>>], col_count: usize) -> Self {
        let mut row_totals = Vec::with_capacity(matrix.len());
        let mut column_totals = vec![0.0; col_count];

        for row in matrix {
            let mut row_total = 0.0;
            for (ci, cell) in row.iter().enumerate() {
                let cell_total: f64 = cell.iter().flatten().sum();
                row_total += cell_total;
                if let Some(total) = column_totals.get_mut(ci) {
                    *total += cell_total;
                }
            }
            row_totals.push(row_total);
        }

        let grand_total = column_totals.iter().sum();
        PivotTotals {
            row_totals,
            column_totals,
            grand_total,
        }
    }
}

// ============================================================================
// PIVOT RESULT
// ============================================================================

/// The full output of one calculation. Recomputed from scratch on every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotResult {
    pub row_fields: Vec<String>,
    pub col_fields: Vec<String>,

    /// Measure labels, e.g. `"Sales (SUM)"`, or `"Count"` when implicit.
    pub value_fields: Vec<String>,

    pub row_combinations: Vec<Vec<String>>,
    pub col_combinations: Vec<Vec<String>>,

    /// Indexed `[row][column][measure]`; `None` is "no value".
    pub matrix: Vec<Vec<Vec<Option<f64>>>>,

    /// No measure was configured and a `Count` was substituted.
    pub was_implicit: bool,

    pub totals: PivotTotals,

    /// Row label spans, `[row combination][row field]`.
    pub row_spans: SpanMap,

    /// Column label spans, `[column combination][column field]`.
    /// `None` when there are no column fields.
    pub column_spans: Option<SpanMap>,
}

impl PivotResult {
    pub fn row_count(&self) -> usize {
        self.row_combinations.len()
    }

    pub fn col_count(&self) -> usize {
        self.col_combinations.len()
    }

    pub fn value_count(&self) -> usize {
        self.value_fields.len()
    }

    /// The aggregated value of one cell; out-of-range indices read as "no value".
    pub fn cell(&self, row: usize, col: usize, value: usize) -> Option<f64> {
        self.matrix
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.get(value))
            .copied()
            .flatten()
    }

    /// True when nothing has been configured yet: no axis fields and an
    /// implicit measure. Hosts show a "drag fields here" hint instead of a table.
    pub fn is_placeholder(&self) -> bool {
        self.row_fields.is_empty() && self.col_fields.is_empty() && self.was_implicit
    }

    /// Column header spans in rendered columns (one per measure).
    pub fn column_header_spans(&self) -> Option<SpanMap> {
        self.column_spans
            .as_ref()
            .map(|spans| scale_spans(spans, self.value_count()))
    }

    /// Header text of a measure column; blank while the measure is implicit.
    pub fn display_value_header(&self, value: usize) -> String {
        if self.was_implicit {
            return String::new();
        }
        self.value_fields.get(value).cloned().unwrap_or_default()
    }

    pub fn display_cell(&self, row: usize, col: usize, value: usize) -> String {
        self.display(self.cell(row, col, value))
    }

    pub fn display_row_total(&self, row: usize) -> String {
        self.display(self.totals.row_totals.get(row).copied())
    }

    pub fn display_column_total(&self, col: usize) -> String {
        self.display(self.totals.column_totals.get(col).copied())
    }

    pub fn display_grand_total(&self) -> String {
        self.display(Some(self.totals.grand_total))
    }

    fn display(&self, value: Option<f64>) -> String {
        if self.was_implicit {
            String::new()
        } else {
            format_value(value)
        }
    }
}

// ============================================================================
// DRILL DOWN
// ============================================================================

/// The source records behind one matrix cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillDownResult {
    pub row_index: usize,
    pub col_index: usize,
    /// Record indices in ingestion order, at most `max_records` of them.
    pub records: Vec<usize>,
    pub total_count: usize,
    pub max_records: usize,
    pub is_truncated: bool,
}

impl DrillDownResult {
    pub fn new(row_index: usize, col_index: usize, max_records: usize) -> Self {
        DrillDownResult {
            row_index,
            col_index,
            max_records,
            ..Default::default()
        }
    }
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Formats a cell value: blank for "no value", no decimals for whole
/// numbers, two decimals otherwise.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        None => String::new(),
        Some(v) if v == 0.0 => "0".to_string(),
        Some(v) if v.fract() == 0.0 => format!("{:.0}", v),
        Some(v) => format!("{:.2}", v),
    }
}

/// Axis label text; blank values render as `(blank)`.
pub fn display_label(raw: &str) -> &str {
    if raw.is_empty() {
        BLANK_LABEL
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result(was_implicit: bool) -> PivotResult {
        let matrix = vec![
            vec![vec![Some(1.0), Some(2.5)], vec![None, Some(4.0)]],
            vec![vec![None, None], vec![Some(3.0), None]],
        ];
        let totals = PivotTotals::from_matrix(&matrix, 2);
        PivotResult {
            row_fields: vec!["Region".to_string()],
            col_fields: vec!["Quarter".to_string()],
            value_fields: vec!["Sales (SUM)".to_string(), "Sales (AVG)".to_string()],
            row_combinations: vec![vec!["North".to_string()], vec!["South".to_string()]],
            col_combinations: vec![vec!["Q1".to_string()], vec!["Q2".to_string()]],
            matrix,
            was_implicit,
            totals,
            row_spans: vec![vec![1], vec![1]],
            column_spans: Some(vec![vec![1], vec![1]]),
        }
    }

    #[test]
    fn test_totals_skip_absent_cells() {
        let result = sample_result(false);
        assert_eq!(result.totals.row_totals, vec![7.5, 3.0]);
        assert_eq!(result.totals.column_totals, vec![3.5, 7.0]);
        assert_eq!(result.totals.grand_total, 10.5);
    }

    #[test]
    fn test_cell_out_of_range_is_no_value() {
        let result = sample_result(false);
        assert_eq!(result.cell(0, 0, 1), Some(2.5));
        assert_eq!(result.cell(1, 0, 0), None);
        assert_eq!(result.cell(9, 0, 0), None);
    }

    #[test]
    fn test_display_helpers() {
        let result = sample_result(false);
        assert_eq!(result.display_cell(0, 0, 0), "1");
        assert_eq!(result.display_cell(0, 0, 1), "2.50");
        assert_eq!(result.display_cell(1, 0, 0), "");
        assert_eq!(result.display_row_total(0), "7.50");
        assert_eq!(result.display_grand_total(), "10.50");
        assert_eq!(result.display_value_header(1), "Sales (AVG)");
    }

    #[test]
    fn test_implicit_result_displays_blank() {
        let result = sample_result(true);
        assert_eq!(result.display_cell(0, 0, 0), "");
        assert_eq!(result.display_row_total(0), "");
        assert_eq!(result.display_column_total(1), "");
        assert_eq!(result.display_grand_total(), "");
        assert_eq!(result.display_value_header(0), "");
        assert!(!result.is_placeholder());
    }

    #[test]
    fn test_column_header_spans_scale_by_measures() {
        let mut result = sample_result(false);
        result.column_spans = Some(vec![vec![2], vec![0]]);
        assert_eq!(result.column_header_spans(), Some(vec![vec![4], vec![0]]));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(None), "");
        assert_eq!(format_value(Some(0.0)), "0");
        assert_eq!(format_value(Some(-0.0)), "0");
        assert_eq!(format_value(Some(12.0)), "12");
        assert_eq!(format_value(Some(-3.0)), "-3");
        assert_eq!(format_value(Some(3.14159)), "3.14");
        assert_eq!(format_value(Some(2.5)), "2.50");
    }

    #[test]
    fn test_display_label() {
        assert_eq!(display_label(""), BLANK_LABEL);
        assert_eq!(display_label("North"), "North");
    }
}
