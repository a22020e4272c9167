//! FILENAME: crosstab-engine/src/engine.rs
//! Pivot Engine - The calculation core that turns records into a pivot result.
//!
//! This module takes a PivotConfiguration (what goes where) and a PivotCache
//! (the records) and produces a PivotResult (matrix, totals, spans).
//!
//! Algorithm:
//! 1. Apply filters to select records
//! 2. Enumerate row combinations (first-seen) and column combinations (sorted product)
//! 3. Apply the optional sort post-pass to one axis
//! 4. Index the selected records by (row key, column key) in one pass
//! 5. Aggregate every intersection for every measure
//! 6. Derive totals and label spans
//!
//! The calculation is a pure function of its inputs: it holds no state
//! between calls and never fails. Unknown fields read as blank.

use rustc_hash::FxHashSet;

use crate::aggregate::{aggregate_cell, Measure};
use crate::cache::{FieldIndex, PivotCache, ValueId};
use crate::combination::{
    column_combinations, resolve_axis, row_combinations, sort_combinations, GroupKey,
};
use crate::definition::{
    AggregationType, PivotConfiguration, SortAxis, SortDirection, SortSpec,
};
use crate::filter::apply_filters;
use crate::grouping::GroupIndex;
use crate::layout::compute_spans;
use crate::logging::{log_debug, log_enter, log_exit, log_warn, CAT_PIVOT};
use crate::view::{DrillDownResult, PivotResult, PivotTotals, IMPLICIT_COUNT_LABEL};

// ============================================================================
// PREPARED AXES
// ============================================================================

/// Everything up to and including the grouping index.
/// Shared by the full calculation and by drill-down.
struct PreparedAxes {
    row_combos: Vec<GroupKey>,
    col_combos: Vec<GroupKey>,
    index: GroupIndex,
    selected: usize,
}

// ============================================================================
// PIVOT CALCULATOR
// ============================================================================

/// The main calculation engine for pivot tables.
pub struct PivotCalculator<'a> {
    cache: &'a PivotCache,
    config: &'a PivotConfiguration,
    sort: Option<&'a SortSpec>,

    /// Row field positions (None for unknown names).
    row_fields: Vec<Option<FieldIndex>>,

    /// Column field positions (None for unknown names).
    col_fields: Vec<Option<FieldIndex>>,

    /// Measures in display order; the implicit count when none is configured.
    measures: Vec<Measure>,

    /// Display labels, parallel to `measures`.
    measure_labels: Vec<String>,

    was_implicit: bool,
}

impl<'a> PivotCalculator<'a> {
    /// Creates a new calculator instance.
    pub fn new(
        cache: &'a PivotCache,
        config: &'a PivotConfiguration,
        sort: Option<&'a SortSpec>,
    ) -> Self {
        let row_fields = resolve_axis(cache, &config.row_fields);
        let col_fields = resolve_axis(cache, &config.col_fields);

        let was_implicit = config.value_specs.is_empty();
        let (measures, measure_labels): (Vec<Measure>, Vec<String>) = if was_implicit {
            (
                vec![Measure::new(None, AggregationType::Count)],
                vec![IMPLICIT_COUNT_LABEL.to_string()],
            )
        } else {
            config
                .value_specs
                .iter()
                .map(|spec| {
                    (
                        Measure::new(cache.resolve(&spec.field), spec.aggregator),
                        spec.label(),
                    )
                })
                .unzip()
        };

        PivotCalculator {
            cache,
            config,
            sort,
            row_fields,
            col_fields,
            measures,
            measure_labels,
            was_implicit,
        }
    }

    /// Executes the full calculation.
    pub fn calculate(&self) -> PivotResult {
        // Steps 1-4: filter, enumerate, sort, index
        let prepared = self.prepare();

        // Step 5: aggregate every intersection
        let matrix: Vec<Vec<Vec<Option<f64>>>> = prepared
            .row_combos
            .iter()
            .map(|row| {
                prepared
                    .col_combos
                    .iter()
                    .map(|col| aggregate_cell(self.cache, prepared.index.get(row, col), &self.measures))
                    .collect()
            })
            .collect();

        // Step 6: totals and spans
        let totals = PivotTotals::from_matrix(&matrix, prepared.col_combos.len());

        let row_combinations = self.labels(&prepared.row_combos, &self.row_fields);
        let col_combinations = self.labels(&prepared.col_combos, &self.col_fields);

        let row_spans = compute_spans(&row_combinations, self.row_fields.len());
        let column_spans = if self.col_fields.is_empty() {
            None
        } else {
            Some(compute_spans(&col_combinations, self.col_fields.len()))
        };

        log_debug!(
            CAT_PIVOT,
            "calculated selected={} groups={} matrix={}x{}x{} implicit={}",
            prepared.selected,
            prepared.index.group_count(),
            row_combinations.len(),
            col_combinations.len(),
            self.measures.len(),
            self.was_implicit
        );

        PivotResult {
            row_fields: self.config.row_fields.clone(),
            col_fields: self.config.col_fields.clone(),
            value_fields: self.measure_labels.clone(),
            row_combinations,
            col_combinations,
            matrix,
            was_implicit: self.was_implicit,
            totals,
            row_spans,
            column_spans,
        }
    }

    /// Collects the source records behind one cell of the result.
    pub fn drill_down(&self, row_index: usize, col_index: usize, max_records: usize) -> DrillDownResult {
        let mut result = DrillDownResult::new(row_index, col_index, max_records);
        let prepared = self.prepare();

        let (Some(row), Some(col)) = (
            prepared.row_combos.get(row_index),
            prepared.col_combos.get(col_index),
        ) else {
            return result;
        };

        let records = prepared.index.get(row, col);
        result.total_count = records.len();
        result.records = records.iter().take(max_records).copied().collect();
        result.is_truncated = records.len() > max_records;
        result
    }

    fn prepare(&self) -> PreparedAxes {
        let selection = apply_filters(self.cache, &self.config.filters);

        let mut row_combos = row_combinations(self.cache, &selection, &self.row_fields);
        let mut col_combos = column_combinations(self.cache, &selection, &self.col_fields);

        if let Some(sort) = self.sort {
            self.apply_sort(sort, &mut row_combos, &mut col_combos);
        }

        let index = GroupIndex::build(self.cache, &selection, &self.row_fields, &self.col_fields);

        PreparedAxes {
            row_combos,
            col_combos,
            index,
            selected: selection.len(),
        }
    }

    /// Re-sorts one axis. A level that does not exist is ignored.
    fn apply_sort(&self, sort: &SortSpec, rows: &mut [GroupKey], cols: &mut [GroupKey]) {
        let (fields, combos) = match sort.axis {
            SortAxis::Row => (&self.row_fields, rows),
            SortAxis::Column => (&self.col_fields, cols),
        };

        let applied = sort_combinations(self.cache, fields, combos, sort.level_index, sort.direction);
        if !applied && sort.direction != SortDirection::None {
            log_warn!(
                CAT_PIVOT,
                "ignoring sort on {:?} level {} (axis has {} fields)",
                sort.axis,
                sort.level_index,
                fields.len()
            );
        }
    }

    fn labels(&self, combos: &[GroupKey], fields: &[Option<FieldIndex>]) -> Vec<Vec<String>> {
        combos.iter().map(|c| c.labels(self.cache, fields)).collect()
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Calculates a pivot result from records and configuration.
/// This is the main entry point for the calculation engine.
pub fn calculate_pivot(
    cache: &PivotCache,
    config: &PivotConfiguration,
    sort: Option<&SortSpec>,
) -> PivotResult {
    log_enter!(
        CAT_PIVOT,
        "calculate_pivot",
        "records={} rows={} cols={} values={} filters={}",
        cache.record_count(),
        config.row_fields.len(),
        config.col_fields.len(),
        config.value_specs.len(),
        config.filters.len()
    );

    let result = PivotCalculator::new(cache, config, sort).calculate();

    log_exit!(
        CAT_PIVOT,
        "calculate_pivot",
        "{}x{}x{}",
        result.row_count(),
        result.col_count(),
        result.value_count()
    );
    result
}

/// Performs a drill-down operation to get the source records of a cell.
/// Indices refer to the result the same configuration and sort produce.
pub fn drill_down(
    cache: &PivotCache,
    config: &PivotConfiguration,
    sort: Option<&SortSpec>,
    row_index: usize,
    col_index: usize,
    max_records: usize,
) -> DrillDownResult {
    PivotCalculator::new(cache, config, sort).drill_down(row_index, col_index, max_records)
}

/// Distinct values of a field over all records, in first-seen order.
/// Blank is listed as `""`. Populates the filter drop-down.
pub fn filter_options(cache: &PivotCache, field: &str) -> Vec<String> {
    let field = cache.resolve(field);
    let mut seen: FxHashSet<ValueId> = FxHashSet::default();

    cache
        .records()
        .iter()
        .map(|record| record.value_at(field))
        .filter(|&id| seen.insert(id))
        .map(|id| cache.label(field, id).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_cache() -> PivotCache {
        let mut cache = PivotCache::new(&["Region", "Product", "Sales"]);
        cache.add_record(&["North", "Apples", "100"]);
        cache.add_record(&["North", "Oranges", "150"]);
        cache.add_record(&["South", "Apples", "200"]);
        cache.add_record(&["South", "Oranges", "250"]);
        cache.add_record(&["North", "Apples", "50"]);
        cache
    }

    fn create_test_config() -> PivotConfiguration {
        PivotConfiguration::new()
            .with_rows(["Region"])
            .with_cols(["Product"])
            .with_value("Sales", AggregationType::Sum)
    }

    #[test]
    fn test_basic_pivot_calculation() {
        let cache = create_test_cache();
        let result = calculate_pivot(&cache, &create_test_config(), None);

        assert_eq!(result.row_combinations, vec![vec!["North"], vec!["South"]]);
        assert_eq!(result.col_combinations, vec![vec!["Apples"], vec!["Oranges"]]);
        assert_eq!(result.value_fields, vec!["Sales (SUM)"]);
        assert_eq!(result.cell(0, 0, 0), Some(150.0));
        assert_eq!(result.cell(0, 1, 0), Some(150.0));
        assert_eq!(result.cell(1, 0, 0), Some(200.0));
        assert_eq!(result.cell(1, 1, 0), Some(250.0));
        assert!(!result.was_implicit);
    }

    #[test]
    fn test_totals() {
        let cache = create_test_cache();
        let result = calculate_pivot(&cache, &create_test_config(), None);

        assert_eq!(result.totals.row_totals, vec![300.0, 450.0]);
        assert_eq!(result.totals.column_totals, vec![350.0, 400.0]);
        assert_eq!(result.totals.grand_total, 750.0);
    }

    #[test]
    fn test_no_row_fields() {
        let cache = create_test_cache();
        let mut config = create_test_config();
        config.row_fields.clear();

        let result = calculate_pivot(&cache, &config, None);
        assert_eq!(result.row_combinations, vec![Vec::<String>::new()]);
        assert_eq!(result.cell(0, 0, 0), Some(350.0));
        assert_eq!(result.row_spans, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_no_column_fields() {
        let cache = create_test_cache();
        let mut config = create_test_config();
        config.col_fields.clear();

        let result = calculate_pivot(&cache, &config, None);
        assert_eq!(result.col_count(), 1);
        assert_eq!(result.cell(1, 0, 0), Some(450.0));
        assert!(result.column_spans.is_none());
    }

    #[test]
    fn test_no_value_fields_uses_implicit_count() {
        let cache = create_test_cache();
        let mut config = create_test_config();
        config.value_specs.clear();

        let result = calculate_pivot(&cache, &config, None);
        assert!(result.was_implicit);
        assert_eq!(result.value_fields, vec!["Count"]);
        assert_eq!(result.cell(0, 0, 0), Some(2.0));
        assert_eq!(result.display_cell(0, 0, 0), "");
    }

    #[test]
    fn test_multiple_measures_on_same_field() {
        let cache = create_test_cache();
        let config = create_test_config()
            .with_value("Sales", AggregationType::Average)
            .with_value("Sales", AggregationType::Count);

        let result = calculate_pivot(&cache, &config, None);
        assert_eq!(result.value_fields, vec!["Sales (SUM)", "Sales (AVG)", "Sales (COUNT)"]);
        assert_eq!(result.matrix[0][0], vec![Some(150.0), Some(75.0), Some(2.0)]);
    }

    #[test]
    fn test_filter_applied_before_enumeration() {
        let cache = create_test_cache();
        let config = create_test_config().with_filter("Product", Some("Oranges"));

        let result = calculate_pivot(&cache, &config, None);
        assert_eq!(result.col_combinations, vec![vec!["Oranges"]]);
        assert_eq!(result.totals.grand_total, 400.0);
    }

    #[test]
    fn test_row_sort_post_pass() {
        let cache = create_test_cache();
        let sort = SortSpec::new(SortAxis::Row, 0, SortDirection::Desc);

        let result = calculate_pivot(&cache, &create_test_config(), Some(&sort));
        assert_eq!(result.row_combinations, vec![vec!["South"], vec!["North"]]);
        assert_eq!(result.cell(0, 0, 0), Some(200.0));
    }

    #[test]
    fn test_out_of_range_sort_is_ignored() {
        let cache = create_test_cache();
        let sort = SortSpec::new(SortAxis::Column, 3, SortDirection::Desc);

        let sorted = calculate_pivot(&cache, &create_test_config(), Some(&sort));
        let plain = calculate_pivot(&cache, &create_test_config(), None);
        assert_eq!(sorted, plain);
    }

    #[test]
    fn test_drill_down() {
        let cache = create_test_cache();
        let config = create_test_config();

        let result = drill_down(&cache, &config, None, 0, 0, 10);
        assert_eq!(result.records, vec![0, 4]);
        assert_eq!(result.total_count, 2);
        assert!(!result.is_truncated);

        let truncated = drill_down(&cache, &config, None, 0, 0, 1);
        assert_eq!(truncated.records, vec![0]);
        assert!(truncated.is_truncated);

        let outside = drill_down(&cache, &config, None, 7, 0, 10);
        assert!(outside.records.is_empty());
        assert_eq!(outside.total_count, 0);
    }

    #[test]
    fn test_filter_options() {
        let mut cache = PivotCache::new(&["f"]);
        cache.add_record(&["b"]);
        cache.add_record(&[""]);
        cache.add_record(&["a"]);
        cache.add_record(&["b"]);

        assert_eq!(filter_options(&cache, "f"), vec!["b", "", "a"]);
        assert_eq!(filter_options(&cache, "missing"), vec![""]);
    }
}
