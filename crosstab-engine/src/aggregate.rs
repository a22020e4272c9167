//! FILENAME: crosstab-engine/src/aggregate.rs
//! Aggregator - reduces a group's records into one value per measure.
//!
//! `count` counts records whatever their value. The numeric reducers only see
//! values that coerce to a number; blanks and text are skipped. A reducer
//! with nothing to reduce yields `None` ("no value"), never zero, and so does
//! every measure of an empty group.

use crate::cache::{FieldIndex, PivotCache};
use crate::definition::AggregationType;

// ============================================================================
// MEASURE
// ============================================================================

/// A configured measure resolved against the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measure {
    /// Source field; `None` when the name is unknown (every value blank).
    pub field: Option<FieldIndex>,
    pub aggregation: AggregationType,
}

impl Measure {
    pub fn new(field: Option<FieldIndex>, aggregation: AggregationType) -> Self {
        Measure { field, aggregation }
    }
}

// ============================================================================
// AGGREGATE ACCUMULATOR
// ============================================================================

/// Running state for all supported reducers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregateAccumulator {
    /// Records seen, numeric or not.
    pub count: u64,
    /// Records whose value coerced to a number.
    pub count_numbers: u64,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AggregateAccumulator {
    pub fn new() -> Self {
        AggregateAccumulator::default()
    }

    /// Adds a numeric value to the accumulator.
    pub fn add_number(&mut self, value: f64) {
        self.count += 1;
        self.count_numbers += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Adds a blank or non-numeric value (only increments count).
    pub fn add_non_number(&mut self) {
        self.count += 1;
    }

    /// Adds an optional coerced value.
    pub fn add(&mut self, value: Option<f64>) {
        match value {
            Some(n) => self.add_number(n),
            None => self.add_non_number(),
        }
    }

    /// Computes the final aggregate value.
    pub fn compute(&self, aggregation: AggregationType) -> Option<f64> {
        if self.count == 0 {
            return None;
        }

        match aggregation {
            AggregationType::Count => Some(self.count as f64),
            _ if self.count_numbers == 0 => None,
            AggregationType::Sum => Some(self.sum),
            AggregationType::Average => Some(self.sum / self.count_numbers as f64),
            AggregationType::Min => self.min,
            AggregationType::Max => self.max,
        }
    }
}

// ============================================================================
// CELL AGGREGATION
// ============================================================================

/// Aggregates one intersection: one entry per measure, in measure order.
pub fn aggregate_cell(cache: &PivotCache, records: &[usize], measures: &[Measure]) -> Vec<Option<f64>> {
    let mut accumulators = vec![AggregateAccumulator::new(); measures.len()];
    let source = cache.records();

    for &record in records {
        let record = &source[record];
        for (acc, measure) in accumulators.iter_mut().zip(measures.iter()) {
            let id = record.value_at(measure.field);
            acc.add(cache.number(measure.field, id));
        }
    }

    accumulators
        .iter()
        .zip(measures.iter())
        .map(|(acc, measure)| acc.compute(measure.aggregation))
        .collect()
}
