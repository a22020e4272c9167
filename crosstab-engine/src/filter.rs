//! FILENAME: crosstab-engine/src/filter.rs
//! Filter Engine - narrows the record set before anything is grouped.
//!
//! Each filter with a selected value keeps the records whose value equals
//! it; filters combine with AND. The comparison happens on interned ids, so
//! the selected string is resolved once per filter rather than per record.

use crate::cache::{PivotCache, ValueId, VALUE_ID_EMPTY};
use crate::definition::FilterSpec;

/// A filter resolved against the cache.
#[derive(Debug, Clone, Copy)]
struct ResolvedFilter {
    field: Option<usize>,
    /// `None` when the selected value never occurs in the field.
    value_id: Option<ValueId>,
}

/// Resolves the constraining filters. Filters without a selected value drop out.
fn resolve_filters(cache: &PivotCache, filters: &[FilterSpec]) -> Vec<ResolvedFilter> {
    filters
        .iter()
        .filter_map(|filter| {
            let selected = filter.filter_value.as_deref()?;
            let field = cache.resolve(&filter.field);
            let value_id = match field.and_then(|fi| cache.field(fi)) {
                Some(field_cache) => field_cache.id_of(selected),
                // Unknown fields read as blank everywhere
                None if selected.is_empty() => Some(VALUE_ID_EMPTY),
                None => None,
            };
            Some(ResolvedFilter { field, value_id })
        })
        .collect()
}

/// Returns the indices of the records that pass every filter, in record order.
pub fn apply_filters(cache: &PivotCache, filters: &[FilterSpec]) -> Vec<usize> {
    let resolved = resolve_filters(cache, filters);

    if resolved.iter().any(|f| f.value_id.is_none()) {
        return Vec::new();
    }

    cache
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            resolved
                .iter()
                .all(|f| Some(record.value_at(f.field)) == f.value_id)
        })
        .map(|(i, _)| i)
        .collect()
}
