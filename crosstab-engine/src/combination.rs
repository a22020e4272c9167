//! FILENAME: crosstab-engine/src/combination.rs
//! Combination Enumerator - the distinct value tuples of each axis.
//!
//! The two axes are enumerated differently on purpose:
//! - Rows follow the order in which tuples are first met in the data.
//! - Columns are the cartesian product of each field's sorted distinct values,
//!   so headers stay put no matter how the rows are ordered.
//!
//! Tuples are keyed by interned ids, never by joined strings, so values that
//! contain a separator cannot collide.

use std::cmp::Ordering;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cache::{FieldIndex, PivotCache, ValueId};
use crate::definition::SortDirection;

// ============================================================================
// GROUP KEY
// ============================================================================

/// One combination: a value id per axis field, outer field first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GroupKey {
    pub values: SmallVec<[ValueId; 4]>,
}

impl GroupKey {
    pub fn new(values: SmallVec<[ValueId; 4]>) -> Self {
        GroupKey { values }
    }

    /// The single combination of an axis with no fields.
    pub fn empty() -> Self {
        GroupKey::default()
    }

    /// Builds the key of a record on an axis.
    pub fn for_record(cache: &PivotCache, record: usize, fields: &[Option<FieldIndex>]) -> Self {
        let record = &cache.records()[record];
        GroupKey {
            values: fields.iter().map(|&fi| record.value_at(fi)).collect(),
        }
    }

    /// The raw strings of this combination, one per axis field.
    pub fn labels(&self, cache: &PivotCache, fields: &[Option<FieldIndex>]) -> Vec<String> {
        self.values
            .iter()
            .zip(fields.iter())
            .map(|(&id, &fi)| cache.label(fi, id).to_string())
            .collect()
    }
}

/// Resolves axis field names against the cache. Unknown names stay `None`.
pub fn resolve_axis<S: AsRef<str>>(cache: &PivotCache, names: &[S]) -> Vec<Option<FieldIndex>> {
    names.iter().map(|n| cache.resolve(n.as_ref())).collect()
}

// ============================================================================
// ENUMERATION
// ============================================================================

/// Row axis: distinct tuples in first-seen order over the selected records.
///
/// An axis without fields, or an empty selection, yields the single empty
/// combination.
pub fn row_combinations(
    cache: &PivotCache,
    selection: &[usize],
    fields: &[Option<FieldIndex>],
) -> Vec<GroupKey> {
    if fields.is_empty() || selection.is_empty() {
        return vec![GroupKey::empty()];
    }

    let mut seen: FxHashSet<GroupKey> = FxHashSet::default();
    let mut combos = Vec::new();

    for &record in selection {
        let key = GroupKey::for_record(cache, record, fields);
        if !seen.contains(&key) {
            seen.insert(key.clone());
            combos.push(key);
        }
    }

    combos
}

/// Column axis: the cartesian product of each field's distinct values,
/// each sorted ascending by raw string. The first field varies slowest.
///
/// An axis without fields, or an empty selection, yields the single empty
/// combination.
pub fn column_combinations(
    cache: &PivotCache,
    selection: &[usize],
    fields: &[Option<FieldIndex>],
) -> Vec<GroupKey> {
    if fields.is_empty() || selection.is_empty() {
        return vec![GroupKey::empty()];
    }

    let per_field: Vec<Vec<ValueId>> = fields
        .iter()
        .map(|&fi| sorted_distinct_values(cache, selection, fi))
        .collect();

    let mut combos = vec![GroupKey::empty()];
    for values in &per_field {
        let mut next = Vec::with_capacity(combos.len() * values.len());
        for prefix in &combos {
            for &id in values {
                let mut key = prefix.clone();
                key.values.push(id);
                next.push(key);
            }
        }
        combos = next;
    }

    combos
}

/// Distinct value ids of one field over the selection, sorted by raw string.
fn sorted_distinct_values(
    cache: &PivotCache,
    selection: &[usize],
    field: Option<FieldIndex>,
) -> Vec<ValueId> {
    let records = cache.records();
    let mut seen: FxHashSet<ValueId> = FxHashSet::default();
    let mut ids: Vec<ValueId> = Vec::new();

    for &record in selection {
        let id = records[record].value_at(field);
        if seen.insert(id) {
            ids.push(id);
        }
    }

    ids.sort_by(|&a, &b| cache.label(field, a).cmp(cache.label(field, b)));
    ids
}

// ============================================================================
// SORT POST-PASS
// ============================================================================

/// Stable re-sort of an axis by the raw string at one level.
///
/// Returns `false` (leaving the order untouched) when the level does not
/// exist on the axis or the direction is `None`.
pub fn sort_combinations(
    cache: &PivotCache,
    fields: &[Option<FieldIndex>],
    combos: &mut [GroupKey],
    level: usize,
    direction: SortDirection,
) -> bool {
    if level >= fields.len() || direction == SortDirection::None {
        return false;
    }

    let field = fields[level];
    combos.sort_by(|a, b| {
        let ordering: Ordering = label_at(cache, field, a, level).cmp(label_at(cache, field, b, level));
        match direction {
            SortDirection::Desc => ordering.reverse(),
            _ => ordering,
        }
    });
    true
}

fn label_at<'c>(cache: &'c PivotCache, field: Option<FieldIndex>, key: &GroupKey, level: usize) -> &'c str {
    key.values
        .get(level)
        .map(|&id| cache.label(field, id))
        .unwrap_or("")
}
