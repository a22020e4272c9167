//! FILENAME: crosstab-engine/src/grouping.rs
//! Grouping Index - selected records partitioned by (row key, column key).
//!
//! Built in one pass over the selection, then probed once per matrix cell.
//! This keeps a full recalculation linear in the record count instead of
//! rescanning the records for every intersection.

use rustc_hash::FxHashMap;

use crate::cache::{FieldIndex, PivotCache};
use crate::combination::GroupKey;

/// Record indices per (row combination, column combination).
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    groups: FxHashMap<GroupKey, FxHashMap<GroupKey, Vec<usize>>>,
    group_count: usize,
}

impl GroupIndex {
    /// Partitions the selected records. Record order is kept inside each group.
    pub fn build(
        cache: &PivotCache,
        selection: &[usize],
        row_fields: &[Option<FieldIndex>],
        col_fields: &[Option<FieldIndex>],
    ) -> Self {
        let mut groups: FxHashMap<GroupKey, FxHashMap<GroupKey, Vec<usize>>> = FxHashMap::default();
        let mut group_count = 0;

        for &record in selection {
            let row_key = GroupKey::for_record(cache, record, row_fields);
            let col_key = GroupKey::for_record(cache, record, col_fields);

            groups
                .entry(row_key)
                .or_default()
                .entry(col_key)
                .or_insert_with(|| {
                    group_count += 1;
                    Vec::new()
                })
                .push(record);
        }

        GroupIndex {
            groups,
            group_count,
        }
    }

    /// The records of one intersection; empty when nothing matched.
    pub fn get(&self, row: &GroupKey, col: &GroupKey) -> &[usize] {
        self.groups
            .get(row)
            .and_then(|cols| cols.get(col))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of non-empty intersections.
    pub fn group_count(&self) -> usize {
        self.group_count
    }
}
