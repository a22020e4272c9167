//! FILENAME: crosstab-engine/src/cache.rs
//! Pivot Cache - Interned, row-oriented storage of the ingested records.
//!
//! The cache is designed for:
//! - A single O(n) build from source records
//! - Instant re-grouping when fields are rearranged (no re-parse)
//! - Memory-efficient storage via value interning
//! - One numeric coercion per distinct value, never per comparison
//!
//! Architecture:
//! - Each distinct raw string of a field is stored once and referenced by id
//! - Records are vectors of ids, indexed by field position
//! - Field names resolve to positions through a hash map; unknown names
//!   resolve to nothing and read as blank everywhere

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::PivotError;
use crate::field_type::{infer_field_type, parse_number, Field, FieldType};
use crate::logging::{log_debug, CAT_CACHE};

// ============================================================================
// VALUE INTERNING
// ============================================================================

/// A reference to an interned value within a field's unique value store.
/// Using u32 to save memory (supports up to 4B unique values per field).
pub type ValueId = u32;

/// The blank value: an empty string, a missing key, or an unknown field.
pub const VALUE_ID_EMPTY: ValueId = u32::MAX;

/// Index of a field (column) in the cache.
pub type FieldIndex = usize;

// ============================================================================
// FIELD CACHE
// ============================================================================

/// Cache for a single field (column) from the source data.
/// Stores unique values and provides O(1) lookup by ValueId.
#[derive(Debug, Clone)]
pub struct FieldCache {
    /// Field name (from the header or the first record's keys).
    pub name: String,

    /// Inferred type, decided by the first non-blank sample.
    field_type: Option<FieldType>,

    /// Map from raw value to its unique ID (for deduplication during build).
    value_to_id: FxHashMap<String, ValueId>,

    /// Ordered list of unique values (indexed by ValueId).
    id_to_value: Vec<String>,

    /// Numeric coercion of each unique value, parallel to `id_to_value`.
    id_to_number: Vec<Option<f64>>,
}

impl FieldCache {
    pub fn new(name: String) -> Self {
        FieldCache {
            name,
            field_type: None,
            value_to_id: FxHashMap::default(),
            id_to_value: Vec::new(),
            id_to_number: Vec::new(),
        }
    }

    /// Interns a value and returns its ValueId.
    /// If the value already exists, returns the existing ID.
    pub fn intern(&mut self, value: &str) -> ValueId {
        if value.is_empty() {
            return VALUE_ID_EMPTY;
        }

        if self.field_type.is_none() && !value.trim().is_empty() {
            self.field_type = Some(infer_field_type(value));
        }

        if let Some(&id) = self.value_to_id.get(value) {
            return id;
        }

        let id = self.id_to_value.len() as ValueId;
        self.id_to_value.push(value.to_string());
        self.id_to_number.push(parse_number(value));
        self.value_to_id.insert(value.to_string(), id);
        id
    }

    /// Looks up the id of a raw value without interning it.
    /// Blank always resolves to `VALUE_ID_EMPTY`.
    pub fn id_of(&self, value: &str) -> Option<ValueId> {
        if value.is_empty() {
            return Some(VALUE_ID_EMPTY);
        }
        self.value_to_id.get(value).copied()
    }

    /// Gets the raw string for a given ID; blank for `VALUE_ID_EMPTY`.
    pub fn label(&self, id: ValueId) -> &str {
        if id == VALUE_ID_EMPTY {
            return "";
        }
        self.id_to_value
            .get(id as usize)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Gets the numeric coercion for a given ID.
    pub fn number(&self, id: ValueId) -> Option<f64> {
        if id == VALUE_ID_EMPTY {
            return None;
        }
        self.id_to_number.get(id as usize).copied().flatten()
    }

    /// Returns the number of unique values (excluding blank).
    pub fn unique_count(&self) -> usize {
        self.id_to_value.len()
    }

    /// The inferred type; fields that never held a non-blank value are strings.
    pub fn field_type(&self) -> FieldType {
        self.field_type.unwrap_or(FieldType::String)
    }
}

// ============================================================================
// ROW RECORD
// ============================================================================

/// A single source record, stored as interned value IDs.
#[derive(Debug, Clone)]
pub struct CacheRecord {
    /// ValueIds for each field, indexed by FieldIndex.
    pub values: Vec<ValueId>,
}

impl CacheRecord {
    /// The value id at a field position; unknown fields read as blank.
    pub fn value_at(&self, field: Option<FieldIndex>) -> ValueId {
        field
            .and_then(|fi| self.values.get(fi).copied())
            .unwrap_or(VALUE_ID_EMPTY)
    }
}

// ============================================================================
// MAIN CACHE STRUCT
// ============================================================================

/// Statistics about the cache, reported in logs and to hosts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub total_records: usize,
    pub field_count: usize,
    pub unique_value_count: usize,
}

/// The ingested record set.
///
/// Immutable from the engine's point of view: every calculation borrows it
/// shared, so one cache serves any number of configurations.
#[derive(Debug, Clone)]
pub struct PivotCache {
    /// Cache for each source field (column).
    fields: Vec<FieldCache>,

    /// Field name to position.
    field_lookup: FxHashMap<String, FieldIndex>,

    /// All source records, stored as interned value IDs.
    records: Vec<CacheRecord>,
}

impl PivotCache {
    /// Creates an empty cache with the given field names.
    /// A repeated name resolves to its first occurrence.
    pub fn new<S: AsRef<str>>(field_names: &[S]) -> Self {
        let mut cache = PivotCache {
            fields: Vec::with_capacity(field_names.len()),
            field_lookup: FxHashMap::default(),
            records: Vec::new(),
        };
        for name in field_names {
            cache.push_field(name.as_ref());
        }
        cache
    }

    fn push_field(&mut self, name: &str) -> FieldIndex {
        let index = self.fields.len();
        self.fields.push(FieldCache::new(name.to_string()));
        *self.field_lookup.entry(name.to_string()).or_insert(index)
    }

    /// Reserves capacity for expected record count.
    pub fn reserve(&mut self, record_count: usize) {
        self.records.reserve(record_count);
    }

    /// Adds a record given values in field order.
    /// Short rows are padded with blanks; extra values are dropped.
    pub fn add_record<S: AsRef<str>>(&mut self, values: &[S]) {
        let mut interned = Vec::with_capacity(self.fields.len());
        for (field, value) in self.fields.iter_mut().zip(values.iter()) {
            interned.push(field.intern(value.as_ref()));
        }
        interned.resize(self.fields.len(), VALUE_ID_EMPTY);
        self.records.push(CacheRecord { values: interned });
    }

    /// Adds a record given as (field name, value) pairs.
    /// Absent fields are blank; names that are not cache fields are ignored.
    pub fn add_record_map<K, V, I>(&mut self, entries: I)
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut interned = vec![VALUE_ID_EMPTY; self.fields.len()];
        for (name, value) in entries {
            if let Some(&fi) = self.field_lookup.get(name.as_ref()) {
                interned[fi] = self.fields[fi].intern(value.as_ref());
            }
        }
        self.records.push(CacheRecord { values: interned });
    }

    /// Builds a cache from a JSON array of flat objects.
    ///
    /// Fields are the union of object keys in first-seen order. Strings are
    /// kept verbatim, numbers and booleans are stringified, `null` is blank.
    pub fn from_json(json: &str) -> Result<Self, PivotError> {
        let parsed: Value = serde_json::from_str(json)?;
        let rows = parsed
            .as_array()
            .ok_or_else(|| PivotError::InvalidRecords("expected a JSON array of objects".to_string()))?;

        let mut names: Vec<&str> = Vec::new();
        let mut seen: FxHashMap<&str, ()> = FxHashMap::default();
        for (i, row) in rows.iter().enumerate() {
            let object = row.as_object().ok_or_else(|| {
                PivotError::InvalidRecords(format!("record {} is not an object", i))
            })?;
            for key in object.keys() {
                if seen.insert(key.as_str(), ()).is_none() {
                    names.push(key.as_str());
                }
            }
        }

        let mut cache = PivotCache::new(names.as_slice());
        cache.reserve(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let mut entries = Vec::new();
            if let Some(object) = row.as_object() {
                for (key, value) in object {
                    let text = json_value_to_string(value).ok_or_else(|| {
                        PivotError::InvalidRecords(format!(
                            "record {} field '{}' holds a nested value",
                            i, key
                        ))
                    })?;
                    entries.push((key.as_str(), text));
                }
            }
            cache.add_record_map(entries);
        }

        let stats = cache.stats();
        log_debug!(
            CAT_CACHE,
            "from_json records={} fields={} unique_values={}",
            stats.total_records,
            stats.field_count,
            stats.unique_value_count
        );
        Ok(cache)
    }

    /// Resolves a field name to its position.
    pub fn resolve(&self, name: &str) -> Option<FieldIndex> {
        self.field_lookup.get(name).copied()
    }

    /// Returns the field cache at a position.
    pub fn field(&self, index: FieldIndex) -> Option<&FieldCache> {
        self.fields.get(index)
    }

    /// The ingested fields with their inferred types, in field order.
    pub fn fields(&self) -> Vec<Field> {
        self.fields
            .iter()
            .map(|f| Field::new(f.name.clone(), f.field_type()))
            .collect()
    }

    /// The inferred type of a named field; unknown fields are strings.
    pub fn field_type(&self, name: &str) -> FieldType {
        self.resolve(name)
            .and_then(|fi| self.fields.get(fi))
            .map(FieldCache::field_type)
            .unwrap_or(FieldType::String)
    }

    /// All records, in ingestion order.
    pub fn records(&self) -> &[CacheRecord] {
        &self.records
    }

    /// Returns the record count.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// The raw string of a value id at a field; unknown fields read as blank.
    pub fn label(&self, field: Option<FieldIndex>, id: ValueId) -> &str {
        field
            .and_then(|fi| self.fields.get(fi))
            .map(|f| f.label(id))
            .unwrap_or("")
    }

    /// The numeric coercion of a value id at a field.
    pub fn number(&self, field: Option<FieldIndex>, id: ValueId) -> Option<f64> {
        field
            .and_then(|fi| self.fields.get(fi))
            .and_then(|f| f.number(id))
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_records: self.records.len(),
            field_count: self.fields.len(),
            unique_value_count: self.fields.iter().map(FieldCache::unique_count).sum(),
        }
    }
}

/// Converts a scalar JSON value to its raw string form.
fn json_value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}
