//! FILENAME: crosstab-engine/src/definition.rs
//! Pivot Definition - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a pivot table.
//! These structures are designed to be:
//! - Serializable (sent from the configuration surface as JSON)
//! - Passed by reference into every calculation
//! - Immutable snapshots of user intent
//!
//! Nothing here is validated against the record set. Unknown field names are
//! legal and read as blank during calculation.

use serde::{Deserialize, Serialize};

use crate::error::PivotError;
use crate::field_type::FieldType;
use crate::logging::{log_debug, CAT_CONFIG};

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions for value fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationType {
    Sum,
    Count,
    #[serde(rename = "avg")]
    Average,
    Min,
    Max,
}

impl Default for AggregationType {
    fn default() -> Self {
        AggregationType::Sum
    }
}

impl AggregationType {
    /// The aggregator picked when a field is dropped into the values area:
    /// text counts, everything else sums.
    pub fn default_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::String => AggregationType::Count,
            FieldType::Number | FieldType::Date => AggregationType::Sum,
        }
    }

    /// Upper-case name used in measure labels, e.g. `"Sales (SUM)"`.
    pub fn label(&self) -> &'static str {
        match self {
            AggregationType::Sum => "SUM",
            AggregationType::Count => "COUNT",
            AggregationType::Average => "AVG",
            AggregationType::Min => "MIN",
            AggregationType::Max => "MAX",
        }
    }
}

// ============================================================================
// FIELD DEFINITIONS
// ============================================================================

/// A measure: a field reduced by an aggregator.
/// The same field may appear in several specs with different aggregators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSpec {
    pub field: String,
    pub aggregator: AggregationType,
}

impl ValueSpec {
    pub fn new(field: impl Into<String>, aggregator: AggregationType) -> Self {
        ValueSpec {
            field: field.into(),
            aggregator,
        }
    }

    /// Display label, e.g. `"Sales (SUM)"`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.field, self.aggregator.label())
    }
}

/// A field in the filter area with its selected value.
///
/// `None` selects everything; `Some("")` selects blank values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    pub field: String,
    #[serde(default)]
    pub filter_value: Option<String>,
}

impl FilterSpec {
    pub fn new(field: impl Into<String>, filter_value: Option<String>) -> Self {
        FilterSpec {
            field: field.into(),
            filter_value,
        }
    }

    /// A filter field with no constraint ("All").
    pub fn all(field: impl Into<String>) -> Self {
        FilterSpec::new(field, None)
    }
}

// ============================================================================
// SORT
// ============================================================================

/// Which axis a sort applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortAxis {
    Row,
    Column,
}

/// Sort direction for an axis level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
    None,
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::None
    }
}

/// Optional post-pass that re-sorts one axis by one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub axis: SortAxis,
    pub level_index: usize,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(axis: SortAxis, level_index: usize, direction: SortDirection) -> Self {
        SortSpec {
            axis,
            level_index,
            direction,
        }
    }
}

// ============================================================================
// MAIN DEFINITION STRUCT
// ============================================================================

/// Which fields go where. Passed explicitly into every calculation.
///
/// The engine does not enforce that a field occupies a single role; a field
/// may be a row field and a measure at the same time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotConfiguration {
    /// Fields placed in the Row area (ordered from outer to inner).
    #[serde(default)]
    pub row_fields: Vec<String>,

    /// Fields placed in the Column area (ordered from outer to inner).
    #[serde(default)]
    pub col_fields: Vec<String>,

    /// Measures, in display order.
    #[serde(default)]
    pub value_specs: Vec<ValueSpec>,

    /// Fields placed in the Filter area, with their selected values.
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

impl PivotConfiguration {
    pub fn new() -> Self {
        PivotConfiguration::default()
    }

    /// Parses a configuration from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, PivotError> {
        let config: PivotConfiguration = serde_json::from_str(json)?;
        log_debug!(
            CAT_CONFIG,
            "from_json rows={} cols={} values={} filters={}",
            config.row_fields.len(),
            config.col_fields.len(),
            config.value_specs.len(),
            config.filters.len()
        );
        Ok(config)
    }

    /// Serializes the configuration to JSON.
    pub fn to_json(&self) -> Result<String, PivotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn with_rows<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.row_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cols<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.col_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_value(mut self, field: impl Into<String>, aggregator: AggregationType) -> Self {
        self.value_specs.push(ValueSpec::new(field, aggregator));
        self
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: Option<&str>) -> Self {
        self.filters
            .push(FilterSpec::new(field, value.map(str::to_string)));
        self
    }

    /// Replaces the filter area. Fields that stay keep their selected value,
    /// new fields start unconstrained, removed fields lose theirs.
    pub fn set_filters<S: AsRef<str>>(&mut self, fields: &[S]) {
        let previous = std::mem::take(&mut self.filters);
        self.filters = fields
            .iter()
            .map(|name| {
                let name = name.as_ref();
                previous
                    .iter()
                    .find(|f| f.field == name)
                    .cloned()
                    .unwrap_or_else(|| FilterSpec::all(name))
            })
            .collect();
    }

    /// Selects a value for a filter field. Fields outside the filter area are ignored.
    pub fn set_filter_value(&mut self, field: &str, value: Option<String>) {
        if let Some(filter) = self.filters.iter_mut().find(|f| f.field == field) {
            filter.filter_value = value;
        }
    }

    /// Changes the aggregator of the first measure on `field`.
    pub fn update_value_aggregator(&mut self, field: &str, aggregator: AggregationType) {
        if let Some(spec) = self.value_specs.iter_mut().find(|v| v.field == field) {
            spec.aggregator = aggregator;
        }
    }

    /// Appends a measure with the default aggregator for the field's type.
    pub fn add_value_field(&mut self, field: impl Into<String>, field_type: FieldType) {
        self.value_specs
            .push(ValueSpec::new(field, AggregationType::default_for(field_type)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_label() {
        let spec = ValueSpec::new("Sales", AggregationType::Average);
        assert_eq!(spec.label(), "Sales (AVG)");
        assert_eq!(ValueSpec::new("Qty", AggregationType::Max).label(), "Qty (MAX)");
    }

    #[test]
    fn test_default_aggregator() {
        assert_eq!(AggregationType::default_for(FieldType::String), AggregationType::Count);
        assert_eq!(AggregationType::default_for(FieldType::Number), AggregationType::Sum);
        assert_eq!(AggregationType::default_for(FieldType::Date), AggregationType::Sum);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "rowFields": ["Region"],
            "colFields": ["Quarter"],
            "valueSpecs": [
                {"field": "Sales", "aggregator": "sum"},
                {"field": "Sales", "aggregator": "avg"}
            ],
            "filters": [
                {"field": "Product", "filterValue": "Apples"},
                {"field": "Channel", "filterValue": null},
                {"field": "Notes"}
            ]
        }"#;
        let config = PivotConfiguration::from_json(json).unwrap();

        assert_eq!(config.row_fields, vec!["Region"]);
        assert_eq!(config.value_specs[1].aggregator, AggregationType::Average);
        assert_eq!(config.filters[0].filter_value.as_deref(), Some("Apples"));
        assert_eq!(config.filters[1].filter_value, None);
        assert_eq!(config.filters[2].filter_value, None);
    }

    #[test]
    fn test_config_missing_collections_default_empty() {
        let config = PivotConfiguration::from_json("{}").unwrap();
        assert_eq!(config, PivotConfiguration::default());
    }

    #[test]
    fn test_config_rejects_unknown_aggregator() {
        let json = r#"{"valueSpecs": [{"field": "Sales", "aggregator": "median"}]}"#;
        assert!(matches!(PivotConfiguration::from_json(json), Err(PivotError::Json(_))));
    }

    #[test]
    fn test_config_json_round_trip_uses_external_names() {
        let config = PivotConfiguration::new()
            .with_rows(["Region"])
            .with_value("Sales", AggregationType::Average)
            .with_filter("Product", Some(""));
        let json = config.to_json().unwrap();

        assert!(json.contains("\"rowFields\""));
        assert!(json.contains("\"avg\""));
        assert!(json.contains("\"filterValue\":\"\""));
        assert_eq!(PivotConfiguration::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_sort_spec_from_json() {
        let spec: SortSpec =
            serde_json::from_str(r#"{"axis": "column", "levelIndex": 1, "direction": "desc"}"#)
                .unwrap();
        assert_eq!(spec, SortSpec::new(SortAxis::Column, 1, SortDirection::Desc));
    }

    #[test]
    fn test_set_filters_keeps_existing_values() {
        let mut config = PivotConfiguration::new()
            .with_filter("Region", Some("North"))
            .with_filter("Product", Some("Apples"));

        config.set_filters(&["Region", "Quarter"]);

        assert_eq!(config.filters.len(), 2);
        assert_eq!(config.filters[0], FilterSpec::new("Region", Some("North".to_string())));
        assert_eq!(config.filters[1], FilterSpec::all("Quarter"));
    }

    #[test]
    fn test_set_filter_value_ignores_unknown_field() {
        let mut config = PivotConfiguration::new().with_filter("Region", None);
        config.set_filter_value("Region", Some(String::new()));
        config.set_filter_value("Product", Some("x".to_string()));

        assert_eq!(config.filters.len(), 1);
        assert_eq!(config.filters[0].filter_value.as_deref(), Some(""));
    }

    #[test]
    fn test_update_value_aggregator_changes_first_match() {
        let mut config = PivotConfiguration::new()
            .with_value("Sales", AggregationType::Sum)
            .with_value("Sales", AggregationType::Max);
        config.update_value_aggregator("Sales", AggregationType::Min);

        assert_eq!(config.value_specs[0].aggregator, AggregationType::Min);
        assert_eq!(config.value_specs[1].aggregator, AggregationType::Max);
    }

    #[test]
    fn test_add_value_field_uses_type_default() {
        let mut config = PivotConfiguration::new();
        config.add_value_field("Region", FieldType::String);
        config.add_value_field("Sales", FieldType::Number);

        assert_eq!(config.value_specs[0], ValueSpec::new("Region", AggregationType::Count));
        assert_eq!(config.value_specs[1], ValueSpec::new("Sales", AggregationType::Sum));
    }
}
