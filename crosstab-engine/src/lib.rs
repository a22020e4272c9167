//! FILENAME: crosstab-engine/src/lib.rs
//! Pivot table engine.
//!
//! Cross-tabulates tabular records into a matrix indexed by distinct
//! combinations of row and column field values, with one or more aggregated
//! measures per cell. Calculation is a pure, synchronous function of the
//! records and the configuration; nothing is kept between calls.
//!
//! Layers:
//! - `cache`: Interned record storage and field type inference (WHAT we read)
//! - `definition`: Serializable configuration (what the pivot table IS)
//! - `filter`, `combination`, `grouping`, `aggregate`: the calculation stages
//! - `engine`: Calculation engine (HOW we calculate)
//! - `layout`, `view`: Renderable output for the presentation layer (WHAT we display)

pub mod logging;

pub mod aggregate;
pub mod cache;
pub mod combination;
pub mod definition;
pub mod engine;
pub mod error;
pub mod field_type;
pub mod filter;
pub mod grouping;
pub mod layout;
pub mod view;

pub use cache::{CacheStats, FieldIndex, PivotCache, ValueId, VALUE_ID_EMPTY};
pub use definition::*;
pub use engine::{calculate_pivot, drill_down, filter_options, PivotCalculator};
pub use error::PivotError;
pub use field_type::{infer_field_type, parse_date, parse_number, Field, FieldType};
pub use layout::{compute_spans, scale_spans, SpanMap};
pub use view::*;
