//! FILENAME: tests/common/mod.rs
//! Shared fixtures and assertions for the integration tests.

#![allow(dead_code)]

use crosstab_engine::{PivotCache, PivotResult};

// ============================================================================
// FIXTURES
// ============================================================================

/// Standard sales data used across pivot tests.
pub struct SalesFixture;

impl SalesFixture {
    pub fn headers() -> Vec<&'static str> {
        vec!["Region", "Product", "Quarter", "Sales", "Quantity"]
    }

    pub fn data() -> Vec<(&'static str, &'static str, &'static str, &'static str, &'static str)> {
        vec![
            ("North", "Widget", "Q1", "10000", "100"),
            ("North", "Widget", "Q2", "12000", "120"),
            ("North", "Gadget", "Q1", "8000", "80"),
            ("North", "Gadget", "Q2", "9000", "90"),
            ("South", "Widget", "Q1", "15000", "150"),
            ("South", "Widget", "Q2", "14000", "140"),
            ("South", "Gadget", "Q1", "11000", "110"),
            ("South", "Gadget", "Q2", "13000", "130"),
            ("East", "Widget", "Q1", "9000", "90"),
            ("East", "Widget", "Q2", "11000", "110"),
            ("East", "Gadget", "Q1", "7000", "70"),
            ("East", "Gadget", "Q2", "8500", "n/a"),
        ]
    }

    pub fn cache() -> PivotCache {
        let mut cache = PivotCache::new(&Self::headers());
        for (region, product, quarter, sales, quantity) in Self::data() {
            cache.add_record(&[region, product, quarter, sales, quantity]);
        }
        cache
    }
}

// ============================================================================
// ASSERTION HELPERS
// ============================================================================

/// Assert that a cell holds a number close to `expected`.
pub fn assert_cell_number(result: &PivotResult, row: usize, col: usize, value: usize, expected: f64) {
    match result.cell(row, col, value) {
        Some(n) => assert!(
            (n - expected).abs() < 0.001,
            "Cell ({}, {}, {}) expected {} but got {}",
            row, col, value, expected, n
        ),
        None => panic!(
            "Cell ({}, {}, {}) expected {} but holds no value",
            row, col, value, expected
        ),
    }
}

/// Assert that a cell holds no value.
pub fn assert_cell_empty(result: &PivotResult, row: usize, col: usize, value: usize) {
    assert_eq!(
        result.cell(row, col, value),
        None,
        "Cell ({}, {}, {}) expected no value",
        row, col, value
    );
}

/// Labels of an axis as `&str` tuples, for compact comparisons.
pub fn axis(combos: &[Vec<String>]) -> Vec<Vec<&str>> {
    combos
        .iter()
        .map(|c| c.iter().map(String::as_str).collect())
        .collect()
}
