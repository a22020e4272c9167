//! FILENAME: crosstab-engine/src/layout.rs
//! Layout Merger - span lengths for merged axis labels.
//!
//! For each combination and level the span is either the length of the run
//! it starts, or zero when an earlier cell of the run covers it. A run never
//! crosses a change at an outer level: `["A","x"]` followed by `["B","x"]`
//! keeps two separate `x` cells.

/// Spans indexed `[combination][level]`.
pub type SpanMap = Vec<Vec<usize>>;

/// Computes label spans for an axis, one linear pass per level.
pub fn compute_spans<T, C>(combos: &[C], level_count: usize) -> SpanMap
where
    T: PartialEq,
    C: AsRef<[T]>,
{
    let mut spans: SpanMap = vec![vec![1; level_count]; combos.len()];

    // boundary[i]: combination i differs from i-1 at some level already processed
    let mut boundary = vec![false; combos.len()];

    for level in 0..level_count {
        let mut run_start = 0;

        for i in 1..combos.len() {
            let same = !boundary[i]
                && combos[i].as_ref().get(level) == combos[i - 1].as_ref().get(level);

            if same {
                spans[run_start][level] += 1;
                spans[i][level] = 0;
            } else {
                boundary[i] = true;
                run_start = i;
            }
        }
    }

    spans
}

/// Multiplies every non-zero span by `factor`.
///
/// Column headers cover one rendered column per measure, so the header of a
/// column combination spans `span * measure_count` columns.
pub fn scale_spans(spans: &SpanMap, factor: usize) -> SpanMap {
    spans
        .iter()
        .map(|levels| levels.iter().map(|&span| span * factor).collect())
        .collect()
}
