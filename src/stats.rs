//! Descriptive statistics over report series (per-bike usage, dock-count deltas).

/// Arithmetic mean of `values`; an empty series averages to 0.0.
pub fn mean(values: &[f64]) -> f64 {
    ratio(values.iter().sum(), values.len())
}

/// Population standard deviation of `values` around an already computed `mean`.
///
/// Capacity deltas are whole dock counts, so this is the spread in docks
/// gained or lost per movement. An empty series has no spread.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    let squared_error: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();

    ratio(squared_error, values.len()).sqrt()
}

/// Divides `part` by `total`, returning 0.0 when there is nothing to divide by.
pub fn ratio(part: f64, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part / total as f64
    }
}
