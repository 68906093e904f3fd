//! Summary statistics over per-query scores.

/// Arithmetic mean, `0.0` for an empty slice.
///
/// ```rust
/// use spanscore::stats::mean;
///
/// assert_eq!(mean(&[0.5, 1.0]), 0.75);
/// assert_eq!(mean(&[]), 0.0);
/// ```
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (Bessel-corrected, `n - 1`).
///
/// Undefined for fewer than two values, so `None` is returned.
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(var.sqrt())
}
