use crate::moving_average::finite_or;

/// Z-score of the last value in `values` against the trailing `window`,
/// clipped to [-3, 3]. Returns 0 when there's insufficient history or the
/// window has zero variance.
pub fn rolling_zscore(values: &[f64], window: usize) -> f64 {
    if values.len() < window || window < 2 {
        return 0.0;
    }
    let slice = &values[values.len() - window..];
    let mean = slice.iter().sum::<f64>() / window as f64;
    let variance = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / window as f64;
    let std = variance.sqrt();
    if std <= 0.0 {
        return 0.0;
    }
    let z = (values.last().unwrap() - mean) / std;
    finite_or(z, 0.0).clamp(-3.0, 3.0)
}
