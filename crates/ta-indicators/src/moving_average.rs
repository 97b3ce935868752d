/// Return `val` if finite, else `default`. Keeps NaN/Inf out of downstream
/// ratios without a fallible return type at every call site.
#[inline]
pub fn finite_or(val: f64, default: f64) -> f64 {
    if val.is_finite() {
        val
    } else {
        default
    }
}

/// Simple moving average. Output is `data.len() - period + 1` long.
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(finite_or(sum / period as f64, 0.0));
    }
    result
}

/// Exponential moving average, SMA-seeded. Output length matches `data.len()`
/// once at least `period` samples are available (callers like MACD rely on
/// this for index alignment).
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.is_empty() {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len());
    let multiplier = 2.0 / (period as f64 + 1.0);

    if data.len() < period {
        let avg = data.iter().sum::<f64>() / data.len() as f64;
        return vec![finite_or(avg, 0.0)];
    }

    let sma_seed = finite_or(data[..period].iter().sum::<f64>() / period as f64, 0.0);
    for _ in 0..period {
        result.push(sma_seed);
    }

    for i in period..data.len() {
        let prev = result[i - 1];
        let val = (data[i] - prev) * multiplier + prev;
        result.push(finite_or(val, prev));
    }

    result
}
