use crate::moving_average::finite_or;

/// Log returns `ln(p_t / p_{t-1})` over the whole series.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    if prices.len() < 2 {
        return vec![];
    }
    prices
        .windows(2)
        .map(|w| finite_or((w[1] / w[0]).ln(), 0.0))
        .collect()
}

fn stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Realized volatility over the trailing `window` log returns, floored at
/// 5% and ceiled at 100%, optionally annualized by sqrt(252).
pub fn realized_vol(returns: &[f64], window: usize, annualize: bool) -> f64 {
    if returns.len() < window || window < 2 {
        return 0.0;
    }
    let slice = &returns[returns.len() - window..];
    let mut vol = stdev(slice);
    if annualize {
        vol *= 252f64.sqrt();
    }
    finite_or(vol, 0.0).clamp(0.05, 1.0)
}

/// EWMA volatility with the given decay (spec default 0.94), floored at 5%
/// and ceiled at 100%.
pub fn ewma_vol(returns: &[f64], decay: f64, annualize: bool) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let mut variance = returns[0].powi(2);
    for r in &returns[1..] {
        variance = decay * variance + (1.0 - decay) * r.powi(2);
    }
    let mut vol = variance.sqrt();
    if annualize {
        vol *= 252f64.sqrt();
    }
    finite_or(vol, 0.0).clamp(0.05, 1.0)
}

/// Realized vol of the first difference of a rolling realized-vol series:
/// how much the volatility estimate itself is moving.
pub fn vol_of_vol(returns: &[f64], window: usize) -> f64 {
    if returns.len() < window * 2 {
        return 0.0;
    }
    let mut vol_series = Vec::new();
    for i in window..=returns.len() {
        vol_series.push(stdev(&returns[i - window..i]));
    }
    if vol_series.len() < 2 {
        return 0.0;
    }
    let diffs: Vec<f64> = vol_series.windows(2).map(|w| w[1] - w[0]).collect();
    finite_or(stdev(&diffs), 0.0)
}
