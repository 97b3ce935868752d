use crate::moving_average::finite_or;

/// Rescaled-range Hurst exponent estimate over several lags. Returns 0.5
/// (random walk) when there isn't enough data to fit a slope.
pub fn hurst_exponent(prices: &[f64]) -> f64 {
    if prices.len() < 20 {
        return 0.5;
    }

    let max_lag = (prices.len() / 2).min(100).max(10);
    let lags: Vec<usize> = (10..max_lag).step_by((max_lag / 10).max(1)).collect();
    if lags.len() < 2 {
        return 0.5;
    }

    let mut log_lags = Vec::new();
    let mut log_rs = Vec::new();

    for &lag in &lags {
        let rs = rescaled_range(prices, lag);
        if rs > 0.0 {
            log_lags.push((lag as f64).ln());
            log_rs.push(rs.ln());
        }
    }

    if log_lags.len() < 2 {
        return 0.5;
    }

    finite_or(slope(&log_lags, &log_rs), 0.5).clamp(0.0, 1.0)
}

fn rescaled_range(prices: &[f64], lag: usize) -> f64 {
    if prices.len() <= lag {
        return 0.0;
    }
    let chunk = &prices[prices.len() - lag..];
    let mean = chunk.iter().sum::<f64>() / lag as f64;
    let deviations: Vec<f64> = chunk.iter().map(|p| p - mean).collect();

    let mut cumulative = 0.0;
    let mut cum_series = Vec::with_capacity(lag);
    for d in &deviations {
        cumulative += d;
        cum_series.push(cumulative);
    }

    let range = cum_series.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
        - cum_series.iter().cloned().fold(f64::INFINITY, f64::min);
    let variance = deviations.iter().map(|d| d.powi(2)).sum::<f64>() / lag as f64;
    let std = variance.sqrt();

    if std <= 0.0 {
        0.0
    } else {
        range / std
    }
}

/// OLS slope of `y` on `x`, used both for the Hurst log-log fit and for
/// reporting a simple linear trend elsewhere.
pub fn slope(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let mean_x = x[..n].iter().sum::<f64>() / n as f64;
    let mean_y = y[..n].iter().sum::<f64>() / n as f64;

    let mut num = 0.0;
    let mut den = 0.0;
    for i in 0..n {
        num += (x[i] - mean_x) * (y[i] - mean_y);
        den += (x[i] - mean_x).powi(2);
    }
    if den <= 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Ornstein-Uhlenbeck half-life of mean reversion, estimated by regressing
/// `Δp_t` on `p_{t-1}`: `half_life = -ln(2) / θ` where `θ` is the (negative)
/// regression coefficient. Returns `None` when the series isn't mean-reverting
/// or there isn't enough data.
pub fn ou_half_life(prices: &[f64]) -> Option<f64> {
    if prices.len() < 20 {
        return None;
    }
    let lagged = &prices[..prices.len() - 1];
    let diffs: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();

    let theta = slope(lagged, &diffs);
    if theta >= 0.0 {
        return None;
    }
    Some(-(2f64.ln()) / theta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hurst_exceeds_half_on_clean_trend() {
        let prices: Vec<f64> = (0..200).map(|i| 100.0 * (0.002 * i as f64).exp()).collect();
        assert!(hurst_exponent(&prices) > 0.5);
    }

    #[test]
    fn hurst_defaults_to_half_on_short_series() {
        let prices = vec![100.0, 101.0, 99.0];
        assert_eq!(hurst_exponent(&prices), 0.5);
    }
}
