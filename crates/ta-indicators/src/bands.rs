use core_types::Bar;

use crate::moving_average::{finite_or, sma};

/// Bollinger position: `(price - middle) / (std_dev * std)`, clamped to
/// [-1, +1]. Returns `0.0` when there isn't enough data.
pub fn bollinger_position(data: &[f64], period: usize, std_dev: f64) -> f64 {
    if period == 0 || data.len() < period || std_dev <= 0.0 {
        return 0.0;
    }

    let slice = &data[data.len() - period..];
    let mean = slice.iter().sum::<f64>() / period as f64;
    let variance = slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period as f64;
    let std = variance.sqrt();
    if std <= 0.0 {
        return 0.0;
    }

    let price = *data.last().unwrap();
    ((price - mean) / (std_dev * std)).clamp(-1.0, 1.0)
}

/// Wilder-smoothed Average True Range. Output is `bars.len() - period` long.
pub fn atr(bars: &[Bar], period: usize) -> Vec<f64> {
    if period == 0 || bars.len() < period + 1 {
        return vec![];
    }

    let mut true_ranges = Vec::with_capacity(bars.len() - 1);
    for i in 1..bars.len() {
        let hl = bars[i].high - bars[i].low;
        let hc = (bars[i].high - bars[i - 1].close).abs();
        let lc = (bars[i].low - bars[i - 1].close).abs();
        true_ranges.push(hl.max(hc).max(lc));
    }

    let mut values = Vec::with_capacity(true_ranges.len() - period + 1);
    let mut running = finite_or(true_ranges[..period].iter().sum::<f64>() / period as f64, 0.0);
    values.push(running);

    for tr in &true_ranges[period..] {
        running = (running * (period - 1) as f64 + tr) / period as f64;
        values.push(finite_or(running, 0.0));
    }
    values
}

/// Simple-average ATR over `bars[len-period..]` for ratio comparisons against
/// the Wilder series (used by the volatility-breakout model).
pub fn average(values: &[f64], period: usize) -> f64 {
    if period == 0 || values.len() < period {
        return 0.0;
    }
    let slice = &values[values.len() - period..];
    finite_or(slice.iter().sum::<f64>() / period as f64, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bar(h: f64, l: f64, c: f64) -> Bar {
        Bar::new("X", Utc.timestamp_opt(0, 0).unwrap(), c, h, l, c, 100.0)
    }

    #[test]
    fn bollinger_position_is_zero_flat_series() {
        let data = vec![100.0; 25];
        assert_eq!(bollinger_position(&data, 20, 2.0), 0.0);
    }

    #[test]
    fn atr_nonnegative() {
        let bars: Vec<Bar> = (0..20).map(|i| bar(101.0 + i as f64, 99.0, 100.0)).collect();
        let out = atr(&bars, 14);
        assert!(out.iter().all(|v| *v >= 0.0));
    }
}
