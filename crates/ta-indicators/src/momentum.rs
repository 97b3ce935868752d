use crate::moving_average::{ema, finite_or};

/// Wilder-smoothed RSI(period). Output is `data.len() - period` long.
pub fn rsi(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period + 1 {
        return vec![];
    }

    let mut gains = Vec::with_capacity(data.len() - 1);
    let mut losses = Vec::with_capacity(data.len() - 1);
    for i in 1..data.len() {
        let change = data[i] - data[i - 1];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(change.abs());
        }
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(gains.len() - period);
    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;

        let rs = if avg_loss == 0.0 { 100.0 } else { avg_gain / avg_loss };
        let value = 100.0 - (100.0 / (1.0 + rs));
        out.push(finite_or(value, 50.0));
    }
    out
}

pub struct MacdResult {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// MACD(fast, slow, signal) as three aligned series.
pub fn macd(data: &[f64], fast_period: usize, slow_period: usize, signal_period: usize) -> MacdResult {
    if fast_period == 0 || slow_period == 0 || signal_period == 0 || slow_period < fast_period {
        return MacdResult {
            macd_line: vec![],
            signal_line: vec![],
            histogram: vec![],
        };
    }

    let ema_fast = ema(data, fast_period);
    let ema_slow = ema(data, slow_period);

    let offset = slow_period - fast_period;
    let mut macd_line = Vec::new();
    for i in offset..ema_fast.len() {
        macd_line.push(ema_fast[i] - ema_slow[i - offset]);
    }

    let signal_line = ema(&macd_line, signal_period);

    let hist_offset = macd_line.len().saturating_sub(signal_line.len());
    let mut histogram = Vec::with_capacity(signal_line.len());
    for i in 0..signal_line.len() {
        histogram.push(macd_line[i + hist_offset] - signal_line[i]);
    }

    MacdResult {
        macd_line,
        signal_line,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_is_100_when_all_gains() {
        let data: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&data, 14);
        assert!(out.iter().all(|v| (*v - 100.0).abs() < 1e-6));
    }

    #[test]
    fn macd_histogram_is_macd_minus_signal() {
        let data: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let out = macd(&data, 12, 26, 9);
        let offset = out.macd_line.len() - out.signal_line.len();
        for i in 0..out.signal_line.len() {
            let expected = out.macd_line[i + offset] - out.signal_line[i];
            assert!((out.histogram[i] - expected).abs() < 1e-9);
        }
    }
}
