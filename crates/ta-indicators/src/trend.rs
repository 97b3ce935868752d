use core_types::Bar;

pub struct AdxResult {
    pub adx: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
}

/// Average Directional Index via Wilder-smoothed +DM/-DM/TR.
pub fn adx(bars: &[Bar], period: usize) -> AdxResult {
    if period == 0 || bars.len() < period * 2 + 1 {
        return AdxResult {
            adx: vec![],
            plus_di: vec![],
            minus_di: vec![],
        };
    }

    let mut plus_dm = Vec::with_capacity(bars.len() - 1);
    let mut minus_dm = Vec::with_capacity(bars.len() - 1);
    let mut true_range = Vec::with_capacity(bars.len() - 1);

    for i in 1..bars.len() {
        let up_move = bars[i].high - bars[i - 1].high;
        let down_move = bars[i - 1].low - bars[i].low;

        plus_dm.push(if up_move > down_move && up_move > 0.0 { up_move } else { 0.0 });
        minus_dm.push(if down_move > up_move && down_move > 0.0 { down_move } else { 0.0 });

        let hl = bars[i].high - bars[i].low;
        let hc = (bars[i].high - bars[i - 1].close).abs();
        let lc = (bars[i].low - bars[i - 1].close).abs();
        true_range.push(hl.max(hc).max(lc));
    }

    let mut smoothed_plus_dm = plus_dm[..period].iter().sum::<f64>();
    let mut smoothed_minus_dm = minus_dm[..period].iter().sum::<f64>();
    let mut smoothed_tr = true_range[..period].iter().sum::<f64>();

    let mut plus_di_values = Vec::new();
    let mut minus_di_values = Vec::new();
    let mut dx_values = Vec::new();

    for i in period..plus_dm.len() {
        smoothed_plus_dm = smoothed_plus_dm - smoothed_plus_dm / period as f64 + plus_dm[i];
        smoothed_minus_dm = smoothed_minus_dm - smoothed_minus_dm / period as f64 + minus_dm[i];
        smoothed_tr = smoothed_tr - smoothed_tr / period as f64 + true_range[i];

        let pdi = if smoothed_tr > 0.0 { 100.0 * smoothed_plus_dm / smoothed_tr } else { 0.0 };
        let mdi = if smoothed_tr > 0.0 { 100.0 * smoothed_minus_dm / smoothed_tr } else { 0.0 };

        let di_sum = pdi + mdi;
        let dx = if di_sum > 0.0 { 100.0 * (pdi - mdi).abs() / di_sum } else { 0.0 };

        plus_di_values.push(pdi);
        minus_di_values.push(mdi);
        dx_values.push(dx);
    }

    if dx_values.len() < period {
        return AdxResult {
            adx: vec![],
            plus_di: plus_di_values,
            minus_di: minus_di_values,
        };
    }

    let mut adx_values = Vec::with_capacity(dx_values.len() - period + 1);
    let mut adx = dx_values[..period].iter().sum::<f64>() / period as f64;
    adx_values.push(adx);
    for dx in &dx_values[period..] {
        adx = (adx * (period - 1) as f64 + dx) / period as f64;
        adx_values.push(adx);
    }

    AdxResult {
        adx: adx_values,
        plus_di: plus_di_values,
        minus_di: minus_di_values,
    }
}

/// Directional-movement ratio over `period`: fraction of bars where the
/// smoothed +DI exceeds -DI, used to classify `trend_regime ∈ {0,1}`.
pub fn directional_ratio(bars: &[Bar], period: usize) -> f64 {
    let result = adx(bars, period);
    if result.plus_di.is_empty() || result.minus_di.is_empty() {
        return 0.5;
    }
    let n = result.plus_di.len().min(result.minus_di.len());
    let trending = (0..n)
        .filter(|&i| result.plus_di[result.plus_di.len() - n + i] != result.minus_di[result.minus_di.len() - n + i])
        .count();
    trending as f64 / n as f64
}
