const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const TRADES_PER_DAY: f64 = 2.0;
const STD_FLOOR: f64 = 1e-8;
const DRAWDOWN_FLOOR: f64 = 1e-8;

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// `(mean - rf_daily) / std * sqrt(252)`, with the denominator floored at
/// 1e-8 so a degenerate zero-variance series returns 0 rather than NaN/inf.
pub fn sharpe_ratio(returns: &[f64], rf_daily: f64) -> f64 {
    let std = stdev(returns).max(STD_FLOOR);
    (mean(returns) - rf_daily) / std * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Like `sharpe_ratio` but the denominator uses only the standard deviation
/// of negative returns; falls back to `sharpe_ratio` when fewer than two
/// negative returns exist.
pub fn sortino_ratio(returns: &[f64], rf_daily: f64) -> f64 {
    let downside: Vec<f64> = returns.iter().copied().filter(|&r| r < 0.0).collect();
    if downside.len() < 2 {
        return sharpe_ratio(returns, rf_daily);
    }
    let downside_std = stdev(&downside).max(STD_FLOOR);
    (mean(returns) - rf_daily) / downside_std * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Per-trade Sharpe, annualized assuming ~2 trades/day rather than 252
/// trading days.
pub fn per_trade_sharpe(trade_pnls: &[f64]) -> f64 {
    let std = stdev(trade_pnls).max(STD_FLOOR);
    mean(trade_pnls) / std * (TRADES_PER_DAY * TRADING_DAYS_PER_YEAR).sqrt()
}

/// `annualized_return / max_drawdown`, 0 when drawdown is below 1e-8.
pub fn calmar_ratio(annualized_return: f64, max_drawdown: f64) -> f64 {
    if max_drawdown < DRAWDOWN_FLOOR {
        0.0
    } else {
        annualized_return / max_drawdown
    }
}

pub fn win_rate(trade_pnls: &[f64]) -> f64 {
    if trade_pnls.is_empty() {
        return 0.0;
    }
    trade_pnls.iter().filter(|&&p| p > 0.0).count() as f64 / trade_pnls.len() as f64
}

/// `sum(wins) / |sum(losses)|`; 0 when there are no losses to divide by.
pub fn profit_factor(trade_pnls: &[f64]) -> f64 {
    let wins: f64 = trade_pnls.iter().filter(|&&p| p > 0.0).sum();
    let losses: f64 = trade_pnls.iter().filter(|&&p| p < 0.0).sum();
    if losses.abs() < DRAWDOWN_FLOOR {
        0.0
    } else {
        wins / losses.abs()
    }
}

/// Max drawdown as a positive fraction over a NAV series.
pub fn max_drawdown(nav_series: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst: f64 = 0.0;
    for &nav in nav_series {
        peak = peak.max(nav);
        if peak > 0.0 {
            worst = worst.max((peak - nav) / peak);
        }
    }
    worst
}
