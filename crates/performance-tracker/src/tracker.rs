use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::metrics::{calmar_ratio, max_drawdown, per_trade_sharpe, profit_factor, sharpe_ratio, sortino_ratio, win_rate};

const ROLLING_WINDOW: usize = 50;

#[derive(Debug, Clone, Copy)]
pub struct DrawdownEvent {
    pub peak_nav: f64,
    pub trough_nav: f64,
    pub drawdown_pct: f64,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PerformanceSnapshot {
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub rolling_sharpe: f64,
    pub trade_count: usize,
}

/// Tracks NAV history, daily returns, and per-trade/per-model P&L, deriving
/// the standard risk-adjusted metrics on demand.
#[derive(Debug, Clone)]
pub struct PerformanceTracker {
    nav_series: Vec<f64>,
    daily_returns: Vec<f64>,
    trade_pnls: Vec<f64>,
    per_model_pnls: BTreeMap<String, Vec<f64>>,
    peak_nav: f64,
    drawdown_events: Vec<DrawdownEvent>,
    in_drawdown: bool,
    drawdown_started_at: Option<DateTime<Utc>>,
    drawdown_peak: f64,
}

impl Default for PerformanceTracker {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl PerformanceTracker {
    pub fn new(initial_nav: f64) -> Self {
        Self {
            nav_series: vec![initial_nav],
            daily_returns: Vec::new(),
            trade_pnls: Vec::new(),
            per_model_pnls: BTreeMap::new(),
            peak_nav: initial_nav,
            drawdown_events: Vec::new(),
            in_drawdown: false,
            drawdown_started_at: None,
            drawdown_peak: initial_nav,
        }
    }

    /// Append a NAV observation, derive the daily return from the prior
    /// value, and track drawdown-event start/end transitions.
    pub fn record_nav(&mut self, nav: f64, now: DateTime<Utc>) {
        if let Some(&prior) = self.nav_series.last() {
            if prior.abs() > f64::EPSILON {
                self.daily_returns.push((nav - prior) / prior);
            }
        }
        self.nav_series.push(nav);

        if nav >= self.peak_nav {
            if self.in_drawdown {
                if let Some(started_at) = self.drawdown_started_at {
                    let trough_nav =
                        self.nav_series[..self.nav_series.len() - 1].iter().copied().fold(f64::MAX, f64::min);
                    let drawdown_pct = max_drawdown(&self.nav_series);
                    info!(peak_nav = self.drawdown_peak, trough_nav, drawdown_pct, "drawdown recovered");
                    self.drawdown_events.push(DrawdownEvent {
                        peak_nav: self.drawdown_peak,
                        trough_nav,
                        drawdown_pct,
                        started_at,
                    });
                }
                self.in_drawdown = false;
            }
            self.peak_nav = nav;
        } else if !self.in_drawdown {
            self.in_drawdown = true;
            self.drawdown_started_at = Some(now);
            self.drawdown_peak = self.peak_nav;
        }
    }

    pub fn record_trade(&mut self, pnl: f64) {
        self.trade_pnls.push(pnl);
    }

    pub fn record_model_pnl(&mut self, model: &str, pnl: f64) {
        self.per_model_pnls.entry(model.to_string()).or_default().push(pnl);
    }

    pub fn drawdown_events(&self) -> &[DrawdownEvent] {
        &self.drawdown_events
    }

    pub fn snapshot(&self, rf_daily: f64) -> PerformanceSnapshot {
        let max_dd = max_drawdown(&self.nav_series);
        let annualized_return = mean_annualized_return(&self.daily_returns);

        let rolling = rolling_window(&self.trade_pnls, ROLLING_WINDOW);
        PerformanceSnapshot {
            sharpe: sharpe_ratio(&self.daily_returns, rf_daily),
            sortino: sortino_ratio(&self.daily_returns, rf_daily),
            calmar: calmar_ratio(annualized_return, max_dd),
            max_drawdown: max_dd,
            win_rate: win_rate(&self.trade_pnls),
            profit_factor: profit_factor(&self.trade_pnls),
            rolling_sharpe: per_trade_sharpe(rolling),
            trade_count: self.trade_pnls.len(),
        }
    }

    pub fn model_leaderboard(&self) -> BTreeMap<String, f64> {
        self.per_model_pnls.iter().map(|(name, pnls)| (name.clone(), pnls.iter().sum())).collect()
    }
}

fn mean_annualized_return(daily_returns: &[f64]) -> f64 {
    if daily_returns.is_empty() {
        return 0.0;
    }
    let mean = daily_returns.iter().sum::<f64>() / daily_returns.len() as f64;
    mean * 252.0
}

fn rolling_window(values: &[f64], window: usize) -> &[f64] {
    if values.len() <= window {
        values
    } else {
        &values[values.len() - window..]
    }
}

/// Bounded ring buffer kept alongside `PerformanceTracker` for components
/// that need a recency-limited view of P&L without the full history.
#[derive(Debug, Clone)]
pub struct BoundedPnlSeries {
    capacity: usize,
    values: VecDeque<f64>,
}

impl BoundedPnlSeries {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, values: VecDeque::new() }
    }

    pub fn push(&mut self, pnl: f64) {
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(pnl);
    }

    pub fn as_slice(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }
}
