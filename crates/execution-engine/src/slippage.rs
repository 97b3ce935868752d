use std::collections::VecDeque;
use tracing::debug;

const CALIBRATION_SAMPLE_MIN: usize = 50;
const HISTORY_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy)]
pub struct SlippageEstimate {
    pub spread_cost_bps: f64,
    pub market_impact_bps: f64,
    pub total_cost_bps: f64,
}

/// Spread + square-root market-impact slippage model with a calibrated
/// impact coefficient `eta`, refit from realized-vs-predicted history.
#[derive(Debug, Clone)]
pub struct SlippageModel {
    eta: f64,
    history: VecDeque<(f64, f64)>, // (predicted_bps, actual_bps)
}

impl Default for SlippageModel {
    fn default() -> Self {
        Self {
            eta: 0.1,
            history: VecDeque::new(),
        }
    }
}

impl SlippageModel {
    pub fn eta(&self) -> f64 {
        self.eta
    }

    /// `spread_cost_bps = spread_bps / 2`; `market_impact_bps = eta * sigma *
    /// sqrt(order_value / daily_volume) * 10_000`. Returns a neutral, low-
    /// confidence estimate when `daily_volume <= 0` rather than blocking
    /// order flow.
    pub fn estimate(&self, order_value: f64, daily_volume: f64, volatility: f64, spread_bps: f64) -> SlippageEstimate {
        let spread_cost_bps = (spread_bps / 2.0).max(0.0);

        let market_impact_bps = if daily_volume > 0.0 && order_value >= 0.0 {
            self.eta * volatility.max(0.0) * (order_value / daily_volume).max(0.0).sqrt() * 10_000.0
        } else {
            0.0
        };

        SlippageEstimate {
            spread_cost_bps,
            market_impact_bps,
            total_cost_bps: spread_cost_bps + market_impact_bps,
        }
    }

    /// Record a (predicted, actual) pair; recalibrate `eta` once at least
    /// 50 samples are available: `eta *= 0.9 + 0.1 * mean(actual)/mean(predicted)`.
    pub fn record_execution(&mut self, predicted_bps: f64, actual_bps: f64) {
        if self.history.len() >= HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back((predicted_bps, actual_bps));

        if self.history.len() >= CALIBRATION_SAMPLE_MIN {
            let mean_predicted = self.history.iter().map(|(p, _)| p).sum::<f64>() / self.history.len() as f64;
            let mean_actual = self.history.iter().map(|(_, a)| a).sum::<f64>() / self.history.len() as f64;
            if mean_predicted > 0.0 {
                self.eta *= 0.9 + 0.1 * (mean_actual / mean_predicted);
                debug!(eta = self.eta, "recalibrated market impact coefficient");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_cost_is_sum_of_components_and_nonnegative() {
        let model = SlippageModel::default();
        let est = model.estimate(100_000.0, 10_000_000.0, 0.2, 5.0);
        assert!((est.total_cost_bps - (est.spread_cost_bps + est.market_impact_bps)).abs() < 1e-9);
        assert!(est.spread_cost_bps >= 0.0);
        assert!(est.market_impact_bps >= 0.0);
    }

    #[test]
    fn zero_daily_volume_yields_neutral_impact() {
        let model = SlippageModel::default();
        let est = model.estimate(100_000.0, 0.0, 0.2, 5.0);
        assert_eq!(est.market_impact_bps, 0.0);
    }

    #[test]
    fn calibration_only_kicks_in_past_fifty_samples() {
        let mut model = SlippageModel::default();
        let initial_eta = model.eta();
        for _ in 0..49 {
            model.record_execution(10.0, 20.0);
        }
        assert_eq!(model.eta(), initial_eta);
        model.record_execution(10.0, 20.0);
        assert!(model.eta() > initial_eta);
    }
}
