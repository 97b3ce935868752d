use std::collections::{BTreeMap, VecDeque};

use alpha_ensemble::BetaState;
use rand::Rng;

const PNL_HISTORY_CAPACITY: usize = 100;
const MIN_TRADES_FOR_SHARPE: usize = 10;
/// Model Selector's Thompson update scales P&L into [0, 1] ten times more
/// aggressively than the ensemble's own bandit, since outcomes here are
/// scored per-model rather than per-combined-signal.
const SELECTOR_MAGNITUDE_SCALE: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct ModelRecord {
    pub name: String,
    pub version: String,
    pub is_production: bool,
    pub is_shadow: bool,
    pub trade_count: usize,
    pnl_history: VecDeque<f64>,
    pub sharpe: f64,
    pub win_rate: f64,
    pub bandit: BetaState,
}

impl ModelRecord {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            is_production: false,
            is_shadow: false,
            trade_count: 0,
            pnl_history: VecDeque::new(),
            sharpe: 0.0,
            win_rate: 0.0,
            bandit: BetaState::default(),
        }
    }

    /// Append an outcome, update the Thompson state, and recompute
    /// Sharpe/win-rate once at least 10 trades have been recorded.
    pub fn record_outcome(&mut self, pnl: f64, was_correct: bool) {
        if self.pnl_history.len() >= PNL_HISTORY_CAPACITY {
            self.pnl_history.pop_front();
        }
        self.pnl_history.push_back(pnl);
        self.trade_count += 1;

        self.bandit.record(pnl, was_correct, SELECTOR_MAGNITUDE_SCALE);

        if self.trade_count >= MIN_TRADES_FOR_SHARPE {
            let pnls: Vec<f64> = self.pnl_history.iter().copied().collect();
            self.sharpe = sharpe_of(&pnls);
            self.win_rate = pnls.iter().filter(|&&p| p > 0.0).count() as f64 / pnls.len() as f64;
        }
    }
}

fn sharpe_of(pnls: &[f64]) -> f64 {
    if pnls.len() < 2 {
        return 0.0;
    }
    let mean = pnls.iter().sum::<f64>() / pnls.len() as f64;
    let variance = pnls.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (pnls.len() - 1) as f64;
    let std = variance.sqrt().max(1e-8);
    mean / std
}

/// Registry of model records, selecting among them via Thompson sampling.
#[derive(Debug, Clone, Default)]
pub struct ModelSelector {
    records: BTreeMap<String, ModelRecord>,
    pub min_trades_for_selection: usize,
}

impl ModelSelector {
    pub fn new(min_trades_for_selection: usize) -> Self {
        Self { records: BTreeMap::new(), min_trades_for_selection }
    }

    pub fn register(&mut self, record: ModelRecord) {
        self.records.insert(key(&record.name, &record.version), record);
    }

    pub fn record_outcome(&mut self, name: &str, version: &str, pnl: f64, was_correct: bool) {
        if let Some(record) = self.records.get_mut(&key(name, version)) {
            record.record_outcome(pnl, was_correct);
        }
    }

    pub fn get(&self, name: &str, version: &str) -> Option<&ModelRecord> {
        self.records.get(&key(name, version))
    }

    /// Draw `theta_m ~ Beta(alpha_m, beta_m)` for each registered model
    /// (or `Beta(1,1)` below the selection threshold) and return the argmax.
    pub fn select_model(&self, rng: &mut impl Rng) -> Option<&ModelRecord> {
        self.records.values().max_by(|a, b| {
            let sample_a = self.sample_for(a, rng);
            let sample_b = self.sample_for(b, rng);
            sample_a.partial_cmp(&sample_b).unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    fn sample_for(&self, record: &ModelRecord, rng: &mut impl Rng) -> f64 {
        if record.trade_count < self.min_trades_for_selection {
            BetaState::default().sample(rng)
        } else {
            record.bandit.sample(rng)
        }
    }
}

fn key(name: &str, version: &str) -> String {
    format!("{name}::{version}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_outcome_updates_bandit_and_sharpe_after_ten_trades() {
        let mut record = ModelRecord::new("momentum", "v1");
        for _ in 0..10 {
            record.record_outcome(0.01, true);
        }
        assert_eq!(record.trade_count, 10);
        assert!(record.sharpe > 0.0);
    }

    #[test]
    fn correctness_flag_drives_bandit_independent_of_pnl_sign() {
        let mut record = ModelRecord::new("momentum", "v1");
        let before = record.bandit.posterior_mean();
        record.record_outcome(-0.01, true);
        assert!(record.bandit.posterior_mean() >= before);
    }

    #[test]
    fn select_model_returns_some_when_populated() {
        let mut selector = ModelSelector::new(10);
        selector.register(ModelRecord::new("momentum", "v1"));
        selector.register(ModelRecord::new("mean_reversion", "v1"));
        let mut rng = rand::thread_rng();
        assert!(selector.select_model(&mut rng).is_some());
    }
}
