use std::collections::{BTreeMap, HashMap};

use alpha_models::{AlphaModel, AlphaModelKind};
use chrono::{DateTime, Utc};
use core_types::{AlphaSignal, Bar, FeatureSet, Regime, RegimeFilterTag};
use rand::rngs::ThreadRng;
use tracing::debug;

use crate::bandit::BetaState;

const MIN_MODEL_CONFIDENCE: f64 = 0.1;
/// `magnitude = min(|pnl|*10, 1)` per the ensemble's Thompson update, as
/// distinct from the model selector's `|pnl|*100` scale.
const ENSEMBLE_MAGNITUDE_SCALE: f64 = 10.0;
const MODEL_PNL_HISTORY_CAPACITY: usize = 1000;

fn regime_weights(regime: Regime, model: &str) -> f64 {
    let (momentum, mean_rev, vol_breakout) = match regime {
        Regime::TrendingUp | Regime::TrendingDown => (0.6, 0.1, 0.3),
        Regime::MeanReverting => (0.1, 0.7, 0.2),
        Regime::HighVolatility => (0.3, 0.2, 0.5),
        Regime::LowVolatility => (0.4, 0.5, 0.1),
        Regime::Crisis => (0.0, 0.0, 0.0),
        Regime::Normal => (0.4, 0.4, 0.2),
    };
    match model {
        "momentum" => momentum,
        "mean_reversion" => mean_rev,
        "vol_breakout" => vol_breakout,
        _ => 0.0,
    }
}

/// Regime-weighted combination of the three alpha models with a Thompson-
/// sampling alternative weighting and per-model bandit state.
pub struct AlphaEnsemble {
    models: HashMap<String, AlphaModelKind>,
    bandits: HashMap<String, BetaState>,
    pnl_history: HashMap<String, Vec<f64>>,
    model_order: Vec<String>,
}

impl AlphaEnsemble {
    pub fn new(models: Vec<AlphaModelKind>) -> Self {
        let mut map = HashMap::new();
        let mut bandits = HashMap::new();
        let mut order = Vec::new();
        for model in models {
            let name = model.name().to_string();
            order.push(name.clone());
            bandits.insert(name.clone(), BetaState::default());
            map.insert(name, model);
        }
        Self {
            models: map,
            bandits,
            pnl_history: HashMap::new(),
            model_order: order,
        }
    }

    pub fn model_names(&self) -> &[String] {
        &self.model_order
    }

    /// Generate every model's raw signal plus the ensemble combination.
    pub fn generate_combined_signal(
        &mut self,
        bars: &[Bar],
        features: Option<&FeatureSet>,
        regime: Regime,
        use_thompson: bool,
        rng: &mut ThreadRng,
    ) -> (AlphaSignal, BTreeMap<String, AlphaSignal>) {
        let now = bars.last().map(|b| b.timestamp).unwrap_or_default();

        let mut raw_signals = BTreeMap::new();
        for name in &self.model_order {
            if let Some(model) = self.models.get_mut(name) {
                raw_signals.insert(name.clone(), model.generate_signal(bars, features));
            }
        }

        let combined =
            self.combine_signals(&raw_signals, regime, use_thompson, rng, now);
        (combined, raw_signals)
    }

    /// Pure combination step, factored out of signal generation so it can
    /// be exercised directly against literal signals in tests.
    fn combine_signals(
        &self,
        raw_signals: &BTreeMap<String, AlphaSignal>,
        regime: Regime,
        use_thompson: bool,
        rng: &mut ThreadRng,
        now: DateTime<Utc>,
    ) -> AlphaSignal {
        let active: BTreeMap<&String, &AlphaSignal> = raw_signals
            .iter()
            .filter(|(_, s)| s.confidence() >= MIN_MODEL_CONFIDENCE)
            .collect();

        if active.is_empty() {
            return AlphaSignal::null("ensemble", now, RegimeFilterTag::InsufficientData);
        }

        let weights: HashMap<&String, f64> = if use_thompson {
            let samples: HashMap<&String, f64> = active
                .keys()
                .map(|name| (*name, self.bandits.get(*name).map(|b| b.sample(rng)).unwrap_or(0.5)))
                .collect();
            let total: f64 = samples.values().sum();
            if total > 0.0 {
                samples.into_iter().map(|(k, v)| (k, v / total)).collect()
            } else {
                active.keys().map(|name| (*name, 1.0 / active.len() as f64)).collect()
            }
        } else {
            active.keys().map(|name| (*name, regime_weights(regime, name))).collect()
        };

        let mut weighted_value_sum = 0.0;
        let mut weighted_weight_sum = 0.0;
        let mut confidence_sum = 0.0;

        for (name, signal) in &active {
            let w = *weights.get(*name).unwrap_or(&0.0);
            let w_prime = w * signal.confidence();
            weighted_value_sum += w_prime * signal.value();
            weighted_weight_sum += w_prime;
            confidence_sum += w * signal.confidence();
        }

        let value = if weighted_weight_sum > 0.0 {
            weighted_value_sum / weighted_weight_sum
        } else {
            0.0
        };
        let confidence = confidence_sum.min(1.0);

        let mut components = BTreeMap::new();
        for (name, w) in &weights {
            components.insert(format!("weight_{name}"), *w);
        }

        AlphaSignal::new("ensemble", now, value, confidence, RegimeFilterTag::Active, components)
    }

    /// Record a realized P&L attributed to `model_name`, updating its
    /// Thompson state. `magnitude = min(|pnl|*10, 1)`.
    pub fn record_model_performance(&mut self, model_name: &str, pnl: f64) {
        let history = self.pnl_history.entry(model_name.to_string()).or_default();
        if history.len() >= MODEL_PNL_HISTORY_CAPACITY {
            history.remove(0);
        }
        history.push(pnl);

        if let Some(bandit) = self.bandits.get_mut(model_name) {
            bandit.record(pnl, pnl > 0.0, ENSEMBLE_MAGNITUDE_SCALE);
            debug!(model_name, pnl, "updated ensemble Thompson state");
        }
    }

    pub fn bandit_state(&self, model_name: &str) -> Option<BetaState> {
        self.bandits.get(model_name).copied()
    }
}
