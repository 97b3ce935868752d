use std::collections::{BTreeMap, VecDeque};

use core_types::{AlphaSignal, Bar, FeatureSet, RegimeFilterTag};
use ta_indicators::{adx, log_returns};
use tracing::trace;

use crate::model::{push_history, validate_bars, AlphaModel};

const LOOKBACKS: [usize; 4] = [5, 10, 20, 60];
const ADX_PERIOD: usize = 14;
const ADX_THRESHOLD: f64 = 25.0;

#[derive(Debug, Clone, Copy)]
pub struct MomentumParams {
    /// Decay constant for the recency weighting inside VAM, `w_i ∝ exp(-λ·(L-1-i))`.
    pub lambda: f64,
}

impl Default for MomentumParams {
    fn default() -> Self {
        Self { lambda: 0.1 }
    }
}

#[derive(Debug, Clone)]
pub struct MomentumModel {
    params: MomentumParams,
    history: VecDeque<AlphaSignal>,
}

impl MomentumModel {
    pub fn new(params: MomentumParams) -> Self {
        Self {
            params,
            history: VecDeque::new(),
        }
    }
}

fn volatility_adjusted_momentum(returns: &[f64], lookback: usize, lambda: f64) -> Option<f64> {
    if returns.len() < lookback {
        return None;
    }
    let window = &returns[returns.len() - lookback..];

    let mut weights: Vec<f64> = (0..lookback)
        .map(|i| (-lambda * (lookback - 1 - i) as f64).exp())
        .collect();
    let weight_sum: f64 = weights.iter().sum();
    if weight_sum <= 0.0 {
        return None;
    }
    weights.iter_mut().for_each(|w| *w /= weight_sum);

    let weighted_return: f64 = window.iter().zip(weights.iter()).map(|(r, w)| r * w).sum();

    let mean = window.iter().sum::<f64>() / lookback as f64;
    let variance = window.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / lookback as f64;
    let std = variance.sqrt();

    if std <= 0.0 {
        None
    } else {
        Some(weighted_return / std)
    }
}

impl AlphaModel for MomentumModel {
    fn name(&self) -> &str {
        "momentum"
    }

    fn required_features(&self) -> Vec<&'static str> {
        vec![]
    }

    fn generate_signal(&mut self, bars: &[Bar], _features: Option<&FeatureSet>) -> AlphaSignal {
        let now = bars.last().map(|b| b.timestamp).unwrap_or_default();

        if !validate_bars(bars, ADX_PERIOD * 2 + 2) {
            let signal = AlphaSignal::null(self.name(), now, RegimeFilterTag::InsufficientData);
            push_history(&mut self.history, signal.clone());
            return signal;
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let returns = log_returns(&closes);

        let vams: Vec<f64> = LOOKBACKS
            .iter()
            .filter_map(|&l| volatility_adjusted_momentum(&returns, l, self.params.lambda))
            .collect();

        if vams.is_empty() {
            let signal = AlphaSignal::null(self.name(), now, RegimeFilterTag::InsufficientData);
            push_history(&mut self.history, signal.clone());
            return signal;
        }

        let mean_vam = vams.iter().sum::<f64>() / vams.len() as f64;

        let adx_result = adx(bars, ADX_PERIOD);
        let current_adx = adx_result.adx.last().copied().unwrap_or(0.0);

        let signal = if current_adx < ADX_THRESHOLD {
            trace!(adx = current_adx, "momentum suppressed by ADX filter");
            AlphaSignal::null(self.name(), now, RegimeFilterTag::AdxFilter)
        } else {
            let clamped = mean_vam.clamp(-3.0, 3.0);
            let value = clamped / 3.0;
            let confidence = ((current_adx - ADX_THRESHOLD) / ADX_THRESHOLD).min(1.0);
            let mut components = BTreeMap::new();
            components.insert("mean_vam".to_string(), mean_vam);
            components.insert("adx".to_string(), current_adx);
            for (lookback, vam) in LOOKBACKS.iter().zip(vams.iter()) {
                components.insert(format!("vam_{lookback}"), *vam);
            }
            AlphaSignal::new(self.name(), now, value, confidence, RegimeFilterTag::Trending, components)
        };

        push_history(&mut self.history, signal.clone());
        signal
    }

    fn history(&self) -> &VecDeque<AlphaSignal> {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn trending_bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let p = 100.0 * (0.002 * i as f64).exp();
                Bar::new("X", Utc.timestamp_opt(i as i64, 0).unwrap(), p, p + 0.1, p - 0.1, p, 1000.0)
            })
            .collect()
    }

    #[test]
    fn emits_active_positive_signal_on_clean_uptrend() {
        let mut model = MomentumModel::new(MomentumParams::default());
        let bars = trending_bars(200);
        let signal = model.generate_signal(&bars, None);
        assert!(signal.is_active());
        assert!(signal.value() > 0.0);
        assert_eq!(signal.regime_filter, RegimeFilterTag::Trending);
    }

    #[test]
    fn null_on_insufficient_bars() {
        let mut model = MomentumModel::new(MomentumParams::default());
        let bars = trending_bars(5);
        let signal = model.generate_signal(&bars, None);
        assert!(!signal.is_active());
        assert_eq!(signal.regime_filter, RegimeFilterTag::InsufficientData);
    }

    #[test]
    fn null_on_choppy_flat_series() {
        let mut model = MomentumModel::new(MomentumParams::default());
        let bars: Vec<Bar> = (0..100)
            .map(|i| {
                let p = 100.0 + if i % 2 == 0 { 0.1 } else { -0.1 };
                Bar::new("X", Utc.timestamp_opt(i as i64, 0).unwrap(), p, p + 0.1, p - 0.1, p, 1000.0)
            })
            .collect();
        let signal = model.generate_signal(&bars, None);
        assert_eq!(signal.regime_filter, RegimeFilterTag::AdxFilter);
    }
}
