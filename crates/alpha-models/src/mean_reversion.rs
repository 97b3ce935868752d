use std::collections::{BTreeMap, VecDeque};

use core_types::{AlphaSignal, Bar, FeatureSet, RegimeFilterTag};
use ta_indicators::{hurst_exponent, ou_half_life};

use crate::model::{push_history, validate_bars, AlphaModel};

const Z_WINDOW: usize = 20;
const HURST_THRESHOLD: f64 = 0.5;
const Z_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct MeanReversionParams;

#[derive(Debug, Clone)]
pub struct MeanReversionModel {
    history: VecDeque<AlphaSignal>,
}

impl MeanReversionModel {
    pub fn new(_params: MeanReversionParams) -> Self {
        Self { history: VecDeque::new() }
    }
}

fn zscore(closes: &[f64], window: usize) -> Option<f64> {
    if closes.len() < window {
        return None;
    }
    let slice = &closes[closes.len() - window..];
    let mean = slice.iter().sum::<f64>() / window as f64;
    let variance = slice.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / window as f64;
    let std = variance.sqrt();
    if std <= 0.0 {
        None
    } else {
        Some((closes[closes.len() - 1] - mean) / std)
    }
}

impl AlphaModel for MeanReversionModel {
    fn name(&self) -> &str {
        "mean_reversion"
    }

    fn required_features(&self) -> Vec<&'static str> {
        vec![]
    }

    fn generate_signal(&mut self, bars: &[Bar], _features: Option<&FeatureSet>) -> AlphaSignal {
        let now = bars.last().map(|b| b.timestamp).unwrap_or_default();

        if !validate_bars(bars, Z_WINDOW + 1) {
            let signal = AlphaSignal::null(self.name(), now, RegimeFilterTag::InsufficientData);
            push_history(&mut self.history, signal.clone());
            return signal;
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let hurst = hurst_exponent(&closes);

        let signal = if hurst >= HURST_THRESHOLD {
            AlphaSignal::null(self.name(), now, RegimeFilterTag::HurstFilter)
        } else {
            match zscore(&closes, Z_WINDOW) {
                Some(z) if z.abs() >= Z_THRESHOLD => {
                    let value = -(z.clamp(-2.5, 2.5)) / 2.5;
                    let hurst_confidence = (0.5 - hurst) / 0.5;
                    let z_confidence = (z.abs() / 3.0).min(1.0);
                    let confidence = (hurst_confidence + z_confidence) / 2.0;

                    let mut components = BTreeMap::new();
                    components.insert("zscore".to_string(), z);
                    components.insert("hurst".to_string(), hurst);
                    if let Some(half_life) = ou_half_life(&closes) {
                        components.insert("ou_half_life".to_string(), half_life);
                    }

                    AlphaSignal::new(self.name(), now, value, confidence, RegimeFilterTag::MeanReverting, components)
                }
                _ => AlphaSignal::null(self.name(), now, RegimeFilterTag::ThresholdFilter),
            }
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

    fn mean_reverting_bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let p = 100.0 + 5.0 * (i as f64 * 0.5).sin();
                Bar::new("X", Utc.timestamp_opt(i as i64, 0).unwrap(), p, p + 0.1, p - 0.1, p, 1000.0)
            })
            .collect()
    }

    #[test]
    fn null_on_trending_series_via_hurst_filter() {
        let mut model = MeanReversionModel::new(MeanReversionParams::default());
        let bars: Vec<Bar> = (0..200)
            .map(|i| {
                let p = 100.0 * (0.002 * i as f64).exp();
                Bar::new("X", Utc.timestamp_opt(i as i64, 0).unwrap(), p, p + 0.1, p - 0.1, p, 1000.0)
            })
            .collect();
        let signal = model.generate_signal(&bars, None);
        assert_eq!(signal.regime_filter, RegimeFilterTag::HurstFilter);
    }

    #[test]
    fn null_on_insufficient_bars() {
        let mut model = MeanReversionModel::new(MeanReversionParams::default());
        let signal = model.generate_signal(&mean_reverting_bars(5), None);
        assert_eq!(signal.regime_filter, RegimeFilterTag::InsufficientData);
    }
}
