use std::collections::{BTreeMap, VecDeque};

use core_types::{AlphaSignal, Bar, FeatureSet, RegimeFilterTag};
use ta_indicators::{atr, average as atr_average};

use crate::model::{push_history, validate_bars, AlphaModel};

const ATR_PERIOD: usize = 14;
const LONG_ATR_WINDOW: usize = 60;
const ATR_RATIO_THRESHOLD: f64 = 1.5;
const BREAKOUT_WINDOW: usize = 21;
const VOLUME_CONFIRM_RATIO: f64 = 1.2;
const VOLUME_BONUS: f64 = 1.5;
const VOLUME_PENALTY: f64 = 0.8;

#[derive(Debug, Clone, Copy, Default)]
pub struct VolatilityBreakoutParams;

#[derive(Debug, Clone)]
pub struct VolatilityBreakoutModel {
    history: VecDeque<AlphaSignal>,
}

impl VolatilityBreakoutModel {
    pub fn new(_params: VolatilityBreakoutParams) -> Self {
        Self { history: VecDeque::new() }
    }
}

impl AlphaModel for VolatilityBreakoutModel {
    fn name(&self) -> &str {
        "vol_breakout"
    }

    fn required_features(&self) -> Vec<&'static str> {
        vec![]
    }

    fn generate_signal(&mut self, bars: &[Bar], _features: Option<&FeatureSet>) -> AlphaSignal {
        let now = bars.last().map(|b| b.timestamp).unwrap_or_default();

        if !validate_bars(bars, ATR_PERIOD + BREAKOUT_WINDOW + 1) {
            let signal = AlphaSignal::null(self.name(), now, RegimeFilterTag::InsufficientData);
            push_history(&mut self.history, signal.clone());
            return signal;
        }

        let atr_series = atr(bars, ATR_PERIOD);
        let current_atr = atr_series.last().copied().unwrap_or(0.0);
        let long_atr = atr_average(&atr_series, atr_series.len().min(LONG_ATR_WINDOW));
        let atr_ratio = if long_atr > 0.0 { current_atr / long_atr } else { 0.0 };

        if atr_ratio < ATR_RATIO_THRESHOLD {
            let signal = AlphaSignal::null(self.name(), now, RegimeFilterTag::LowVol);
            push_history(&mut self.history, signal.clone());
            return signal;
        }

        let lookback = &bars[bars.len() - BREAKOUT_WINDOW..bars.len() - 1];
        let highest = lookback.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let lowest = lookback.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let close = bars.last().unwrap().close;
        let range = (highest - lowest).max(f64::EPSILON);

        let (direction, strength) = if close > highest {
            (1.0, (close - highest) / range)
        } else if close < lowest {
            (-1.0, (lowest - close) / range)
        } else {
            (0.0, 0.0)
        };

        if direction == 0.0 {
            let signal = AlphaSignal::null(self.name(), now, RegimeFilterTag::NoBreakout);
            push_history(&mut self.history, signal.clone());
            return signal;
        }

        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        let trailing = &volumes[volumes.len() - BREAKOUT_WINDOW..volumes.len() - 1];
        let mean_volume = trailing.iter().sum::<f64>() / trailing.len() as f64;
        let current_volume = *volumes.last().unwrap();
        let volume_confirmed = mean_volume > 0.0 && current_volume > VOLUME_CONFIRM_RATIO * mean_volume;
        let volume_factor = if volume_confirmed { VOLUME_BONUS } else { VOLUME_PENALTY };

        let vol_factor = ((atr_ratio - 1.0) / (ATR_RATIO_THRESHOLD - 1.0)).min(2.0);
        let value = (direction * strength * vol_factor * volume_factor).clamp(-1.0, 1.0);

        let confirmations = [atr_ratio >= ATR_RATIO_THRESHOLD, strength.abs() > 0.5, volume_confirmed]
            .iter()
            .filter(|c| **c)
            .count();
        let confidence = confirmations as f64 / 3.0;

        let mut components = BTreeMap::new();
        components.insert("atr_ratio".to_string(), atr_ratio);
        components.insert("strength".to_string(), strength);
        components.insert("direction".to_string(), direction);
        components.insert("volume_factor".to_string(), volume_factor);

        let signal = AlphaSignal::new(self.name(), now, value, confidence, RegimeFilterTag::BreakoutActive, components);
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

    fn bar(t: i64, h: f64, l: f64, c: f64, v: f64) -> Bar {
        Bar::new("X", Utc.timestamp_opt(t, 0).unwrap(), c, h, l, c, v)
    }

    #[test]
    fn null_when_volatility_too_low() {
        let mut model = VolatilityBreakoutModel::new(VolatilityBreakoutParams::default());
        let bars: Vec<Bar> = (0..100).map(|i| bar(i, 100.2, 99.8, 100.0, 1000.0)).collect();
        let signal = model.generate_signal(&bars, None);
        assert_eq!(signal.regime_filter, RegimeFilterTag::LowVol);
    }

    #[test]
    fn null_on_insufficient_bars() {
        let mut model = VolatilityBreakoutModel::new(VolatilityBreakoutParams::default());
        let bars: Vec<Bar> = (0..10).map(|i| bar(i, 101.0, 99.0, 100.0, 1000.0)).collect();
        let signal = model.generate_signal(&bars, None);
        assert_eq!(signal.regime_filter, RegimeFilterTag::InsufficientData);
    }
}
