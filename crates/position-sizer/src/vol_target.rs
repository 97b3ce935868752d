use core_types::{AlphaSignal, PositionSize};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct SizerConfig {
    pub target_volatility: f64,
    pub max_leverage: f64,
    pub max_position_pct: f64,
    pub min_position: f64,
    pub risk_budget: f64,
}

impl Default for SizerConfig {
    fn default() -> Self {
        Self {
            target_volatility: 0.15,
            max_leverage: 2.0,
            max_position_pct: 0.20,
            min_position: 0.01,
            risk_budget: 1.0,
        }
    }
}

/// Volatility-targeted sizing: scale the raw signal by the ratio of target
/// to realized vol, clip to leverage/position bounds, and zero out below
/// `min_position`.
pub fn vol_targeted_size(config: &SizerConfig, signal: &AlphaSignal, nav: f64, price: f64, asset_vol: f64) -> PositionSize {
    let clipped_vol = asset_vol.clamp(0.05, 1.0);
    let vol_scalar = config.target_volatility / clipped_vol;

    let raw_pct = vol_scalar * signal.value() * signal.confidence() * config.risk_budget;
    let leverage_bound = config.max_leverage;
    let position_bound = config.max_position_pct;
    let bound = leverage_bound.min(position_bound);

    let mut position_pct = raw_pct.clamp(-bound, bound);
    if position_pct.abs() < config.min_position {
        position_pct = 0.0;
    }

    let capped = (raw_pct - position_pct).abs() > f64::EPSILON;
    if capped {
        debug!(raw_pct, position_pct, "position size capped by leverage/position bound");
    }

    let dollar_amount = position_pct * nav;
    let num_units = if price > 0.0 { dollar_amount / price } else { 0.0 };

    PositionSize {
        percent_of_nav: position_pct,
        dollar_amount,
        num_units,
        vol_scalar,
        raw_signal: signal.value(),
        capped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::RegimeFilterTag;
    use std::collections::BTreeMap;

    #[test]
    fn matches_spec_scenario_s2() {
        let config = SizerConfig {
            target_volatility: 0.15,
            max_leverage: 2.0,
            max_position_pct: 0.20,
            min_position: 0.0,
            risk_budget: 1.0,
        };
        let signal = AlphaSignal::new(
            "m",
            Utc.timestamp_opt(0, 0).unwrap(),
            1.0,
            1.0,
            RegimeFilterTag::Active,
            BTreeMap::new(),
        );

        let size = vol_targeted_size(&config, &signal, 100_000.0, 100.0, 0.05);

        assert!((size.vol_scalar - 3.0).abs() < 1e-9);
        assert!((size.percent_of_nav - 0.20).abs() < 1e-9);
        assert!(size.capped);
        assert!((size.dollar_amount - 20_000.0).abs() < 1e-6);
        assert!((size.num_units - 200.0).abs() < 1e-6);
    }

    #[test]
    fn zeroes_out_below_min_position() {
        let config = SizerConfig { min_position: 0.05, ..SizerConfig::default() };
        let signal = AlphaSignal::new(
            "m",
            Utc.timestamp_opt(0, 0).unwrap(),
            0.02,
            0.5,
            RegimeFilterTag::Active,
            BTreeMap::new(),
        );
        let size = vol_targeted_size(&config, &signal, 100_000.0, 100.0, 0.20);
        assert_eq!(size.percent_of_nav, 0.0);
    }
}
