use core_types::{FeatureSet, Regime};

const CRISIS_VOL_THRESHOLD: f64 = 0.50;
const MEAN_REVERSION_HURST_THRESHOLD: f64 = 0.45;

/// `vol > 0.50 -> CRISIS`; else trending by `trend_regime`/20-bar momentum
/// sign; else mean-reverting by Hurst; else by `vol_regime`; else NORMAL.
pub fn classify_regime(features: &FeatureSet) -> Regime {
    if features.realized_vol_20 > CRISIS_VOL_THRESHOLD {
        return Regime::Crisis;
    }

    if features.trend_regime == 1 {
        return if features.momentum_20 >= 0.0 { Regime::TrendingUp } else { Regime::TrendingDown };
    }

    if features.hurst_exponent < MEAN_REVERSION_HURST_THRESHOLD {
        return Regime::MeanReverting;
    }

    match features.vol_regime {
        0 => Regime::LowVolatility,
        2 => Regime::HighVolatility,
        _ => Regime::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn base_features() -> FeatureSet {
        FeatureSet {
            symbol: "AAPL".into(),
            timestamp: Utc.timestamp_opt(0, 0).unwrap(),
            log_return_1: 0.0,
            log_return_5: 0.0,
            log_return_20: 0.0,
            realized_vol_20: 0.1,
            realized_vol_60: 0.1,
            ewma_vol: 0.1,
            momentum_5: 0.0,
            momentum_10: 0.0,
            momentum_20: 0.0,
            momentum_60: 0.0,
            vwap_deviation_20: 0.0,
            volume_ratio: 1.0,
            volume_trend: 0.0,
            dollar_volume: 0.0,
            order_book_imbalance: None,
            rsi_14: 50.0,
            macd: 0.0,
            macd_signal: 0.0,
            macd_histogram: 0.0,
            bollinger_position: 0.0,
            atr_14: 0.0,
            vol_regime: 1,
            trend_regime: 0,
            hurst_exponent: 0.5,
            vol_of_vol: 0.0,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn high_vol_overrides_everything_as_crisis() {
        let features = FeatureSet { realized_vol_20: 0.6, trend_regime: 1, ..base_features() };
        assert_eq!(classify_regime(&features), Regime::Crisis);
    }

    #[test]
    fn trending_uses_momentum_sign() {
        let up = FeatureSet { trend_regime: 1, momentum_20: 0.05, ..base_features() };
        assert_eq!(classify_regime(&up), Regime::TrendingUp);

        let down = FeatureSet { trend_regime: 1, momentum_20: -0.05, ..base_features() };
        assert_eq!(classify_regime(&down), Regime::TrendingDown);
    }

    #[test]
    fn low_hurst_without_trend_is_mean_reverting() {
        let features = FeatureSet { hurst_exponent: 0.3, ..base_features() };
        assert_eq!(classify_regime(&features), Regime::MeanReverting);
    }

    #[test]
    fn falls_back_to_vol_regime_then_normal() {
        let low = FeatureSet { vol_regime: 0, ..base_features() };
        assert_eq!(classify_regime(&low), Regime::LowVolatility);

        let high = FeatureSet { vol_regime: 2, ..base_features() };
        assert_eq!(classify_regime(&high), Regime::HighVolatility);

        let normal = base_features();
        assert_eq!(classify_regime(&normal), Regime::Normal);
    }
}
