use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Output of one feature-engine pass for one symbol at one timestamp.
///
/// Known features are named fields so alpha models can depend on them
/// without string lookups. Anything diagnostic or experimental goes in
/// `extra`, which also carries the z-score-normalized mirrors (named
/// `<feature>_zscore`) of the fields listed in [`FeatureSet::Z_SCORE_FIELDS`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSet {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,

    pub log_return_1: f64,
    pub log_return_5: f64,
    pub log_return_20: f64,

    pub realized_vol_20: f64,
    pub realized_vol_60: f64,
    pub ewma_vol: f64,

    pub momentum_5: f64,
    pub momentum_10: f64,
    pub momentum_20: f64,
    pub momentum_60: f64,

    pub vwap_deviation_20: f64,
    pub volume_ratio: f64,
    pub volume_trend: f64,
    pub dollar_volume: f64,
    pub order_book_imbalance: Option<f64>,

    pub rsi_14: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub bollinger_position: f64,
    pub atr_14: f64,

    pub vol_regime: u8,
    pub trend_regime: u8,
    pub hurst_exponent: f64,
    pub vol_of_vol: f64,

    /// Diagnostics plus `<feature>_zscore` mirrors. Never required for a
    /// model to run; absence of a key means "not computed this pass".
    pub extra: BTreeMap<String, f64>,
}

impl FeatureSet {
    /// Fields normalized (100-bar rolling window, clipped to +/-3) into
    /// `extra` under a `_zscore` suffix by the feature engine.
    pub const Z_SCORE_FIELDS: &'static [&'static str] = &[
        "log_return_1",
        "momentum_20",
        "rsi_14",
        "macd_histogram",
        "atr_14",
    ];

    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "log_return_1" => Some(self.log_return_1),
            "log_return_5" => Some(self.log_return_5),
            "log_return_20" => Some(self.log_return_20),
            "realized_vol_20" => Some(self.realized_vol_20),
            "realized_vol_60" => Some(self.realized_vol_60),
            "ewma_vol" => Some(self.ewma_vol),
            "momentum_5" => Some(self.momentum_5),
            "momentum_10" => Some(self.momentum_10),
            "momentum_20" => Some(self.momentum_20),
            "momentum_60" => Some(self.momentum_60),
            "vwap_deviation_20" => Some(self.vwap_deviation_20),
            "volume_ratio" => Some(self.volume_ratio),
            "volume_trend" => Some(self.volume_trend),
            "dollar_volume" => Some(self.dollar_volume),
            "order_book_imbalance" => self.order_book_imbalance,
            "rsi_14" => Some(self.rsi_14),
            "macd" => Some(self.macd),
            "macd_signal" => Some(self.macd_signal),
            "macd_histogram" => Some(self.macd_histogram),
            "bollinger_position" => Some(self.bollinger_position),
            "atr_14" => Some(self.atr_14),
            "hurst_exponent" => Some(self.hurst_exponent),
            "vol_of_vol" => Some(self.vol_of_vol),
            other => self.extra.get(other).copied(),
        }
    }

    pub fn zscore_of(&self, name: &str) -> Option<f64> {
        self.extra.get(&format!("{name}_zscore")).copied()
    }

    pub fn is_finite(&self) -> bool {
        [
            self.log_return_1,
            self.log_return_5,
            self.log_return_20,
            self.realized_vol_20,
            self.realized_vol_60,
            self.ewma_vol,
            self.momentum_5,
            self.momentum_10,
            self.momentum_20,
            self.momentum_60,
            self.vwap_deviation_20,
            self.volume_ratio,
            self.volume_trend,
            self.dollar_volume,
            self.rsi_14,
            self.macd,
            self.macd_signal,
            self.macd_histogram,
            self.bollinger_position,
            self.atr_14,
            self.hurst_exponent,
            self.vol_of_vol,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> FeatureSet {
        FeatureSet {
            symbol: "AAPL".into(),
            timestamp: Utc.timestamp_opt(0, 0).unwrap(),
            log_return_1: 0.01,
            log_return_5: 0.02,
            log_return_20: 0.03,
            realized_vol_20: 0.2,
            realized_vol_60: 0.18,
            ewma_vol: 0.19,
            momentum_5: 0.1,
            momentum_10: 0.2,
            momentum_20: 0.3,
            momentum_60: 0.4,
            vwap_deviation_20: 0.0,
            volume_ratio: 1.0,
            volume_trend: 0.0,
            dollar_volume: 1_000_000.0,
            order_book_imbalance: None,
            rsi_14: 55.0,
            macd: 0.5,
            macd_signal: 0.4,
            macd_histogram: 0.1,
            bollinger_position: 0.2,
            atr_14: 1.5,
            vol_regime: 1,
            trend_regime: 0,
            hurst_exponent: 0.55,
            vol_of_vol: 0.05,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn get_resolves_known_fields_by_name() {
        let fs = sample();
        assert_eq!(fs.get("rsi_14"), Some(55.0));
        assert_eq!(fs.get("order_book_imbalance"), None);
    }

    #[test]
    fn get_falls_back_to_extra_map() {
        let mut fs = sample();
        fs.extra.insert("custom_signal".into(), 9.0);
        assert_eq!(fs.get("custom_signal"), Some(9.0));
        assert_eq!(fs.get("nonexistent"), None);
    }

    #[test]
    fn zscore_of_reads_suffixed_extra_key() {
        let mut fs = sample();
        fs.extra.insert("rsi_14_zscore".into(), 1.2);
        assert_eq!(fs.zscore_of("rsi_14"), Some(1.2));
    }

    #[test]
    fn is_finite_detects_nan() {
        let mut fs = sample();
        assert!(fs.is_finite());
        fs.atr_14 = f64::NAN;
        assert!(!fs.is_finite());
    }
}
