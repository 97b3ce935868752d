use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Why an alpha model emitted a null (inactive) signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegimeFilterTag {
    InvalidData,
    InsufficientData,
    AdxFilter,
    HurstFilter,
    ThresholdFilter,
    LowVol,
    NoBreakout,
    /// Not a suppression — the model believes a real, active signal.
    Active,
    /// Momentum's active signal: ADX confirms a trend is underway.
    Trending,
    /// Mean-reversion's active signal: low Hurst plus a z-score extreme.
    MeanReverting,
    /// Volatility-breakout's active signal: a confirmed range break.
    BreakoutActive,
}

impl RegimeFilterTag {
    pub fn label(&self) -> &'static str {
        match self {
            RegimeFilterTag::InvalidData => "INVALID_DATA",
            RegimeFilterTag::InsufficientData => "INSUFFICIENT_DATA",
            RegimeFilterTag::AdxFilter => "ADX_FILTER",
            RegimeFilterTag::HurstFilter => "HURST_FILTER",
            RegimeFilterTag::ThresholdFilter => "THRESHOLD_FILTER",
            RegimeFilterTag::LowVol => "LOW_VOL",
            RegimeFilterTag::NoBreakout => "NO_BREAKOUT",
            RegimeFilterTag::Active => "ACTIVE",
            RegimeFilterTag::Trending => "TRENDING",
            RegimeFilterTag::MeanReverting => "MEAN_REVERTING",
            RegimeFilterTag::BreakoutActive => "BREAKOUT_ACTIVE",
        }
    }
}

/// Output of an alpha model. Constructed only via `AlphaSignal::new`, which
/// clamps `value`/`confidence` at construction — it is immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlphaSignal {
    value: f64,
    confidence: f64,
    pub regime_filter: RegimeFilterTag,
    /// Diagnostic-only breakdown (e.g. per-lookback VAM contributions). Never
    /// interpreted by the ensemble — it exists for logging and debugging.
    pub components: BTreeMap<String, f64>,
    pub model_name: String,
    pub timestamp: DateTime<Utc>,
}

impl AlphaSignal {
    pub fn new(
        model_name: impl Into<String>,
        timestamp: DateTime<Utc>,
        value: f64,
        confidence: f64,
        regime_filter: RegimeFilterTag,
        components: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            value: value.clamp(-1.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
            regime_filter,
            components,
            model_name: model_name.into(),
            timestamp,
        }
    }

    /// A signal carrying no directional view, tagged with the reason.
    pub fn null(model_name: impl Into<String>, timestamp: DateTime<Utc>, tag: RegimeFilterTag) -> Self {
        Self::new(model_name, timestamp, 0.0, 0.0, tag, BTreeMap::new())
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn is_active(&self) -> bool {
        self.value.abs() > 0.01 && self.confidence > 0.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.timestamp_opt(0, 0).unwrap()
    }

    #[test]
    fn clamps_value_and_confidence_at_construction() {
        let s = AlphaSignal::new("m", ts(), 5.0, 3.0, RegimeFilterTag::Active, BTreeMap::new());
        assert_eq!(s.value(), 1.0);
        assert_eq!(s.confidence(), 1.0);

        let s = AlphaSignal::new("m", ts(), -5.0, -3.0, RegimeFilterTag::Active, BTreeMap::new());
        assert_eq!(s.value(), -1.0);
        assert_eq!(s.confidence(), 0.0);
    }

    #[test]
    fn null_signal_is_inactive() {
        let s = AlphaSignal::null("m", ts(), RegimeFilterTag::AdxFilter);
        assert!(!s.is_active());
        assert_eq!(s.regime_filter, RegimeFilterTag::AdxFilter);
    }

    #[test]
    fn is_active_requires_both_thresholds() {
        let borderline_value =
            AlphaSignal::new("m", ts(), 0.01, 0.5, RegimeFilterTag::Active, BTreeMap::new());
        assert!(!borderline_value.is_active());

        let borderline_conf =
            AlphaSignal::new("m", ts(), 0.5, 0.1, RegimeFilterTag::Active, BTreeMap::new());
        assert!(!borderline_conf.is_active());

        let active = AlphaSignal::new("m", ts(), 0.5, 0.5, RegimeFilterTag::Active, BTreeMap::new());
        assert!(active.is_active());
    }
}
