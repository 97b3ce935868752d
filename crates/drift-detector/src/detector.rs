use std::collections::{BTreeMap, VecDeque};

use tracing::warn;

use crate::ks_test::ks_two_sample;
use crate::severity::{DriftResult, Severity};

const DEFAULT_WINDOW_SIZE: usize = 1000;
const RECENT_RATE_WINDOW: usize = 100;

#[derive(Debug, Clone, Copy)]
pub struct DriftDetectorConfig {
    pub window_size: usize,
}

impl Default for DriftDetectorConfig {
    fn default() -> Self {
        Self { window_size: DEFAULT_WINDOW_SIZE }
    }
}

/// Per-feature reference windows plus a running log of drift checks, used to
/// decide when upstream models need retraining.
#[derive(Debug, Clone)]
pub struct DriftDetector {
    config: DriftDetectorConfig,
    reference_windows: BTreeMap<String, VecDeque<f64>>,
    prediction_error_reference: VecDeque<f64>,
    history: VecDeque<DriftResult>,
}

impl DriftDetector {
    pub fn new(config: DriftDetectorConfig) -> Self {
        Self {
            config,
            reference_windows: BTreeMap::new(),
            prediction_error_reference: VecDeque::new(),
            history: VecDeque::new(),
        }
    }

    pub fn seed_reference(&mut self, feature: &str, values: &[f64]) {
        let window = self.reference_windows.entry(feature.to_string()).or_default();
        for &v in values {
            push_bounded(window, v, self.config.window_size);
        }
    }

    pub fn seed_prediction_error_reference(&mut self, errors: &[f64]) {
        for &e in errors {
            push_bounded(&mut self.prediction_error_reference, e, self.config.window_size);
        }
    }

    /// Run the KS test for `feature` against its reference window, recording
    /// the result in the rolling drift-rate history.
    pub fn check_feature(&mut self, feature: &str, current: &[f64]) -> DriftResult {
        let reference: Vec<f64> = self.reference_windows.get(feature).map(|w| w.iter().copied().collect()).unwrap_or_default();
        let result = ks_two_sample(&reference, current);
        if result.severity == Severity::High {
            warn!(feature, statistic = result.statistic, p_value = result.p_value, "high-severity feature drift detected");
        }
        push_bounded_result(&mut self.history, result, RECENT_RATE_WINDOW * 10);
        result
    }

    /// KS test on `(pred - actual)` against the prediction-error reference.
    pub fn check_prediction_error(&mut self, predictions: &[f64], actuals: &[f64]) -> DriftResult {
        let errors: Vec<f64> = predictions.iter().zip(actuals.iter()).map(|(p, a)| p - a).collect();
        let reference: Vec<f64> = self.prediction_error_reference.iter().copied().collect();
        let result = ks_two_sample(&reference, &errors);
        push_bounded_result(&mut self.history, result, RECENT_RATE_WINDOW * 10);
        result
    }

    /// True if the recent-100 drift rate exceeds `threshold`, or any
    /// `high`-severity drift has ever been recorded.
    pub fn should_retrain(&self, threshold: f64) -> bool {
        if self.history.iter().any(|r| r.severity == Severity::High) {
            return true;
        }
        let recent: Vec<&DriftResult> = self.history.iter().rev().take(RECENT_RATE_WINDOW).collect();
        if recent.is_empty() {
            return false;
        }
        let drift_rate = recent.iter().filter(|r| r.drift_detected).count() as f64 / recent.len() as f64;
        drift_rate > threshold
    }
}

fn push_bounded(window: &mut VecDeque<f64>, value: f64, capacity: usize) {
    if window.len() >= capacity {
        window.pop_front();
    }
    window.push_back(value);
}

fn push_bounded_result(history: &mut VecDeque<DriftResult>, result: DriftResult, capacity: usize) {
    if history.len() >= capacity {
        history.pop_front();
    }
    history.push_back(result);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_retrain_true_after_high_severity_drift() {
        let mut detector = DriftDetector::new(DriftDetectorConfig::default());
        let reference: Vec<f64> = (0..500).map(|i| i as f64).collect();
        detector.seed_reference("feature_a", &reference);
        let shifted: Vec<f64> = (0..500).map(|i| i as f64 + 1000.0).collect();
        detector.check_feature("feature_a", &shifted);
        assert!(detector.should_retrain(0.5));
    }

    #[test]
    fn should_retrain_false_with_no_history() {
        let detector = DriftDetector::new(DriftDetectorConfig::default());
        assert!(!detector.should_retrain(0.1));
    }
}
