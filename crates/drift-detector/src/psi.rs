use crate::severity::{DriftResult, Severity};

const NUM_BINS: usize = 10;
const PROB_FLOOR: f64 = 1e-4;
const PSI_DRIFT_THRESHOLD: f64 = 0.25;

/// Population Stability Index over 10 percentile bins carved from the
/// reference sample, with infinite outer edges so no current-sample value
/// falls outside the binning.
pub fn population_stability_index(reference: &[f64], current: &[f64]) -> DriftResult {
    if reference.is_empty() || current.is_empty() {
        return DriftResult { statistic: 0.0, p_value: 1.0, drift_detected: false, severity: Severity::None };
    }

    let edges = percentile_edges(reference, NUM_BINS);
    let expected = bin_fractions(reference, &edges);
    let actual = bin_fractions(current, &edges);

    let psi: f64 = expected
        .iter()
        .zip(actual.iter())
        .map(|(&e, &a)| {
            let e = e.max(PROB_FLOOR);
            let a = a.max(PROB_FLOOR);
            (a - e) * (a / e).ln()
        })
        .sum();

    let drift_detected = psi >= PSI_DRIFT_THRESHOLD;
    let severity = if psi >= 0.25 {
        Severity::High
    } else if psi >= 0.1 {
        Severity::Medium
    } else if psi >= 0.05 {
        Severity::Low
    } else {
        Severity::None
    };

    DriftResult { statistic: psi, p_value: f64::NAN, drift_detected, severity }
}

fn percentile_edges(reference: &[f64], num_bins: usize) -> Vec<f64> {
    let mut sorted = reference.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mut edges = vec![f64::NEG_INFINITY];
    for i in 1..num_bins {
        let rank = (i as f64 / num_bins as f64) * (sorted.len() - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = rank.ceil() as usize;
        let frac = rank - lower as f64;
        let value = sorted[lower] + frac * (sorted[upper] - sorted[lower]);
        edges.push(value);
    }
    edges.push(f64::INFINITY);
    edges
}

fn bin_fractions(values: &[f64], edges: &[f64]) -> Vec<f64> {
    let num_bins = edges.len() - 1;
    let mut counts = vec![0usize; num_bins];
    for &v in values {
        let bin = edges.windows(2).position(|w| v >= w[0] && v < w[1]).unwrap_or(num_bins - 1);
        counts[bin] += 1;
    }
    counts.into_iter().map(|c| c as f64 / values.len() as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_distribution_yields_near_zero_psi() {
        let data: Vec<f64> = (0..500).map(|i| i as f64).collect();
        let result = population_stability_index(&data, &data);
        assert!(result.statistic < 1e-6);
        assert!(!result.drift_detected);
    }

    #[test]
    fn shifted_distribution_triggers_drift() {
        let reference: Vec<f64> = (0..500).map(|i| i as f64).collect();
        let current: Vec<f64> = (0..500).map(|i| i as f64 + 400.0).collect();
        let result = population_stability_index(&reference, &current);
        assert!(result.drift_detected);
        assert_eq!(result.severity, Severity::High);
    }
}
