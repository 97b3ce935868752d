use crate::severity::{DriftResult, Severity};

const P_VALUE_THRESHOLD: f64 = 0.05;

/// Two-sample Kolmogorov-Smirnov test. The statistic is the max gap between
/// empirical CDFs; the p-value uses the standard asymptotic Kolmogorov
/// distribution approximation.
pub fn ks_two_sample(reference: &[f64], current: &[f64]) -> DriftResult {
    let mut a: Vec<f64> = reference.to_vec();
    let mut b: Vec<f64> = current.to_vec();
    a.sort_by(|x, y| x.partial_cmp(y).unwrap());
    b.sort_by(|x, y| x.partial_cmp(y).unwrap());

    let statistic = if a.is_empty() || b.is_empty() { 0.0 } else { max_cdf_gap(&a, &b) };

    let n = a.len() as f64;
    let m = b.len() as f64;
    let p_value = if n == 0.0 || m == 0.0 {
        1.0
    } else {
        let effective_n = (n * m / (n + m)).sqrt();
        kolmogorov_sf(effective_n * statistic)
    };

    let drift_detected = p_value < P_VALUE_THRESHOLD;
    let severity = severity_for(statistic, drift_detected);

    DriftResult { statistic, p_value, drift_detected, severity }
}

fn max_cdf_gap(a: &[f64], b: &[f64]) -> f64 {
    let mut all: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
    all.sort_by(|x, y| x.partial_cmp(y).unwrap());
    all.dedup();

    let mut max_gap = 0.0_f64;
    for x in all {
        let fa = a.partition_point(|&v| v <= x) as f64 / a.len() as f64;
        let fb = b.partition_point(|&v| v <= x) as f64 / b.len() as f64;
        max_gap = max_gap.max((fa - fb).abs());
    }
    max_gap
}

/// Kolmogorov survival function `Q(t) = 2 * sum_{k=1}^inf (-1)^(k-1) exp(-2 k^2 t^2)`,
/// truncated once terms fall below machine precision.
fn kolmogorov_sf(t: f64) -> f64 {
    if t < 1e-10 {
        return 1.0;
    }
    let mut sum = 0.0;
    for k in 1..=100 {
        let term = (-1.0_f64).powi(k - 1) * (-2.0 * (k as f64).powi(2) * t * t).exp();
        sum += term;
        if term.abs() < 1e-12 {
            break;
        }
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

fn severity_for(statistic: f64, drift_detected: bool) -> Severity {
    if !drift_detected {
        return Severity::None;
    }
    if statistic > 0.3 {
        Severity::High
    } else if statistic > 0.15 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linspace_normal(mean: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let x = (i as f64 + 0.5) / n as f64;
                mean + std_normal_quantile(x)
            })
            .collect()
    }

    fn std_normal_quantile(p: f64) -> f64 {
        let t = (-2.0 * (if p < 0.5 { p } else { 1.0 - p }).ln()).sqrt();
        let c0 = 2.515517;
        let c1 = 0.802853;
        let c2 = 0.010328;
        let d1 = 1.432788;
        let d2 = 0.189269;
        let d3 = 0.001308;
        let numerator = c0 + c1 * t + c2 * t * t;
        let denominator = 1.0 + d1 * t + d2 * t * t + d3 * t * t * t;
        let value = t - numerator / denominator;
        if p < 0.5 { -value } else { value }
    }

    #[test]
    fn scenario_s7_shifted_distribution_triggers_drift() {
        let reference = linspace_normal(0.0, 1000);
        let current = linspace_normal(0.5, 1000);
        let result = ks_two_sample(&reference, &current);
        assert!(result.drift_detected);
        assert!(result.p_value < 0.001);
        assert!(matches!(result.severity, Severity::Medium | Severity::High));
    }

    #[test]
    fn identical_samples_show_no_drift() {
        let data: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let result = ks_two_sample(&data, &data);
        assert!(!result.drift_detected);
        assert_eq!(result.severity, Severity::None);
    }
}
