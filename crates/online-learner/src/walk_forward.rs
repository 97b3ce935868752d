#[derive(Debug, Clone, Copy)]
pub struct WindowReport {
    pub accuracy: f64,
    pub mse: f64,
    pub correlation: f64,
}

#[derive(Debug, Clone)]
pub struct WalkForwardReport {
    pub windows: Vec<WindowReport>,
    pub accuracy_trend: i8,
}

/// Partition `preds`/`actuals` into disjoint windows of size `window` and
/// report per-window sign-match accuracy, MSE, and correlation, plus an
/// overall trend (-1/0/+1) from the sign of a linear-regression slope fit
/// to the window accuracies.
pub fn walk_forward_validate(preds: &[f64], actuals: &[f64], window: usize) -> WalkForwardReport {
    let n = preds.len().min(actuals.len());
    if window == 0 || n == 0 {
        return WalkForwardReport { windows: Vec::new(), accuracy_trend: 0 };
    }

    let mut windows = Vec::new();
    let mut start = 0;
    while start < n {
        let end = (start + window).min(n);
        windows.push(window_report(&preds[start..end], &actuals[start..end]));
        start = end;
    }

    let accuracies: Vec<f64> = windows.iter().map(|w| w.accuracy).collect();
    let accuracy_trend = trend_sign(&accuracies);

    WalkForwardReport { windows, accuracy_trend }
}

fn window_report(preds: &[f64], actuals: &[f64]) -> WindowReport {
    let n = preds.len();
    if n == 0 {
        return WindowReport { accuracy: 0.0, mse: 0.0, correlation: 0.0 };
    }

    let matches = preds.iter().zip(actuals).filter(|(p, a)| p.signum() == a.signum()).count();
    let accuracy = matches as f64 / n as f64;

    let mse = preds.iter().zip(actuals).map(|(p, a)| (p - a).powi(2)).sum::<f64>() / n as f64;

    let correlation = pearson_correlation(preds, actuals);

    WindowReport { accuracy, mse, correlation }
}

fn pearson_correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    if a.len() < 2 {
        return 0.0;
    }
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let cov: f64 = a.iter().zip(b).map(|(x, y)| (x - mean_a) * (y - mean_b)).sum();
    let var_a: f64 = a.iter().map(|x| (x - mean_a).powi(2)).sum();
    let var_b: f64 = b.iter().map(|y| (y - mean_b).powi(2)).sum();
    let denom = (var_a * var_b).sqrt();
    if denom < 1e-12 {
        0.0
    } else {
        cov / denom
    }
}

/// OLS slope of `values` against their index; returns the sign, 0 if flat.
fn trend_sign(values: &[f64]) -> i8 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return 0;
    }
    let xs: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = values.iter().sum::<f64>() / n;
    let numerator: f64 = xs.iter().zip(values).map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
    let denominator: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    if denominator.abs() < 1e-12 {
        return 0;
    }
    let slope = numerator / denominator;
    if slope > 1e-9 {
        1
    } else if slope < -1e-9 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions_score_full_accuracy() {
        let preds = vec![1.0, -1.0, 1.0, -1.0];
        let actuals = vec![1.0, -1.0, 1.0, -1.0];
        let report = walk_forward_validate(&preds, &actuals, 2);
        assert_eq!(report.windows.len(), 2);
        for window in &report.windows {
            assert_eq!(window.accuracy, 1.0);
            assert_eq!(window.mse, 0.0);
        }
    }

    #[test]
    fn improving_accuracy_yields_positive_trend() {
        let accuracies = vec![0.4, 0.5, 0.6, 0.7, 0.8];
        assert_eq!(trend_sign(&accuracies), 1);
    }
}
