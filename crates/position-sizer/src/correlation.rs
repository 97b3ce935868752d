use nalgebra::{DMatrix, DVector};

/// Scale a vector of position weights down if the portfolio vol implied by
/// `weights^T * Sigma * weights` exceeds `max_portfolio_vol`. `Sigma` is
/// built from per-asset vols and a correlation matrix: `Sigma_ij = vol_i *
/// vol_j * corr_ij`. Never scales up; `capped` is set only when scaling.
pub fn correlation_scale(weights: &[f64], vols: &[f64], correlation: &DMatrix<f64>, max_portfolio_vol: f64) -> (Vec<f64>, bool) {
    let n = weights.len();
    if n == 0 || vols.len() != n || correlation.nrows() != n || correlation.ncols() != n {
        return (weights.to_vec(), false);
    }

    let w = DVector::from_column_slice(weights);
    let mut sigma = DMatrix::<f64>::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            sigma[(i, j)] = vols[i] * vols[j] * correlation[(i, j)];
        }
    }

    let portfolio_variance = (w.transpose() * &sigma * &w)[(0, 0)];
    let portfolio_vol = portfolio_variance.max(0.0).sqrt();

    if portfolio_vol > max_portfolio_vol && portfolio_vol > 0.0 {
        let scale = max_portfolio_vol / portfolio_vol;
        (weights.iter().map(|w| w * scale).collect(), true)
    } else {
        (weights.to_vec(), false)
    }
}
