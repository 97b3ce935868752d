const MAX_KELLY_FRACTION: f64 = 0.25;

/// Fractional Kelly sizing from win rate and win/loss ratio, capped at 25%.
/// `f* = p - (1-p)/b` where `b` is the win/loss ratio; returns 0 for a
/// non-positive edge.
pub fn kelly_fraction(win_rate: f64, avg_win: f64, avg_loss: f64, kelly_multiplier: f64) -> f64 {
    if avg_loss <= 0.0 || avg_win <= 0.0 || !(0.0..=1.0).contains(&win_rate) {
        return 0.0;
    }
    let b = avg_win / avg_loss;
    let p = win_rate;
    let q = 1.0 - p;

    let raw = p - q / b;
    if raw <= 0.0 {
        return 0.0;
    }
    (raw * kelly_multiplier).min(MAX_KELLY_FRACTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_edge_is_capped_at_quarter() {
        let f = kelly_fraction(0.9, 10.0, 1.0, 1.0);
        assert!((f - MAX_KELLY_FRACTION).abs() < 1e-9);
    }

    #[test]
    fn negative_edge_returns_zero() {
        assert_eq!(kelly_fraction(0.3, 1.0, 3.0, 1.0), 0.0);
    }

    #[test]
    fn half_kelly_halves_the_raw_fraction() {
        let full = kelly_fraction(0.6, 1.0, 1.0, 1.0);
        let half = kelly_fraction(0.6, 1.0, 1.0, 0.5);
        assert!((half - full / 2.0).abs() < 1e-9);
    }
}
