use chrono::{DateTime, Duration, Utc};

const PROFILE_LEARNING_RATE: f64 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct VwapSlice {
    pub quantity: f64,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct VwapConfig {
    pub total_quantity: f64,
    pub duration_minutes: f64,
    pub num_slices: u32,
}

/// Tracks an intraday volume profile, seeded with the canonical U-shaped
/// curve `0.5 + 2*(x - 0.5)^2` (heavier at the open/close) and refined with
/// an EWMA update as realized volume fractions are observed.
#[derive(Debug, Clone)]
pub struct VolumeProfile {
    weights: Vec<f64>,
}

impl VolumeProfile {
    pub fn u_shaped(num_buckets: usize) -> Self {
        let weights: Vec<f64> = (0..num_buckets)
            .map(|i| {
                let x = if num_buckets <= 1 { 0.5 } else { i as f64 / (num_buckets - 1) as f64 };
                0.5 + 2.0 * (x - 0.5).powi(2)
            })
            .collect();
        let total: f64 = weights.iter().sum();
        Self {
            weights: weights.into_iter().map(|w| w / total).collect(),
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// `weights[i] <- (1 - lr) * weights[i] + lr * observed[i]`, renormalized.
    pub fn update(&mut self, observed_fractions: &[f64]) {
        if observed_fractions.len() != self.weights.len() {
            return;
        }
        for (w, &obs) in self.weights.iter_mut().zip(observed_fractions) {
            *w = (1.0 - PROFILE_LEARNING_RATE) * *w + PROFILE_LEARNING_RATE * obs;
        }
        let total: f64 = self.weights.iter().sum();
        if total > 0.0 {
            for w in self.weights.iter_mut() {
                *w /= total;
            }
        }
    }
}

/// Slice `total_quantity` proportionally to `profile`'s bucket weights
/// rather than evenly, so heavier-volume buckets get larger child orders.
pub fn schedule_vwap(config: &VwapConfig, profile: &VolumeProfile, start: DateTime<Utc>) -> Vec<VwapSlice> {
    if config.num_slices == 0 || profile.weights().len() != config.num_slices as usize {
        return Vec::new();
    }

    let interval_secs = (config.duration_minutes * 60.0) / config.num_slices as f64;
    let mut sizes: Vec<f64> = profile.weights().iter().map(|w| w * config.total_quantity).collect();

    let n = sizes.len();
    let allocated: f64 = sizes[..n - 1].iter().sum();
    sizes[n - 1] = config.total_quantity - allocated;

    sizes
        .into_iter()
        .enumerate()
        .map(|(i, quantity)| VwapSlice {
            quantity,
            scheduled_at: start + Duration::milliseconds((interval_secs * i as f64 * 1000.0) as i64),
        })
        .collect()
}

/// Volume-weighted mean of fill prices, the theoretical VWAP benchmark.
pub fn theoretical_vwap_price(fills: &[(f64, f64)]) -> f64 {
    let total_quantity: f64 = fills.iter().map(|(_, q)| q).sum();
    if total_quantity <= 0.0 {
        return 0.0;
    }
    fills.iter().map(|(p, q)| p * q).sum::<f64>() / total_quantity
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.timestamp_opt(0, 0).unwrap()
    }

    #[test]
    fn u_shaped_profile_weighs_edges_more_than_middle() {
        let profile = VolumeProfile::u_shaped(5);
        let weights = profile.weights();
        assert!(weights[0] > weights[2]);
        assert!(weights[4] > weights[2]);
        let total: f64 = weights.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn schedule_sums_to_total_quantity() {
        let profile = VolumeProfile::u_shaped(6);
        let config = VwapConfig { total_quantity: 600.0, duration_minutes: 60.0, num_slices: 6 };
        let slices = schedule_vwap(&config, &profile, ts());
        let total: f64 = slices.iter().map(|s| s.quantity).sum();
        assert!((total - 600.0).abs() < 1e-6);
    }

    #[test]
    fn profile_update_shifts_weights_toward_observed() {
        let mut profile = VolumeProfile::u_shaped(3);
        let before = profile.weights()[1];
        profile.update(&[0.1, 0.8, 0.1]);
        assert!(profile.weights()[1] > before);
    }
}
