use chrono::{DateTime, Duration, Utc};
use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct TwapSlice {
    pub quantity: f64,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct TwapConfig {
    pub total_quantity: f64,
    pub duration_minutes: f64,
    pub num_slices: u32,
    pub randomize: bool,
}

/// Split `total_quantity` into `num_slices` evenly spaced child slices over
/// `duration_minutes`, with the final slice absorbing any rounding remainder
/// so the cumulative quantity always equals `total_quantity` exactly.
/// `randomize` jitters slice sizes +/-10% (renormalized) when set; the
/// schedule is deterministic otherwise.
pub fn schedule_twap(config: &TwapConfig, start: DateTime<Utc>, rng: &mut impl Rng) -> Vec<TwapSlice> {
    if config.num_slices == 0 {
        return Vec::new();
    }

    let base_size = config.total_quantity / config.num_slices as f64;
    let interval_secs = (config.duration_minutes * 60.0) / config.num_slices as f64;

    let mut sizes: Vec<f64> = (0..config.num_slices).map(|_| base_size).collect();

    if config.randomize {
        for size in sizes.iter_mut() {
            let jitter = rng.gen_range(-0.1..=0.1);
            *size *= 1.0 + jitter;
        }
        let scaled_sum: f64 = sizes.iter().sum();
        let scale = config.total_quantity / scaled_sum;
        for size in sizes.iter_mut() {
            *size *= scale;
        }
    }

    let n = sizes.len();
    let allocated: f64 = sizes[..n - 1].iter().sum();
    sizes[n - 1] = config.total_quantity - allocated;

    sizes
        .into_iter()
        .enumerate()
        .map(|(i, quantity)| TwapSlice {
            quantity,
            scheduled_at: start + Duration::milliseconds((interval_secs * i as f64 * 1000.0) as i64),
        })
        .collect()
}

/// Arithmetic mean of the slice prices, the theoretical TWAP benchmark used
/// to score execution quality.
pub fn theoretical_twap_price(fill_prices: &[f64]) -> f64 {
    if fill_prices.is_empty() {
        return 0.0;
    }
    fill_prices.iter().sum::<f64>() / fill_prices.len() as f64
}
