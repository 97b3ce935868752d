const MIN_SLICE_SCALE: f64 = 0.5;
const MAX_SLICE_SCALE: f64 = 2.0;

#[derive(Debug, Clone, Copy)]
pub struct AdaptiveConfig {
    pub price_tolerance: f64,
    pub vol_threshold: f64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self { price_tolerance: 0.005, vol_threshold: 1.5 }
    }
}

/// Wraps a TWAP/VWAP schedule with price- and volatility-aware adjustments:
/// accelerate when price is running away favorably, pause when volatility
/// spikes, and scale remaining slice sizes to compensate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptiveExecutor {
    pub config: AdaptiveConfig,
}

impl AdaptiveExecutor {
    pub fn new(config: AdaptiveConfig) -> Self {
        Self { config }
    }

    /// Accelerate (pull forward remaining quantity) once adverse price drift
    /// exceeds `price_tolerance * (1 - urgency)`: higher urgency lowers the
    /// bar to accelerate.
    pub fn should_accelerate(&self, price_drift_pct: f64, urgency: f64) -> bool {
        let threshold = self.config.price_tolerance * (1.0 - urgency.clamp(0.0, 1.0));
        price_drift_pct.abs() > threshold
    }

    /// Pause slicing when current volatility exceeds `vol_threshold` times
    /// the baseline.
    pub fn should_pause(&self, current_vol: f64, baseline_vol: f64) -> bool {
        baseline_vol > 0.0 && current_vol > self.config.vol_threshold * baseline_vol
    }

    /// Scale the next slice size by `factor`, clipped to [0.5, 2.0] so no
    /// single slice dominates or vanishes.
    pub fn adjust_slice_size(&self, base_size: f64, factor: f64) -> f64 {
        base_size * factor.clamp(MIN_SLICE_SCALE, MAX_SLICE_SCALE)
    }
}
