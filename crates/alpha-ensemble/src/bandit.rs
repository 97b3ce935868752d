use rand::Rng;
use statrs::distribution::Beta;

const DECAY: f64 = 0.99;
const FLOOR: f64 = 1.0;

/// Thompson-sampling state for one arm. Pure in-memory state machine:
/// `record` moves the posterior, then decays both parameters toward the
/// floor so stale performance fades without ever going non-positive.
#[derive(Debug, Clone, Copy)]
pub struct BetaState {
    pub alpha: f64,
    pub beta: f64,
}

impl Default for BetaState {
    fn default() -> Self {
        Self { alpha: FLOOR, beta: FLOOR }
    }
}

impl BetaState {
    pub fn posterior_mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// Update from a realized P&L magnitude, then decay with a floor of
    /// 1.0. `was_correct` drives which parameter moves — it is independent
    /// of `pnl`'s sign, since a directionally-correct call can still
    /// realize a loss (slippage, a stop) and vice versa.
    pub fn record(&mut self, pnl: f64, was_correct: bool, magnitude_scale: f64) {
        let magnitude = (pnl.abs() * magnitude_scale).min(1.0);
        if was_correct {
            self.alpha += magnitude;
        } else {
            self.beta += magnitude;
        }
        self.alpha = (self.alpha * DECAY).max(FLOOR);
        self.beta = (self.beta * DECAY).max(FLOOR);
    }

    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        match Beta::new(self.alpha, self.beta) {
            Ok(dist) => {
                use rand::distributions::Distribution;
                dist.sample(rng)
            }
            Err(_) => 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_pnl_shifts_posterior_mean_up_before_decay_dominates() {
        let mut state = BetaState::default();
        let before = state.posterior_mean();
        state.record(0.1, true, 10.0);
        assert!(state.posterior_mean() >= before);
    }

    #[test]
    fn incorrect_call_shifts_posterior_mean_down() {
        let mut state = BetaState::default();
        let before = state.posterior_mean();
        state.record(0.1, false, 10.0);
        assert!(state.posterior_mean() <= before);
    }

    #[test]
    fn correctness_flag_drives_direction_independent_of_pnl_sign() {
        let mut state = BetaState::default();
        let before = state.posterior_mean();
        state.record(-0.1, true, 10.0);
        assert!(state.posterior_mean() >= before);
    }

    #[test]
    fn parameters_never_fall_below_floor() {
        let mut state = BetaState::default();
        for _ in 0..100 {
            state.record(0.001, true, 1.0);
        }
        assert!(state.alpha >= FLOOR);
        assert!(state.beta >= FLOOR);
    }
}
