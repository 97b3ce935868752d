use chrono::{DateTime, Utc};
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct LearnerConfig {
    pub retrain_frequency_days: i64,
    pub min_samples_for_retrain: usize,
    pub min_improvement: f64,
    pub min_sharpe: f64,
    pub max_degradation: f64,
}

/// Tracks samples-since-retrain and drives retrain/promotion decisions.
/// `trigger_retrain` takes an injected callback so the learner stays
/// decoupled from whatever training pipeline a deployment wires in.
#[derive(Debug, Clone)]
pub struct OnlineLearner {
    config: LearnerConfig,
    samples_since_retrain: usize,
    last_retrain_at: DateTime<Utc>,
}

impl OnlineLearner {
    pub fn new(config: LearnerConfig, started_at: DateTime<Utc>) -> Self {
        Self { config, samples_since_retrain: 0, last_retrain_at: started_at }
    }

    pub fn observe_sample(&mut self) {
        self.samples_since_retrain += 1;
    }

    pub fn should_retrain(&self, now: DateTime<Utc>) -> bool {
        let days_since_retrain = (now - self.last_retrain_at).num_days();
        self.samples_since_retrain >= self.config.min_samples_for_retrain
            && days_since_retrain >= self.config.retrain_frequency_days
    }

    /// Invoke `train_fn` if a retrain is due, then reset the counters.
    pub fn trigger_retrain(&mut self, now: DateTime<Utc>, train_fn: impl FnOnce()) -> bool {
        if !self.should_retrain(now) {
            return false;
        }
        info!(samples = self.samples_since_retrain, "retrain triggered");
        train_fn();
        self.samples_since_retrain = 0;
        self.last_retrain_at = now;
        true
    }

    /// Promote if the relative Sharpe improvement clears `min_improvement`,
    /// or the candidate beats 0.5 outright when production Sharpe is
    /// non-positive (a relative improvement is meaningless there).
    pub fn should_promote(&self, candidate_sharpe: f64, production_sharpe: f64) -> bool {
        if production_sharpe <= 0.0 {
            return candidate_sharpe > 0.5;
        }
        (candidate_sharpe - production_sharpe) / production_sharpe >= self.config.min_improvement
    }

    /// Demote if the current Sharpe has fallen below the floor, or has
    /// degraded from its historical peak by more than `max_degradation`.
    pub fn should_demote(&self, current_sharpe: f64, historical_sharpe: f64) -> bool {
        if current_sharpe < self.config.min_sharpe {
            return true;
        }
        if historical_sharpe.abs() < 1e-12 {
            return false;
        }
        (historical_sharpe - current_sharpe) / historical_sharpe >= self.config.max_degradation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ts() -> DateTime<Utc> {
        Utc.timestamp_opt(0, 0).unwrap()
    }

    fn config() -> LearnerConfig {
        LearnerConfig {
            retrain_frequency_days: 7,
            min_samples_for_retrain: 100,
            min_improvement: 0.1,
            min_sharpe: 0.3,
            max_degradation: 0.3,
        }
    }

    #[test]
    fn should_retrain_requires_both_samples_and_elapsed_time() {
        let mut learner = OnlineLearner::new(config(), ts());
        for _ in 0..100 {
            learner.observe_sample();
        }
        assert!(!learner.should_retrain(ts() + Duration::days(1)));
        assert!(learner.should_retrain(ts() + Duration::days(7)));
    }

    #[test]
    fn trigger_retrain_resets_counters_on_completion() {
        let mut learner = OnlineLearner::new(config(), ts());
        for _ in 0..100 {
            learner.observe_sample();
        }
        let mut trained = false;
        let fired = learner.trigger_retrain(ts() + Duration::days(7), || trained = true);
        assert!(fired);
        assert!(trained);
        assert!(!learner.should_retrain(ts() + Duration::days(7)));
    }

    #[test]
    fn promote_uses_absolute_bar_when_production_sharpe_nonpositive() {
        let learner = OnlineLearner::new(config(), ts());
        assert!(learner.should_promote(0.6, -0.1));
        assert!(!learner.should_promote(0.4, -0.1));
    }

    #[test]
    fn demote_on_sharpe_floor_or_degradation() {
        let learner = OnlineLearner::new(config(), ts());
        assert!(learner.should_demote(0.1, 1.0));
        assert!(learner.should_demote(0.5, 1.0));
        assert!(!learner.should_demote(0.9, 1.0));
    }
}
