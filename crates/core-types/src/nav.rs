use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordered NAV samples with a running peak. `peak_nav` only ever increases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavSeries {
    samples: Vec<(DateTime<Utc>, f64)>,
    peak_nav: f64,
}

impl NavSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a NAV observation, advancing the peak if it's a new high.
    /// Returns the resulting drawdown.
    pub fn record(&mut self, timestamp: DateTime<Utc>, nav: f64) -> f64 {
        self.samples.push((timestamp, nav));
        if nav > self.peak_nav {
            self.peak_nav = nav;
        }
        self.current_drawdown_for(nav)
    }

    pub fn peak_nav(&self) -> f64 {
        self.peak_nav
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.last().map(|(_, nav)| *nav)
    }

    pub fn current_drawdown(&self) -> f64 {
        self.latest().map(|nav| self.current_drawdown_for(nav)).unwrap_or(0.0)
    }

    fn current_drawdown_for(&self, nav: f64) -> f64 {
        if self.peak_nav <= 0.0 {
            0.0
        } else {
            ((self.peak_nav - nav) / self.peak_nav).clamp(0.0, 1.0)
        }
    }

    pub fn samples(&self) -> &[(DateTime<Utc>, f64)] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(n: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(n, 0).unwrap()
    }

    #[test]
    fn peak_is_monotone_and_drawdown_bounded() {
        let mut series = NavSeries::new();
        series.record(ts(0), 100_000.0);
        series.record(ts(1), 105_000.0);
        let dd = series.record(ts(2), 94_500.0);

        assert_eq!(series.peak_nav(), 105_000.0);
        assert!((dd - 0.10).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&dd));
    }

    #[test]
    fn zero_peak_yields_zero_drawdown() {
        let series = NavSeries::new();
        assert_eq!(series.current_drawdown(), 0.0);
    }
}
