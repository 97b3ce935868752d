use std::collections::HashMap;

use core_types::Side;

/// A stop on one open position. Trailing stops only move in the
/// favorable direction (up for longs) — `update` is a no-op otherwise.
/// Short-side trailing semantics are left to the caller; only the long
/// convention (`price <= stop` triggers) is implemented here.
#[derive(Debug, Clone, Copy)]
pub struct PositionStop {
    pub entry_price: f64,
    pub stop_price: f64,
    pub side: Side,
    pub trailing_pct: Option<f64>,
}

impl PositionStop {
    pub fn new(entry_price: f64, initial_stop: f64, side: Side, trailing_pct: Option<f64>) -> Self {
        Self {
            entry_price,
            stop_price: initial_stop,
            side,
            trailing_pct,
        }
    }

    /// Ratchet the stop up (long) as price advances; never ratchets down.
    pub fn update(&mut self, price: f64) {
        let Some(pct) = self.trailing_pct else { return };
        if self.side != Side::Long {
            return;
        }
        let candidate = price * (1.0 - pct);
        if candidate > self.stop_price {
            self.stop_price = candidate;
        }
    }

    /// Long convention: triggers when price falls to or below the stop.
    pub fn triggered(&self, price: f64) -> bool {
        price <= self.stop_price
    }
}

#[derive(Debug, Clone, Default)]
pub struct StopBook {
    stops: HashMap<String, PositionStop>,
}

impl StopBook {
    pub fn set(&mut self, symbol: impl Into<String>, stop: PositionStop) {
        self.stops.insert(symbol.into(), stop);
    }

    pub fn remove(&mut self, symbol: &str) {
        self.stops.remove(symbol);
    }

    pub fn check_stop(&mut self, symbol: &str, price: f64) -> bool {
        if let Some(stop) = self.stops.get_mut(symbol) {
            stop.update(price);
            stop.triggered(price)
        } else {
            false
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&PositionStop> {
        self.stops.get(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_stop_only_moves_up() {
        let mut stop = PositionStop::new(100.0, 95.0, Side::Long, Some(0.05));
        stop.update(110.0);
        assert!((stop.stop_price - 104.5).abs() < 1e-9);
        stop.update(102.0);
        assert!((stop.stop_price - 104.5).abs() < 1e-9);
    }

    #[test]
    fn triggers_when_price_falls_to_stop() {
        let stop = PositionStop::new(100.0, 95.0, Side::Long, None);
        assert!(stop.triggered(95.0));
        assert!(!stop.triggered(96.0));
    }
}
