use std::collections::HashMap;

use chrono::{DateTime, Utc};
use core_types::{Position, Side};
use tracing::debug;

/// A ledger of positions plus cash. Invariant: `nav = cash + sum(positions
/// market_value)`, checked by `nav()` construction rather than stored
/// redundantly.
#[derive(Debug, Clone)]
pub struct Portfolio {
    cash: f64,
    positions: HashMap<String, Position>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            positions: HashMap::new(),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn nav(&self) -> f64 {
        self.cash + self.positions.values().map(|p| p.market_value()).sum::<f64>()
    }

    pub fn update_price(&mut self, symbol: &str, price: f64) {
        if let Some(position) = self.positions.get_mut(symbol) {
            position.current_price = price;
        }
    }

    /// Open (or add to / reduce / reverse) a position. Returns the realized
    /// P&L booked on this call, 0 if none.
    ///
    /// Every cash movement reduces to one identity: closing `q` units of a
    /// position at price `p` moves `q * p * side.sign()` into cash and
    /// realizes `q * (p - avg_entry) * side.sign()`; opening `q` units moves
    /// the negative of that proceeds term. See the open-questions note in
    /// the design ledger for why this avoids double-booking realized P&L.
    pub fn open_position(&mut self, symbol: &str, quantity: f64, price: f64, side: Side, now: DateTime<Utc>) -> f64 {
        let quantity = quantity.abs();
        match self.positions.get(symbol).cloned() {
            None => {
                self.open_leg(symbol, quantity, price, side, now);
                0.0
            }
            Some(existing) if existing.side == side => {
                let new_quantity = existing.quantity + quantity;
                let new_avg = (existing.quantity * existing.avg_entry_price + quantity * price) / new_quantity;
                self.cash -= quantity * price * side.sign();
                self.positions.insert(
                    symbol.to_string(),
                    Position {
                        quantity: new_quantity,
                        avg_entry_price: new_avg,
                        current_price: price,
                        ..existing
                    },
                );
                0.0
            }
            Some(existing) => {
                use std::cmp::Ordering;
                match quantity.partial_cmp(&existing.quantity).unwrap_or(Ordering::Equal) {
                    Ordering::Less => {
                        let realized = self.close_leg(symbol, quantity, price, existing.side);
                        let remaining = existing.quantity - quantity;
                        self.positions.insert(
                            symbol.to_string(),
                            Position {
                                quantity: remaining,
                                current_price: price,
                                realized_pnl: existing.realized_pnl + realized,
                                ..existing
                            },
                        );
                        realized
                    }
                    Ordering::Equal => {
                        let realized = self.close_leg(symbol, quantity, price, existing.side);
                        self.positions.remove(symbol);
                        realized
                    }
                    Ordering::Greater => {
                        let realized = self.close_leg(symbol, existing.quantity, price, existing.side);
                        self.positions.remove(symbol);
                        let remaining = quantity - existing.quantity;
                        self.open_leg(symbol, remaining, price, side, now);
                        realized
                    }
                }
            }
        }
    }

    fn open_leg(&mut self, symbol: &str, quantity: f64, price: f64, side: Side, now: DateTime<Utc>) {
        self.cash -= quantity * price * side.sign();
        self.positions.insert(
            symbol.to_string(),
            Position {
                symbol: symbol.to_string(),
                quantity,
                avg_entry_price: price,
                current_price: price,
                side,
                opened_at: now,
                realized_pnl: 0.0,
            },
        );
    }

    fn close_leg(&mut self, _symbol: &str, quantity: f64, price: f64, side: Side) -> f64 {
        let entry = self.positions.get(_symbol).map(|p| p.avg_entry_price).unwrap_or(price);
        let realized = side.sign() * quantity * (price - entry);
        self.cash += quantity * price * side.sign();
        realized
    }

    /// Realize on the full quantity and remove the entry.
    pub fn close_position(&mut self, symbol: &str, price: f64) -> Option<f64> {
        let existing = self.positions.get(symbol).cloned()?;
        let realized = self.close_leg(symbol, existing.quantity, price, existing.side);
        self.positions.remove(symbol);
        debug!(symbol, realized, "position closed");
        Some(realized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.timestamp_opt(0, 0).unwrap()
    }

    #[test]
    fn scenario_s4_round_trip() {
        let mut portfolio = Portfolio::new(100_000.0);
        portfolio.open_position("BTC", 1.0, 50_000.0, Side::Long, ts());
        assert_eq!(portfolio.cash(), 50_000.0);

        portfolio.update_price("BTC", 55_000.0);
        assert_eq!(portfolio.position("BTC").unwrap().unrealized_pnl(), 5_000.0);
        assert_eq!(portfolio.nav(), 105_000.0);

        let realized = portfolio.close_position("BTC", 55_000.0).unwrap();
        assert!((realized - 5_000.0).abs() < 1e-9);
        assert!((portfolio.cash() - 105_000.0).abs() < 1e-9);
        assert!(portfolio.position("BTC").is_none());
    }

    #[test]
    fn same_direction_add_averages_entry_price() {
        let mut portfolio = Portfolio::new(100_000.0);
        portfolio.open_position("AAPL", 10.0, 100.0, Side::Long, ts());
        portfolio.open_position("AAPL", 10.0, 110.0, Side::Long, ts());
        let position = portfolio.position("AAPL").unwrap();
        assert_eq!(position.quantity, 20.0);
        assert!((position.avg_entry_price - 105.0).abs() < 1e-9);
    }

    #[test]
    fn opposite_partial_close_reduces_quantity_and_realizes() {
        let mut portfolio = Portfolio::new(100_000.0);
        portfolio.open_position("AAPL", 10.0, 100.0, Side::Long, ts());
        let realized = portfolio.open_position("AAPL", 4.0, 120.0, Side::Short, ts());
        assert!((realized - 80.0).abs() < 1e-9);
        assert_eq!(portfolio.position("AAPL").unwrap().quantity, 6.0);
    }

    #[test]
    fn opposite_overshoot_reverses_position() {
        let mut portfolio = Portfolio::new(100_000.0);
        portfolio.open_position("AAPL", 10.0, 100.0, Side::Long, ts());
        portfolio.open_position("AAPL", 15.0, 90.0, Side::Short, ts());
        let position = portfolio.position("AAPL").unwrap();
        assert_eq!(position.side, Side::Short);
        assert_eq!(position.quantity, 5.0);
        assert_eq!(position.avg_entry_price, 90.0);
    }

    #[test]
    fn open_then_immediate_close_restores_cash() {
        let mut portfolio = Portfolio::new(100_000.0);
        portfolio.open_position("AAPL", 10.0, 100.0, Side::Long, ts());
        let realized = portfolio.close_position("AAPL", 100.0).unwrap();
        assert!(realized.abs() < 1e-9);
        assert!((portfolio.cash() - 100_000.0).abs() < 1e-9);
    }

    #[test]
    fn nav_matches_cash_plus_market_value_invariant() {
        let mut portfolio = Portfolio::new(100_000.0);
        portfolio.open_position("AAPL", 10.0, 100.0, Side::Long, ts());
        portfolio.update_price("AAPL", 120.0);
        let sum_mv: f64 = portfolio.positions().map(|p| p.market_value()).sum();
        assert!((portfolio.nav() - (portfolio.cash() + sum_mv)).abs() < 1e-9);
    }
}
