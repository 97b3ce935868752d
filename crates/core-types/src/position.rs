use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn sign(&self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }

    pub fn from_quantity(qty: f64) -> Side {
        if qty >= 0.0 {
            Side::Long
        } else {
            Side::Short
        }
    }
}

/// Sizing recommendation produced by the position sizer. May be scaled once
/// more by the risk manager (`scale`); the `capped` bit is sticky once set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PositionSize {
    pub percent_of_nav: f64,
    pub dollar_amount: f64,
    pub num_units: f64,
    pub vol_scalar: f64,
    pub raw_signal: f64,
    pub capped: bool,
}

impl PositionSize {
    pub fn zero() -> Self {
        Self {
            percent_of_nav: 0.0,
            dollar_amount: 0.0,
            num_units: 0.0,
            vol_scalar: 0.0,
            raw_signal: 0.0,
            capped: false,
        }
    }

    /// Scale this position by a non-negative factor, preserving the sticky
    /// `capped` bit if it was already set, or setting it if the factor < 1.
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        Self {
            percent_of_nav: self.percent_of_nav * factor,
            dollar_amount: self.dollar_amount * factor,
            num_units: self.num_units * factor,
            vol_scalar: self.vol_scalar,
            raw_signal: self.raw_signal,
            capped: self.capped || factor < 1.0,
        }
    }
}

/// Result of a risk-gate evaluation for one proposed position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskCheckResult {
    pub approved: bool,
    pub violations: Vec<String>,
    pub adjusted_position: Option<PositionSize>,
    pub risk_score: f64,
}

impl RiskCheckResult {
    pub fn approved(risk_score: f64, adjusted_position: Option<PositionSize>) -> Self {
        Self {
            approved: true,
            violations: Vec::new(),
            adjusted_position,
            risk_score: risk_score.clamp(0.0, 1.0),
        }
    }

    pub fn rejected(violations: Vec<String>, risk_score: f64) -> Self {
        Self {
            approved: false,
            violations,
            adjusted_position: None,
            risk_score: risk_score.clamp(0.0, 1.0),
        }
    }
}

/// A ledger entry for one symbol. Exists only while `quantity > 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: f64,
    pub avg_entry_price: f64,
    pub current_price: f64,
    pub side: Side,
    pub opened_at: DateTime<Utc>,
    pub realized_pnl: f64,
}

impl Position {
    pub fn market_value(&self) -> f64 {
        (self.quantity * self.current_price).max(0.0)
    }

    pub fn unrealized_pnl(&self) -> f64 {
        self.side.sign() * self.quantity * (self.current_price - self.avg_entry_price)
    }
}
