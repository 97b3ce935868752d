use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    TrendingUp,
    TrendingDown,
    MeanReverting,
    HighVolatility,
    LowVolatility,
    Crisis,
    Normal,
}

impl Regime {
    pub fn label(&self) -> &'static str {
        match self {
            Regime::TrendingUp => "TRENDING_UP",
            Regime::TrendingDown => "TRENDING_DOWN",
            Regime::MeanReverting => "MEAN_REVERTING",
            Regime::HighVolatility => "HIGH_VOLATILITY",
            Regime::LowVolatility => "LOW_VOLATILITY",
            Regime::Crisis => "CRISIS",
            Regime::Normal => "NORMAL",
        }
    }

    pub fn is_trending(&self) -> bool {
        matches!(self, Regime::TrendingUp | Regime::TrendingDown)
    }
}
