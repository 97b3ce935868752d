use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time OHLCV bar, with optional top-of-book quote data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default)]
    pub bid: Option<f64>,
    #[serde(default)]
    pub ask: Option<f64>,
    #[serde(default)]
    pub bid_size: Option<f64>,
    #[serde(default)]
    pub ask_size: Option<f64>,
}

impl Bar {
    pub fn new(
        symbol: impl Into<String>,
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            bid: None,
            ask: None,
            bid_size: None,
            ask_size: None,
        }
    }

    pub fn with_quote(mut self, bid: f64, ask: f64, bid_size: f64, ask_size: f64) -> Self {
        self.bid = Some(bid);
        self.ask = Some(ask);
        self.bid_size = Some(bid_size);
        self.ask_size = Some(ask_size);
        self
    }

    /// (bid+ask)/2 when both are present and positive, else the close price.
    pub fn mid_price(&self) -> f64 {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) if bid > 0.0 && ask > 0.0 => (bid + ask) / 2.0,
            _ => self.close,
        }
    }

    /// (bid - ask) / (bid + ask), when both sizes are available.
    pub fn order_book_imbalance(&self) -> Option<f64> {
        let (bid, ask) = (self.bid_size?, self.ask_size?);
        let denom = bid + ask;
        if denom <= 0.0 {
            return None;
        }
        Some((bid - ask) / denom)
    }

    pub fn is_valid(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
            && self.volume >= 0.0
            && self.high >= self.low
    }
}
