use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::position::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
    Twap,
    Vwap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    Day,
    Gtc,
    Ioc,
    Fok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Submitted,
    Partial,
    Filled,
    Cancelled,
    Rejected,
}

/// Immutable order record. IDs are assigned at construction and never mutate.
/// `quantity` is always the unsigned size; direction lives in `side`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeOrder {
    pub client_order_id: String,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: f64,
    pub limit_price: Option<f64>,
    pub stop_price: Option<f64>,
    pub time_in_force: TimeInForce,
    pub metadata: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl TradeOrder {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client_order_id: impl Into<String>,
        symbol: impl Into<String>,
        side: Side,
        order_type: OrderType,
        quantity: f64,
        limit_price: Option<f64>,
        stop_price: Option<f64>,
        time_in_force: TimeInForce,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            client_order_id: client_order_id.into(),
            symbol: symbol.into(),
            side,
            order_type,
            quantity: quantity.abs(),
            limit_price,
            stop_price,
            time_in_force,
            metadata: BTreeMap::new(),
            created_at,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
