use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fill against a previously submitted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: String,
    pub filled_quantity: f64,
    pub fill_price: f64,
    pub timestamp: DateTime<Utc>,
}
