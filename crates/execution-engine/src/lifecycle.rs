use chrono::{DateTime, Utc};
use core_types::{Fill, OrderStatus, TradeOrder};

/// A submitted order plus its accumulated fills. `avg_fill_price` is the
/// quantity-weighted mean of fill prices seen so far.
#[derive(Debug, Clone)]
pub struct ExecutionOrder {
    pub order: TradeOrder,
    pub status: OrderStatus,
    pub filled_quantity: f64,
    pub avg_fill_price: f64,
    pub fills: Vec<Fill>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ExecutionOrder {
    pub fn new(order: TradeOrder) -> Self {
        Self {
            order,
            status: OrderStatus::Pending,
            filled_quantity: 0.0,
            avg_fill_price: 0.0,
            fills: Vec::new(),
            submitted_at: None,
        }
    }

    pub fn remaining_quantity(&self) -> f64 {
        (self.order.quantity - self.filled_quantity).max(0.0)
    }

    pub fn submit(&mut self, now: DateTime<Utc>) {
        if self.status == OrderStatus::Pending {
            self.status = OrderStatus::Submitted;
            self.submitted_at = Some(now);
        }
    }

    pub fn reject(&mut self) {
        self.status = OrderStatus::Rejected;
    }

    pub fn cancel(&mut self) {
        if !matches!(self.status, OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected) {
            self.status = OrderStatus::Cancelled;
        }
    }

    /// Apply a fill, updating `avg_fill_price` as the running
    /// quantity-weighted mean, and transition `status` to `Partial` or
    /// `Filled` once `filled_quantity` reaches `order.quantity`.
    pub fn apply_fill(&mut self, fill: Fill) {
        let prior_notional = self.avg_fill_price * self.filled_quantity;
        let new_quantity = self.filled_quantity + fill.filled_quantity;
        if new_quantity > 0.0 {
            self.avg_fill_price = (prior_notional + fill.fill_price * fill.filled_quantity) / new_quantity;
        }
        self.filled_quantity = new_quantity;
        self.fills.push(fill);

        self.status = if self.filled_quantity + 1e-9 >= self.order.quantity {
            OrderStatus::Filled
        } else {
            OrderStatus::Partial
        };
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected)
    }
}
