use chrono::{DateTime, Utc};
use core_types::{OrderType, Regime, Side, TimeInForce, TradeOrder};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct OrderGenerationConfig {
    pub min_order_value: f64,
    pub max_order_value: f64,
}

impl Default for OrderGenerationConfig {
    fn default() -> Self {
        Self {
            min_order_value: 100.0,
            max_order_value: 1_000_000.0,
        }
    }
}

/// `target.num_units - current_position` sized into an order, clamped to
/// `max_order_value` and dropped below `min_order_value`. Order type is
/// picked by regime: large size in NORMAL/LOW_VOLATILITY slices via
/// TWAP/VWAP, HIGH_VOLATILITY prefers a limit order, else market.
#[allow(clippy::too_many_arguments)]
pub fn create_order(
    config: &OrderGenerationConfig,
    symbol: &str,
    target_units: f64,
    current_position: f64,
    current_price: f64,
    regime: Regime,
    default_algorithm: OrderType,
    client_order_id: impl Into<String>,
    now: DateTime<Utc>,
) -> Option<TradeOrder> {
    let trade_qty = target_units - current_position;
    if trade_qty.abs() * current_price < config.min_order_value {
        debug!(symbol, trade_qty, "order value below min_order_value, skipping");
        return None;
    }

    let max_qty = config.max_order_value / current_price.max(f64::EPSILON);
    let clamped_qty = if trade_qty.abs() > max_qty { max_qty * trade_qty.signum() } else { trade_qty };

    let side = Side::from_quantity(clamped_qty);
    let order_value = clamped_qty.abs() * current_price;

    let order_type = match regime {
        Regime::Normal | Regime::LowVolatility if order_value > config.min_order_value * 10.0 => default_algorithm,
        Regime::HighVolatility => OrderType::Limit,
        _ => OrderType::Market,
    };

    let limit_price = matches!(order_type, OrderType::Limit).then_some(current_price);

    Some(TradeOrder::new(
        client_order_id,
        symbol,
        side,
        order_type,
        clamped_qty.abs(),
        limit_price,
        None,
        TimeInForce::Day,
        now,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.timestamp_opt(0, 0).unwrap()
    }

    #[test]
    fn returns_none_below_min_order_value() {
        let config = OrderGenerationConfig { min_order_value: 1000.0, ..Default::default() };
        let order = create_order(&config, "X", 1.0, 0.0, 10.0, Regime::Normal, OrderType::Twap, "c1", ts());
        assert!(order.is_none());
    }

    #[test]
    fn clamps_to_max_order_value_preserving_sign() {
        let config = OrderGenerationConfig { min_order_value: 1.0, max_order_value: 1000.0 };
        let order = create_order(&config, "X", -100.0, 0.0, 10.0, Regime::Normal, OrderType::Twap, "c1", ts())
            .unwrap();
        assert_eq!(order.side, Side::Short);
        assert!((order.quantity - 100.0).abs() < 1e-9);
    }

    #[test]
    fn high_volatility_regime_prefers_limit() {
        let config = OrderGenerationConfig { min_order_value: 1.0, ..Default::default() };
        let order =
            create_order(&config, "X", 10.0, 0.0, 100.0, Regime::HighVolatility, OrderType::Twap, "c1", ts())
                .unwrap();
        assert_eq!(order.order_type, OrderType::Limit);
        assert!(order.limit_price.is_some());
    }
}
