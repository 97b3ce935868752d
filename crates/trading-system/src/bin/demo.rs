//! Minimal synchronous driver: feeds synthetic bars through one
//! `TradingSystem` instance and prints the resulting status snapshot.
//! The core itself stays synchronous and single-threaded per the
//! cooperative scheduling model; this binary is the "driver", not part
//! of the core, and never touches a real broker or market-data feed.

use alpha_models::{AlphaModelKind, MeanReversionParams, MomentumParams, VolatilityBreakoutParams};
use anyhow::Result;
use chrono::{Duration, Utc};
use core_types::Bar;
use trading_system::{TradingSystem, TradingSystemConfig};

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT").map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(false);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn synthetic_bar(symbol: &str, i: i64, close: f64) -> Bar {
    let now = Utc::now() + Duration::minutes(i);
    Bar::new(symbol, now, close - 0.1, close + 0.15, close - 0.15, close, 50_000.0)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!("starting trading-system demo driver");

    let models = vec![
        AlphaModelKind::momentum(MomentumParams::default()),
        AlphaModelKind::mean_reversion(MeanReversionParams::default()),
        AlphaModelKind::volatility_breakout(VolatilityBreakoutParams::default()),
    ];
    let mut system = TradingSystem::new(TradingSystemConfig::default(), models);
    let mut rng = rand::thread_rng();

    let symbol = "DEMO";
    for i in 0..220 {
        let close = 100.0 * (0.0015 * i as f64).exp();
        let bar = synthetic_bar(symbol, i, close);
        let now = bar.timestamp;
        if let Some(outcome) = system.run_iteration(symbol, bar, "tech", 5_000_000.0, false, now, &mut rng) {
            if let Some(order) = outcome.order {
                tracing::info!(side = ?order.side, quantity = order.quantity, "demo order generated");
            }
        }
    }

    let snapshot = system.status_snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
