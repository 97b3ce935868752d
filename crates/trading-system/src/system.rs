use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use core_types::{AlphaSignal, Bar, DecisionLog, DecisionLogEntry, Fill, OrderType, Position, Side, TradeOrder};
use execution_engine::{
    order_generation::create_order, schedule_twap, schedule_vwap, ExecutionOrder, SlippageModel, TwapConfig,
    VolumeProfile, VwapConfig,
};
use feature_engine::FeatureEngine;
use alpha_models::AlphaModel;
use online_learner::{ModelRecord, ModelSelector};
use performance_tracker::{PerformanceSnapshot, PerformanceTracker};
use portfolio::Portfolio;
use position_sizer::vol_targeted_size;
use rand::rngs::ThreadRng;
use risk_manager::RiskManager;
use serde::Serialize;
use tracing::{debug, info};

const MIN_TRADES_FOR_MODEL_SELECTION: usize = 20;

use crate::regime::classify_regime;
use crate::config::TradingSystemConfig;

/// How responsible a model was for the most recent combined decision on a
/// symbol, used to route fill feedback to the right alpha model.
const ATTRIBUTION_WINDOW_MINUTES: i64 = 60;

/// TWAP/VWAP child-order slicing parameters used for orders routed through
/// those algorithms; the order's own quantity and creation time anchor the
/// schedule.
const EXECUTION_SLICE_DURATION_MINUTES: f64 = 30.0;
const EXECUTION_SLICE_COUNT: u32 = 10;
/// Fallback spread when a bar carries no top-of-book quote.
const DEFAULT_SPREAD_BPS: f64 = 5.0;

#[derive(Debug, Clone, Serialize)]
pub struct IterationOutcome {
    pub regime: core_types::Regime,
    pub combined_signal: AlphaSignal,
    pub order: Option<TradeOrder>,
    pub violations: Vec<String>,
}

/// Execution-engine counters surfaced alongside portfolio/risk/perf state.
#[derive(Debug, Clone, Serialize)]
pub struct ExecStats {
    pub orders_submitted: usize,
    pub orders_filled: usize,
    pub orders_open: usize,
    pub child_slices_scheduled: usize,
    pub calibrated_eta: f64,
}

/// `{portfolio_stats, risk_summary, perf_metrics, model_leaderboard,
/// exec_stats, decisions_logged}`, flattened into one outbound view.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub nav: f64,
    pub cash: f64,
    pub current_drawdown: f64,
    pub kill_switch_active: bool,
    pub perf_metrics: PerformanceSnapshot,
    pub model_leaderboard: BTreeMap<String, f64>,
    pub exec_stats: ExecStats,
    pub decisions_logged: usize,
}

/// Orchestrates one trading-decision iteration at a time. Owns all
/// component state; feedback from fills is applied serially, never
/// concurrently, matching the single-threaded cooperative model.
pub struct TradingSystem {
    config: TradingSystemConfig,
    feature_engine: FeatureEngine,
    ensemble: alpha_ensemble::AlphaEnsemble,
    risk_manager: RiskManager,
    portfolio: Portfolio,
    decision_log: DecisionLog,
    performance_tracker: PerformanceTracker,
    model_selector: ModelSelector,
    last_trade_time: HashMap<String, DateTime<Utc>>,
    client_order_seq: u64,
    execution_orders: HashMap<String, ExecutionOrder>,
    slippage_model: SlippageModel,
    submission_mid_prices: HashMap<String, f64>,
    pending_slippage_predictions: HashMap<String, f64>,
    volume_profile: VolumeProfile,
    orders_submitted_total: usize,
    orders_filled_total: usize,
    child_slices_scheduled_total: usize,
}

impl TradingSystem {
    pub fn new(config: TradingSystemConfig, models: Vec<alpha_models::AlphaModelKind>) -> Self {
        let portfolio = Portfolio::new(config.initial_capital);
        let risk_manager = RiskManager::new(config.risk_limits, config.initial_capital);
        let performance_tracker = PerformanceTracker::new(config.initial_capital);

        let mut model_selector = ModelSelector::new(MIN_TRADES_FOR_MODEL_SELECTION);
        for kind in &models {
            model_selector.register(ModelRecord::new(kind.name(), "v1"));
        }

        Self {
            decision_log: DecisionLog::new(config.decision_log_capacity),
            feature_engine: FeatureEngine::new(feature_engine::FeatureEngineConfig::default()),
            ensemble: alpha_ensemble::AlphaEnsemble::new(models),
            risk_manager,
            portfolio,
            performance_tracker,
            model_selector,
            last_trade_time: HashMap::new(),
            client_order_seq: 0,
            execution_orders: HashMap::new(),
            slippage_model: SlippageModel::default(),
            submission_mid_prices: HashMap::new(),
            pending_slippage_predictions: HashMap::new(),
            volume_profile: VolumeProfile::u_shaped(EXECUTION_SLICE_COUNT as usize),
            orders_submitted_total: 0,
            orders_filled_total: 0,
            child_slices_scheduled_total: 0,
            config,
        }
    }

    fn next_client_order_id(&mut self) -> String {
        self.client_order_seq += 1;
        format!("order-{}", self.client_order_seq)
    }

    /// One iteration for `symbol` at `now`, per the eight-step sequence:
    /// respect the min trade interval, require enough bars, compute
    /// features/regime, generate signals, size, update NAV, risk-gate and
    /// generate an order, then append a decision-log entry.
    #[allow(clippy::too_many_arguments)]
    pub fn run_iteration(
        &mut self,
        symbol: &str,
        bar: Bar,
        sector: &str,
        daily_volume: f64,
        force: bool,
        now: DateTime<Utc>,
        rng: &mut ThreadRng,
    ) -> Option<IterationOutcome> {
        if !force {
            if let Some(&last) = self.last_trade_time.get(symbol) {
                if (now - last).num_seconds() < self.config.min_trade_interval_seconds {
                    return None;
                }
            }
        }

        self.feature_engine.update(bar.clone());
        if self.feature_engine.bar_count(symbol) < self.config.min_bars_required {
            return None;
        }

        let features = self.feature_engine.get_features(symbol);
        let regime = classify_regime(&features);

        let history = self.feature_engine.bars(symbol);
        let (combined_signal, raw_signals) =
            self.ensemble.generate_combined_signal(&history, Some(&features), regime, false, rng);

        let position_before = self.portfolio.position(symbol).cloned();
        let current_position_units = position_before.as_ref().map(signed_quantity).unwrap_or(0.0);

        let asset_vol = features.realized_vol_20.max(1e-4);
        let size = vol_targeted_size(&self.config.sizer, &combined_signal, self.portfolio.nav(), bar.close, asset_vol);

        self.portfolio.update_price(symbol, bar.close);
        self.risk_manager.update_nav(self.portfolio.nav());

        let mut violations = Vec::new();
        let mut order = None;

        if combined_signal.is_active() {
            let check = self.risk_manager.check_limits(&size, symbol, sector, daily_volume, features.realized_vol_20);
            if check.approved {
                let scaled = self.risk_manager.scale_for_risk(&size, combined_signal.confidence());
                let target_units = scaled.num_units;
                let client_id = self.next_client_order_id();
                order = create_order(
                    &self.config.order_generation,
                    symbol,
                    target_units,
                    current_position_units,
                    bar.close,
                    regime,
                    self.config.default_execution_algorithm,
                    client_id,
                    now,
                );
                if let Some(order) = &order {
                    info!(symbol, side = ?order.side, quantity = order.quantity, ?regime, "order created");
                    self.last_trade_time.insert(symbol.to_string(), now);
                    self.submit_for_execution(order, &bar, daily_volume, features.realized_vol_20, now, rng);
                }
            } else {
                debug!(symbol, violations = ?check.violations, "risk check rejected proposed position");
                violations = check.violations;
            }
        }

        let position_after = self.portfolio.position(symbol).cloned();

        let mut flat_features = BTreeMap::new();
        flat_features.insert("rsi_14".to_string(), features.rsi_14);
        flat_features.insert("hurst_exponent".to_string(), features.hurst_exponent);
        flat_features.insert("realized_vol_20".to_string(), features.realized_vol_20);

        let mut signals = raw_signals;
        signals.insert("ensemble".to_string(), combined_signal.clone());

        self.decision_log.push(DecisionLogEntry {
            symbol: symbol.to_string(),
            timestamp: now,
            features: flat_features,
            signals,
            regime,
            position_before,
            position_after,
            order: order.clone(),
            violations: violations.clone(),
            model_version: "v1".to_string(),
        });

        Some(IterationOutcome { regime, combined_signal, order, violations })
    }

    /// Submit a freshly created order into the execution engine: capture its
    /// `ExecutionOrder` lifecycle state, estimate pre-trade slippage against
    /// the bar's best quote (or `DEFAULT_SPREAD_BPS` absent one), and for
    /// `Twap`/`Vwap` orders compute the child-order schedule. The submission
    /// mid-price is kept here, not on `ExecutionOrder`, so the order stays a
    /// pure fill-accumulator; it is the reference price this system itself
    /// uses later to score the realized fill.
    #[allow(clippy::too_many_arguments)]
    fn submit_for_execution(
        &mut self,
        order: &TradeOrder,
        bar: &Bar,
        daily_volume: f64,
        volatility: f64,
        now: DateTime<Utc>,
        rng: &mut ThreadRng,
    ) {
        let mut exec_order = ExecutionOrder::new(order.clone());
        exec_order.submit(now);

        let order_value = order.quantity * bar.close;
        let spread_bps = match (bar.bid, bar.ask) {
            (Some(bid), Some(ask)) if bid > 0.0 && ask > 0.0 => {
                (ask - bid) / bar.mid_price().max(f64::EPSILON) * 10_000.0
            }
            _ => DEFAULT_SPREAD_BPS,
        };
        let estimate = self.slippage_model.estimate(order_value, daily_volume, volatility, spread_bps);

        self.submission_mid_prices.insert(order.client_order_id.clone(), bar.mid_price());
        self.pending_slippage_predictions.insert(order.client_order_id.clone(), estimate.total_cost_bps);
        self.orders_submitted_total += 1;

        match order.order_type {
            OrderType::Twap => {
                let config = TwapConfig {
                    total_quantity: order.quantity,
                    duration_minutes: EXECUTION_SLICE_DURATION_MINUTES,
                    num_slices: EXECUTION_SLICE_COUNT,
                    randomize: true,
                };
                let slices = schedule_twap(&config, now, rng);
                self.child_slices_scheduled_total += slices.len();
                debug!(symbol = %order.symbol, slices = slices.len(), "scheduled TWAP execution");
            }
            OrderType::Vwap => {
                let config = VwapConfig {
                    total_quantity: order.quantity,
                    duration_minutes: EXECUTION_SLICE_DURATION_MINUTES,
                    num_slices: EXECUTION_SLICE_COUNT,
                };
                let slices = schedule_vwap(&config, &self.volume_profile, now);
                self.child_slices_scheduled_total += slices.len();
                debug!(symbol = %order.symbol, slices = slices.len(), "scheduled VWAP execution");
            }
            _ => {}
        }

        self.execution_orders.insert(order.client_order_id.clone(), exec_order);
    }

    /// Apply a fill: advance the matching `ExecutionOrder`'s lifecycle,
    /// feed the slippage model once the order reaches a terminal state,
    /// update the portfolio, flow realized P&L into the risk manager, and
    /// attribute the outcome to the model most responsible for the decision
    /// within the last 60 minutes.
    pub fn on_fill(&mut self, symbol: &str, fill: Fill, side: Side, now: DateTime<Utc>) {
        let mut terminal_avg_fill_price = None;
        if let Some(exec_order) = self.execution_orders.get_mut(&fill.order_id) {
            exec_order.apply_fill(fill.clone());
            if exec_order.is_terminal() {
                terminal_avg_fill_price = Some(exec_order.avg_fill_price);
            }
        }

        if let Some(avg_fill_price) = terminal_avg_fill_price {
            self.orders_filled_total += 1;
            if let (Some(predicted_bps), Some(mid)) = (
                self.pending_slippage_predictions.remove(&fill.order_id),
                self.submission_mid_prices.remove(&fill.order_id),
            ) {
                if mid > 0.0 {
                    let actual_bps = (avg_fill_price - mid).abs() / mid * 10_000.0;
                    self.slippage_model.record_execution(predicted_bps, actual_bps);
                }
            }
            self.execution_orders.remove(&fill.order_id);
        }

        let realized = self.portfolio.open_position(symbol, fill.filled_quantity, fill.fill_price, side, now);
        self.risk_manager.update_pnl(realized);
        self.risk_manager.update_nav(self.portfolio.nav());
        self.performance_tracker.record_nav(self.portfolio.nav(), now);

        if realized.abs() > f64::EPSILON {
            self.performance_tracker.record_trade(realized);
        }

        if let Some(model_name) = self.most_responsible_model(symbol, now) {
            self.performance_tracker.record_model_pnl(&model_name, realized);
            self.ensemble.record_model_performance(&model_name, realized);
            self.model_selector.record_outcome(&model_name, "v1", realized, realized > 0.0);
        }
    }

    fn most_responsible_model(&self, symbol: &str, now: DateTime<Utc>) -> Option<String> {
        self.decision_log
            .recent_for_symbol(symbol, now, ATTRIBUTION_WINDOW_MINUTES)
            .last()?
            .signals
            .iter()
            .filter(|(name, _)| name.as_str() != "ensemble")
            .max_by(|(_, a), (_, b)| a.value().abs().partial_cmp(&b.value().abs()).unwrap())
            .map(|(name, _)| name.clone())
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn risk_manager(&self) -> &RiskManager {
        &self.risk_manager
    }

    pub fn decision_log(&self) -> &DecisionLog {
        &self.decision_log
    }

    pub fn decisions_logged(&self) -> usize {
        self.decision_log.len()
    }

    pub fn status_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            nav: self.portfolio.nav(),
            cash: self.portfolio.cash(),
            current_drawdown: self.risk_manager.current_drawdown(),
            kill_switch_active: self.risk_manager.kill_switch_active(),
            perf_metrics: self.performance_tracker.snapshot(0.0),
            model_leaderboard: self.performance_tracker.model_leaderboard(),
            exec_stats: ExecStats {
                orders_submitted: self.orders_submitted_total,
                orders_filled: self.orders_filled_total,
                orders_open: self.execution_orders.len(),
                child_slices_scheduled: self.child_slices_scheduled_total,
                calibrated_eta: self.slippage_model.eta(),
            },
            decisions_logged: self.decision_log.len(),
        }
    }

    /// Flat, append-only-storage-friendly view of every decision logged so far.
    pub fn export_decision_log(&self) -> Vec<BTreeMap<String, serde_json::Value>> {
        self.decision_log.iter().map(|e| e.to_flat_map()).collect()
    }
}

fn signed_quantity(position: &Position) -> f64 {
    position.quantity * position.side.sign()
}
