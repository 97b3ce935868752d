use core_types::OrderType;
use execution_engine::OrderGenerationConfig;
use position_sizer::SizerConfig;
use risk_manager::RiskLimits;

#[derive(Debug, Clone, Copy)]
pub struct TradingSystemConfig {
    pub initial_capital: f64,
    pub min_trade_interval_seconds: i64,
    pub min_bars_required: usize,
    pub decision_log_capacity: usize,
    pub ensemble_min_confidence: f64,
    pub default_execution_algorithm: OrderType,
    pub sizer: SizerConfig,
    pub risk_limits: RiskLimits,
    pub order_generation: OrderGenerationConfig,
}

impl Default for TradingSystemConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            min_trade_interval_seconds: 60,
            min_bars_required: 50,
            decision_log_capacity: 10_000,
            ensemble_min_confidence: 0.1,
            default_execution_algorithm: OrderType::Twap,
            sizer: SizerConfig::default(),
            risk_limits: RiskLimits::default(),
            order_generation: OrderGenerationConfig::default(),
        }
    }
}
