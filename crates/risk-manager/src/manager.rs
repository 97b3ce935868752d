use std::collections::HashMap;

use core_types::{PositionSize, RiskCheckResult};
use tracing::warn;

use crate::kill_switch::KillSwitch;

#[derive(Debug, Clone, Copy)]
pub struct RiskLimits {
    pub max_daily_loss_pct: f64,
    pub max_drawdown_pct: f64,
    pub max_single_position_pct: f64,
    pub max_sector_exposure_pct: f64,
    pub max_leverage: f64,
    pub min_liquidity_ratio: f64,
    pub max_vol_position_pct: f64,
    pub high_vol_threshold: f64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_daily_loss_pct: 0.03,
            max_drawdown_pct: 0.15,
            max_single_position_pct: 0.20,
            max_sector_exposure_pct: 0.40,
            max_leverage: 2.0,
            min_liquidity_ratio: 0.10,
            max_vol_position_pct: 0.10,
            high_vol_threshold: 0.40,
        }
    }
}

/// Owns all risk state for the trading system: NAV/peak-NAV, daily P&L,
/// exposures, the latching kill switch, and the violation log. No component
/// outside this one may mutate it; feedback arrives via explicit mutators.
#[derive(Debug, Clone)]
pub struct RiskManager {
    limits: RiskLimits,
    kill_switch: KillSwitch,

    start_of_day_nav: f64,
    current_nav: f64,
    peak_nav: f64,
    daily_pnl: f64,

    total_exposure: f64,
    sector_exposure: HashMap<String, f64>,

    violations_log: Vec<String>,
}

impl RiskManager {
    pub fn new(limits: RiskLimits, initial_capital: f64) -> Self {
        Self {
            limits,
            kill_switch: KillSwitch::default(),
            start_of_day_nav: initial_capital,
            current_nav: initial_capital,
            peak_nav: initial_capital,
            daily_pnl: 0.0,
            total_exposure: 0.0,
            sector_exposure: HashMap::new(),
            violations_log: Vec::new(),
        }
    }

    pub fn kill_switch_active(&self) -> bool {
        self.kill_switch.is_active()
    }

    pub fn kill_switch_reason(&self) -> &str {
        self.kill_switch.reason()
    }

    pub fn activate_kill_switch(&mut self, reason: impl Into<String>) {
        self.kill_switch.activate(reason);
    }

    pub fn reset_kill_switch(&mut self) {
        self.kill_switch.reset();
    }

    pub fn current_drawdown(&self) -> f64 {
        if self.peak_nav <= 0.0 {
            0.0
        } else {
            ((self.peak_nav - self.current_nav) / self.peak_nav).clamp(0.0, 1.0)
        }
    }

    fn daily_loss_pct(&self) -> f64 {
        if self.start_of_day_nav <= 0.0 {
            0.0
        } else {
            (-self.daily_pnl / self.start_of_day_nav).max(0.0)
        }
    }

    /// Update daily realized P&L. May latch the kill switch.
    pub fn update_pnl(&mut self, pnl_delta: f64) {
        self.daily_pnl += pnl_delta;
        if self.daily_loss_pct() >= self.limits.max_daily_loss_pct {
            warn!(daily_loss_pct = self.daily_loss_pct(), "daily loss limit breached, latching kill switch");
            self.activate_kill_switch("daily_loss_limit_breached");
        }
    }

    /// Update current NAV, advancing the peak. May latch the kill switch.
    pub fn update_nav(&mut self, nav: f64) {
        self.current_nav = nav;
        if nav > self.peak_nav {
            self.peak_nav = nav;
        }
        if self.current_drawdown() >= self.limits.max_drawdown_pct {
            warn!(drawdown = self.current_drawdown(), "max drawdown breached, latching kill switch");
            self.activate_kill_switch("max_drawdown_breached");
        }
    }

    /// Clears daily P&L and resets the start-of-day NAV baseline. Never
    /// touches the kill switch.
    pub fn reset_daily_metrics(&mut self) {
        self.daily_pnl = 0.0;
        self.start_of_day_nav = self.current_nav;
    }

    pub fn record_exposure(&mut self, sector: &str, exposure_delta: f64) {
        self.total_exposure += exposure_delta;
        *self.sector_exposure.entry(sector.to_string()).or_insert(0.0) += exposure_delta;
    }

    #[allow(clippy::too_many_arguments)]
    pub fn check_limits(
        &mut self,
        position: &PositionSize,
        _symbol: &str,
        sector: &str,
        daily_volume: f64,
        current_vol: f64,
    ) -> RiskCheckResult {
        if self.kill_switch.is_active() {
            return RiskCheckResult::rejected(vec![format!("KILL_SWITCH:{}", self.kill_switch.reason())], 1.0);
        }

        let mut violations = Vec::new();

        // 1. daily loss limit
        if self.daily_loss_pct() >= self.limits.max_daily_loss_pct {
            violations.push("DAILY_LOSS_LIMIT".to_string());
        }

        // 2. drawdown limit
        if self.current_drawdown() >= self.limits.max_drawdown_pct {
            violations.push("DRAWDOWN_LIMIT".to_string());
        }

        // 3. single-position size limit
        if position.percent_of_nav.abs() > self.limits.max_single_position_pct {
            violations.push("POSITION_SIZE_LIMIT".to_string());
        }

        // 4. sector exposure (projected)
        let projected_sector =
            self.sector_exposure.get(sector).copied().unwrap_or(0.0) + position.dollar_amount.abs();
        if self.current_nav > 0.0 && projected_sector / self.current_nav > self.limits.max_sector_exposure_pct {
            violations.push("SECTOR_EXPOSURE_LIMIT".to_string());
        }

        // 5. aggregate leverage (projected)
        let projected_leverage = if self.current_nav > 0.0 {
            (self.total_exposure + position.dollar_amount.abs()) / self.current_nav
        } else {
            0.0
        };
        if projected_leverage > self.limits.max_leverage {
            violations.push("LEVERAGE_LIMIT".to_string());
        }

        // 6. liquidity
        if daily_volume > 0.0 && position.dollar_amount.abs() / daily_volume > self.limits.min_liquidity_ratio {
            violations.push("LIQUIDITY_LIMIT".to_string());
        }

        // 7. volatility-adjusted
        if current_vol > self.limits.high_vol_threshold
            && position.percent_of_nav.abs() > self.limits.max_vol_position_pct
        {
            violations.push("VOLATILITY_LIMIT".to_string());
        }

        let position_ratio = (position.percent_of_nav.abs() / self.limits.max_single_position_pct).clamp(0.0, 1.0);
        let daily_loss_ratio = (self.daily_loss_pct() / self.limits.max_daily_loss_pct).clamp(0.0, 1.0);
        let drawdown_ratio = (self.current_drawdown() / self.limits.max_drawdown_pct).clamp(0.0, 1.0);
        let leverage_ratio = (projected_leverage / self.limits.max_leverage).clamp(0.0, 1.0);
        let risk_score = (position_ratio + daily_loss_ratio + drawdown_ratio + leverage_ratio) / 4.0;

        if violations.is_empty() {
            RiskCheckResult::approved(risk_score, Some(*position))
        } else {
            self.violations_log.extend(violations.iter().cloned());
            RiskCheckResult::rejected(violations, risk_score)
        }
    }

    /// Scale down (never up) a position by remaining risk headroom.
    /// `scale = headroom^(0.5*(1-urgency))`.
    pub fn scale_for_risk(&self, position: &PositionSize, urgency: f64) -> PositionSize {
        let dd_headroom = if self.limits.max_drawdown_pct > 0.0 {
            (1.0 - self.current_drawdown() / self.limits.max_drawdown_pct).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let daily_headroom = if self.limits.max_daily_loss_pct > 0.0 {
            (1.0 - self.daily_loss_pct() / self.limits.max_daily_loss_pct).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let headroom = dd_headroom.min(daily_headroom);
        let urgency = urgency.clamp(0.0, 1.0);
        let scale = headroom.powf(0.5 * (1.0 - urgency)).min(1.0);
        position.scaled(scale)
    }

    pub fn violations_log(&self) -> &[String] {
        &self.violations_log
    }

    pub fn current_nav(&self) -> f64 {
        self.current_nav
    }

    pub fn peak_nav(&self) -> f64 {
        self.peak_nav
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::PositionSize;

    fn size(pct: f64) -> PositionSize {
        PositionSize {
            percent_of_nav: pct,
            dollar_amount: pct * 100_000.0,
            num_units: 0.0,
            vol_scalar: 1.0,
            raw_signal: pct,
            capped: false,
        }
    }

    #[test]
    fn scenario_s1_drawdown_latches_kill_switch() {
        let mut rm = RiskManager::new(RiskLimits { max_drawdown_pct: 0.10, ..RiskLimits::default() }, 100_000.0);
        rm.update_nav(100_000.0);
        rm.update_nav(105_000.0);
        rm.update_nav(94_500.0);

        assert!((rm.current_drawdown() - 0.10).abs() < 1e-9);
        assert!(rm.kill_switch_active());
        assert!(rm.kill_switch_reason().contains("drawdown"));

        let result = rm.check_limits(&size(0.05), "BTC", "crypto", 1_000_000.0, 0.1);
        assert!(!result.approved);
        assert!(result.violations[0].starts_with("KILL_SWITCH"));
    }

    #[test]
    fn rejects_kill_switch_until_authorized_reset() {
        let mut rm = RiskManager::new(RiskLimits::default(), 100_000.0);
        rm.activate_kill_switch("manual");
        for _ in 0..3 {
            let result = rm.check_limits(&size(0.01), "X", "tech", 1_000_000.0, 0.1);
            assert!(!result.approved);
        }
        rm.reset_kill_switch();
        let result = rm.check_limits(&size(0.01), "X", "tech", 1_000_000.0, 0.1);
        assert!(result.approved);
    }

    #[test]
    fn approved_position_never_exceeds_max_position_pct() {
        let mut rm = RiskManager::new(RiskLimits::default(), 100_000.0);
        let result = rm.check_limits(&size(0.50), "X", "tech", 1_000_000.0, 0.1);
        assert!(!result.approved);
        assert!(result.violations.contains(&"POSITION_SIZE_LIMIT".to_string()));
    }

    #[test]
    fn reset_daily_metrics_never_clears_kill_switch() {
        let mut rm = RiskManager::new(RiskLimits::default(), 100_000.0);
        rm.activate_kill_switch("x");
        rm.reset_daily_metrics();
        rm.reset_daily_metrics();
        assert!(rm.kill_switch_active());
    }

    #[test]
    fn scale_for_risk_never_scales_up() {
        let rm = RiskManager::new(RiskLimits::default(), 100_000.0);
        let pos = size(0.05);
        let scaled = rm.scale_for_risk(&pos, 1.0);
        assert!(scaled.percent_of_nav <= pos.percent_of_nav + 1e-12);
    }
}
