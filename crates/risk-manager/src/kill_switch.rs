/// Latching kill switch. Starts inactive; once `active`, only an authorized
/// `reset` clears it. `reset_daily_metrics` never touches this state.
#[derive(Debug, Clone, Default)]
pub struct KillSwitch {
    active: bool,
    reason: String,
}

impl KillSwitch {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// No-op if already active — the first trigger reason sticks.
    pub fn activate(&mut self, reason: impl Into<String>) {
        if !self.active {
            self.active = true;
            self.reason = reason.into();
        }
    }

    pub fn reset(&mut self) {
        self.active = false;
        self.reason.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latches_and_keeps_first_reason() {
        let mut ks = KillSwitch::default();
        ks.activate("drawdown breach");
        ks.activate("daily loss breach");
        assert!(ks.is_active());
        assert_eq!(ks.reason(), "drawdown breach");
    }

    #[test]
    fn reset_clears_latch() {
        let mut ks = KillSwitch::default();
        ks.activate("x");
        ks.reset();
        assert!(!ks.is_active());
    }
}
