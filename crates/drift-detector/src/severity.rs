#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy)]
pub struct DriftResult {
    pub statistic: f64,
    pub p_value: f64,
    pub drift_detected: bool,
    pub severity: Severity,
}
