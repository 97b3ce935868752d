use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::order::TradeOrder;
use crate::position::Position;
use crate::regime::Regime;
use crate::signal::AlphaSignal;

/// Immutable record of one iteration of the trading loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionLogEntry {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub features: BTreeMap<String, f64>,
    pub signals: BTreeMap<String, AlphaSignal>,
    pub regime: Regime,
    pub position_before: Option<Position>,
    pub position_after: Option<Position>,
    pub order: Option<TradeOrder>,
    pub violations: Vec<String>,
    pub model_version: String,
}

impl DecisionLogEntry {
    /// Flat, append-only-storage-friendly view with ISO-8601 timestamps.
    pub fn to_flat_map(&self) -> BTreeMap<String, serde_json::Value> {
        let mut map = BTreeMap::new();
        map.insert("symbol".to_string(), self.symbol.clone().into());
        map.insert("timestamp".to_string(), self.timestamp.to_rfc3339().into());
        map.insert("regime".to_string(), self.regime.label().into());
        map.insert("model_version".to_string(), self.model_version.clone().into());
        map.insert(
            "features".to_string(),
            serde_json::to_value(&self.features).unwrap_or(serde_json::Value::Null),
        );
        map.insert(
            "signals".to_string(),
            serde_json::to_value(&self.signals).unwrap_or(serde_json::Value::Null),
        );
        map.insert(
            "violations".to_string(),
            serde_json::to_value(&self.violations).unwrap_or(serde_json::Value::Null),
        );
        map.insert(
            "order".to_string(),
            self.order
                .as_ref()
                .map(|o| serde_json::to_value(o).unwrap_or(serde_json::Value::Null))
                .unwrap_or(serde_json::Value::Null),
        );
        map
    }
}

/// Bounded, insertion-ordered log. The tail is the history window.
#[derive(Debug, Default)]
pub struct DecisionLog {
    entries: VecDeque<DecisionLogEntry>,
    capacity: usize,
}

impl DecisionLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, entry: DecisionLogEntry) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecisionLogEntry> {
        self.entries.iter()
    }

    /// Entries for `symbol` within the last `minutes` relative to `now`.
    pub fn recent_for_symbol<'a>(
        &'a self,
        symbol: &'a str,
        now: DateTime<Utc>,
        minutes: i64,
    ) -> impl Iterator<Item = &'a DecisionLogEntry> {
        self.entries.iter().filter(move |e| {
            e.symbol == symbol && (now - e.timestamp).num_minutes() <= minutes && e.timestamp <= now
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(ts: DateTime<Utc>) -> DecisionLogEntry {
        DecisionLogEntry {
            symbol: "AAPL".into(),
            timestamp: ts,
            features: BTreeMap::new(),
            signals: BTreeMap::new(),
            regime: Regime::Normal,
            position_before: None,
            position_after: None,
            order: None,
            violations: vec![],
            model_version: "v1".into(),
        }
    }

    #[test]
    fn caps_at_capacity_by_evicting_tail() {
        let mut log = DecisionLog::new(2);
        let t0 = Utc.timestamp_opt(0, 0).unwrap();
        log.push(entry(t0));
        log.push(entry(t0));
        log.push(entry(t0));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn insertion_order_preserved() {
        let mut log = DecisionLog::new(10);
        let t0 = Utc.timestamp_opt(0, 0).unwrap();
        let t1 = Utc.timestamp_opt(100, 0).unwrap();
        log.push(entry(t0));
        log.push(entry(t1));
        let timestamps: Vec<_> = log.iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![t0, t1]);
    }
}
