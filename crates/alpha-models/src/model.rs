use std::collections::VecDeque;

use core_types::{AlphaSignal, Bar, FeatureSet};

pub const SIGNAL_HISTORY_CAPACITY: usize = 1000;

/// Shared capability set for every alpha model: given an OHLCV window and
/// an optional precomputed feature snapshot, produce a signal. Represented
/// as a dispatch trait over a tagged enum rather than a class hierarchy --
/// there is a small, closed set of models.
pub trait AlphaModel {
    fn name(&self) -> &str;
    fn required_features(&self) -> Vec<&'static str>;
    fn generate_signal(&mut self, bars: &[Bar], features: Option<&FeatureSet>) -> AlphaSignal;
    fn history(&self) -> &VecDeque<AlphaSignal>;
}

/// Push into a bounded, insertion-ordered history, evicting the oldest.
pub fn push_history(history: &mut VecDeque<AlphaSignal>, signal: AlphaSignal) {
    if history.len() >= SIGNAL_HISTORY_CAPACITY {
        history.pop_front();
    }
    history.push_back(signal);
}

/// Guard shared by every model: not enough bars, or NaN/non-finite OHLCV.
pub fn validate_bars(bars: &[Bar], min_bars: usize) -> bool {
    bars.len() >= min_bars && bars.iter().all(|b| b.is_valid())
}
