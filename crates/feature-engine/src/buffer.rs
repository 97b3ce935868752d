use std::collections::VecDeque;

use core_types::Bar;

/// Bounded rolling OHLCV history for one symbol. Push evicts the oldest bar
/// once `max_history` is reached — bars are never re-ordered or mutated.
#[derive(Debug, Clone)]
pub struct OhlcvBuffer {
    bars: VecDeque<Bar>,
    max_history: usize,
}

impl OhlcvBuffer {
    pub fn new(max_history: usize) -> Self {
        Self {
            bars: VecDeque::with_capacity(max_history.min(4096)),
            max_history,
        }
    }

    pub fn push(&mut self, bar: Bar) {
        if self.bars.len() >= self.max_history {
            self.bars.pop_front();
        }
        self.bars.push_back(bar);
    }

    /// Replace the tail with `bars`, keeping everything before the first
    /// timestamp in `bars`. Used by batch updates (e.g. backfills).
    pub fn replace_tail(&mut self, bars: Vec<Bar>) {
        if let Some(first) = bars.first() {
            while self.bars.back().is_some_and(|b| b.timestamp >= first.timestamp) {
                self.bars.pop_back();
            }
        }
        for bar in bars {
            self.push(bar);
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn as_slice(&self) -> Vec<&Bar> {
        self.bars.iter().collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.back()
    }
}
