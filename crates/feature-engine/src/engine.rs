use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, TimeZone, Utc};
use core_types::{Bar, FeatureSet};
use tracing::debug;
use ta_indicators::{
    atr, average as atr_average, bollinger_position, directional_ratio, ewma_vol, hurst_exponent,
    log_returns, macd, rsi, rolling_zscore, vol_of_vol,
};

use crate::buffer::OhlcvBuffer;

const ADX_PERIOD: usize = 14;
const VOL_REGIME_LOOKBACK: usize = 252;
const EWMA_DECAY: f64 = 0.94;

/// Static configuration for the feature engine. Validated once at
/// construction; everything downstream is normal control flow.
#[derive(Debug, Clone, Copy)]
pub struct FeatureEngineConfig {
    pub max_history: usize,
}

impl Default for FeatureEngineConfig {
    fn default() -> Self {
        Self { max_history: 1000 }
    }
}

/// Maintains per-symbol OHLCV buffers and a feature cache invalidated on
/// every update. `get_features` never peeks past the timestamp of the
/// latest bar in the buffer -- point-in-time correctness by construction,
/// since nothing later than that bar has been ingested yet.
#[derive(Debug, Default)]
pub struct FeatureEngine {
    config_max_history: usize,
    buffers: HashMap<String, OhlcvBuffer>,
    cache: HashMap<String, FeatureSet>,
}

impl FeatureEngine {
    pub fn new(config: FeatureEngineConfig) -> Self {
        Self {
            config_max_history: config.max_history,
            buffers: HashMap::new(),
            cache: HashMap::new(),
        }
    }

    pub fn update(&mut self, bar: Bar) {
        let symbol = bar.symbol.clone();
        let buf = self
            .buffers
            .entry(symbol.clone())
            .or_insert_with(|| OhlcvBuffer::new(self.config_max_history));
        buf.push(bar);
        self.cache.remove(&symbol);
    }

    pub fn update_batch(&mut self, symbol: &str, bars: Vec<Bar>) {
        let buf = self
            .buffers
            .entry(symbol.to_string())
            .or_insert_with(|| OhlcvBuffer::new(self.config_max_history));
        buf.replace_tail(bars);
        self.cache.remove(symbol);
    }

    pub fn bar_count(&self, symbol: &str) -> usize {
        self.buffers.get(symbol).map(|b| b.len()).unwrap_or(0)
    }

    /// Owned snapshot of the buffered history for `symbol`, oldest first.
    pub fn bars(&self, symbol: &str) -> Vec<Bar> {
        self.buffers.get(symbol).map(|b| b.as_slice().into_iter().cloned().collect()).unwrap_or_default()
    }

    /// Latest feature snapshot for `symbol`. Empty-ish (zeroed) set when
    /// fewer than 2 bars are buffered, per contract.
    pub fn get_features(&mut self, symbol: &str) -> FeatureSet {
        if let Some(cached) = self.cache.get(symbol) {
            return cached.clone();
        }

        let features = match self.buffers.get(symbol) {
            Some(buf) if buf.len() >= 2 => compute(symbol, buf),
            Some(buf) => {
                debug!(symbol, bars = buf.len(), "insufficient bars for feature computation");
                empty_set(symbol, buf.last().map(|b| b.timestamp))
            }
            None => empty_set(symbol, None),
        };

        self.cache.insert(symbol.to_string(), features.clone());
        features
    }
}

fn empty_set(symbol: &str, timestamp: Option<DateTime<Utc>>) -> FeatureSet {
    FeatureSet {
        symbol: symbol.to_string(),
        timestamp: timestamp.unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap()),
        log_return_1: 0.0,
        log_return_5: 0.0,
        log_return_20: 0.0,
        realized_vol_20: 0.0,
        realized_vol_60: 0.0,
        ewma_vol: 0.0,
        momentum_5: 0.0,
        momentum_10: 0.0,
        momentum_20: 0.0,
        momentum_60: 0.0,
        vwap_deviation_20: 0.0,
        volume_ratio: 0.0,
        volume_trend: 0.0,
        dollar_volume: 0.0,
        order_book_imbalance: None,
        rsi_14: 50.0,
        macd: 0.0,
        macd_signal: 0.0,
        macd_histogram: 0.0,
        bollinger_position: 0.0,
        atr_14: 0.0,
        vol_regime: 1,
        trend_regime: 0,
        hurst_exponent: 0.5,
        vol_of_vol: 0.0,
        extra: BTreeMap::new(),
    }
}

fn momentum(closes: &[f64], lookback: usize) -> f64 {
    if closes.len() <= lookback {
        return 0.0;
    }
    let p_t = closes[closes.len() - 1];
    let p_lag = closes[closes.len() - 1 - lookback];
    if p_lag.abs() <= f64::EPSILON {
        0.0
    } else {
        p_t / p_lag - 1.0
    }
}

fn vwap_deviation(bars: &[&Bar], window: usize) -> f64 {
    if bars.len() < window {
        return 0.0;
    }
    let slice = &bars[bars.len() - window..];
    let dollar: f64 = slice.iter().map(|b| b.close * b.volume).sum();
    let volume: f64 = slice.iter().map(|b| b.volume).sum();
    if volume <= 0.0 {
        return 0.0;
    }
    let vwap = dollar / volume;
    let price = bars[bars.len() - 1].close;
    if vwap.abs() <= f64::EPSILON {
        0.0
    } else {
        (price - vwap) / vwap
    }
}

fn volume_ratio(volumes: &[f64], window: usize) -> f64 {
    if volumes.len() < window + 1 {
        return 1.0;
    }
    let trailing = &volumes[volumes.len() - 1 - window..volumes.len() - 1];
    let mean = trailing.iter().sum::<f64>() / window as f64;
    if mean <= 0.0 {
        1.0
    } else {
        volumes[volumes.len() - 1] / mean
    }
}

fn volume_trend(volumes: &[f64], short: usize, long: usize) -> f64 {
    if volumes.len() < long {
        return 0.0;
    }
    let short_ma = volumes[volumes.len() - short..].iter().sum::<f64>() / short as f64;
    let long_ma = volumes[volumes.len() - long..].iter().sum::<f64>() / long as f64;
    if long_ma <= 0.0 {
        0.0
    } else {
        short_ma / long_ma - 1.0
    }
}

fn volatility_regime(returns: &[f64]) -> u8 {
    if returns.len() < 20 {
        return 1;
    }
    let window = returns.len().min(VOL_REGIME_LOOKBACK);
    let slice = &returns[returns.len() - window..];
    let mut rolling = Vec::new();
    let step = 20.min(slice.len());
    for chunk_end in step..=slice.len() {
        let chunk = &slice[chunk_end - step..chunk_end];
        let mean = chunk.iter().sum::<f64>() / step as f64;
        let var = chunk.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / step as f64;
        rolling.push(var.sqrt());
    }
    if rolling.is_empty() {
        return 1;
    }
    let mut sorted = rolling.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let p25 = percentile(&sorted, 0.25);
    let p75 = percentile(&sorted, 0.75);
    let current = *rolling.last().unwrap();
    if current <= p25 {
        0
    } else if current >= p75 {
        2
    } else {
        1
    }
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn compute(symbol: &str, buf: &OhlcvBuffer) -> FeatureSet {
    let bars = buf.as_slice();
    let closes = buf.closes();
    let volumes = buf.volumes();
    let returns = log_returns(&closes);
    let last_bar = *bars.last().unwrap();

    let rsi_series = rsi(&closes, 14);
    let rsi_14 = rsi_series.last().copied().unwrap_or(50.0);

    let macd_result = macd(&closes, 12, 26, 9);
    let macd_val = macd_result.macd_line.last().copied().unwrap_or(0.0);
    let macd_signal = macd_result.signal_line.last().copied().unwrap_or(0.0);
    let macd_hist = macd_result.histogram.last().copied().unwrap_or(0.0);

    let atr_series = atr(&bars.iter().map(|b| (*b).clone()).collect::<Vec<_>>(), 14);
    let atr_14 = atr_series.last().copied().unwrap_or(0.0);
    let long_atr = atr_average(&atr_series, atr_series.len().min(60));
    let _ = long_atr; // exposed via vol-breakout model through ta-indicators directly

    let trend_ratio = directional_ratio(&bars.iter().map(|b| (*b).clone()).collect::<Vec<_>>(), ADX_PERIOD);
    let trend_regime = if trend_ratio > 0.5 { 1 } else { 0 };

    let hurst = hurst_exponent(&closes);
    let vol20 = ta_indicators::realized_vol(&returns, 20, true);
    let vol60 = ta_indicators::realized_vol(&returns, 60, true);
    let ewma = ewma_vol(&returns, EWMA_DECAY, true);
    let vv = vol_of_vol(&returns, 20);

    let mut extra = BTreeMap::new();
    for field in FeatureSet::Z_SCORE_FIELDS {
        let series = match *field {
            "log_return_1" => returns.clone(),
            "momentum_20" => closes.windows(21).map(|w| w[20] / w[0] - 1.0).collect(),
            "rsi_14" => rsi_series.clone(),
            "macd_histogram" => macd_result.histogram.clone(),
            "atr_14" => atr_series.clone(),
            _ => vec![],
        };
        if !series.is_empty() {
            extra.insert(format!("{field}_zscore"), rolling_zscore(&series, series.len().min(100)));
        }
    }

    FeatureSet {
        symbol: symbol.to_string(),
        timestamp: last_bar.timestamp,
        log_return_1: returns.last().copied().unwrap_or(0.0),
        log_return_5: ta_indicators::log_returns(&closes).iter().rev().take(5).sum::<f64>(),
        log_return_20: ta_indicators::log_returns(&closes).iter().rev().take(20).sum::<f64>(),
        realized_vol_20: vol20,
        realized_vol_60: vol60,
        ewma_vol: ewma,
        momentum_5: momentum(&closes, 5),
        momentum_10: momentum(&closes, 10),
        momentum_20: momentum(&closes, 20),
        momentum_60: momentum(&closes, 60),
        vwap_deviation_20: vwap_deviation(&bars, 20),
        volume_ratio: volume_ratio(&volumes, 20),
        volume_trend: volume_trend(&volumes, 5, 20),
        dollar_volume: last_bar.close * last_bar.volume,
        order_book_imbalance: last_bar.order_book_imbalance(),
        rsi_14,
        macd: macd_val,
        macd_signal,
        macd_histogram: macd_hist,
        bollinger_position: bollinger_position(&closes, 20, 2.0),
        atr_14,
        vol_regime: volatility_regime(&returns),
        trend_regime,
        hurst_exponent: hurst,
        vol_of_vol: vv,
        extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bar(t: i64, c: f64) -> Bar {
        Bar::new("AAPL", Utc.timestamp_opt(t, 0).unwrap(), c, c + 0.5, c - 0.5, c, 1000.0)
    }

    #[test]
    fn get_features_empty_below_two_bars() {
        let mut engine = FeatureEngine::new(FeatureEngineConfig::default());
        engine.update(bar(0, 100.0));
        let fs = engine.get_features("AAPL");
        assert_eq!(fs.log_return_1, 0.0);
        assert_eq!(fs.rsi_14, 50.0);
    }

    #[test]
    fn cache_invalidated_on_update() {
        let mut engine = FeatureEngine::new(FeatureEngineConfig::default());
        for i in 0..60 {
            engine.update(bar(i, 100.0 + i as f64));
        }
        let before = engine.get_features("AAPL");
        engine.update(bar(60, 250.0));
        let after = engine.get_features("AAPL");
        assert_ne!(before.log_return_1, after.log_return_1);
    }

    #[test]
    fn point_in_time_ignores_future_bars() {
        let mut engine = FeatureEngine::new(FeatureEngineConfig::default());
        for i in 0..60 {
            engine.update(bar(i, 100.0 + i as f64));
        }
        let snapshot_at_59 = engine.get_features("AAPL");
        engine.update(bar(60, 1000.0));
        let snapshot_at_60 = engine.get_features("AAPL");
        assert_ne!(snapshot_at_59.timestamp, snapshot_at_60.timestamp);
    }
}
