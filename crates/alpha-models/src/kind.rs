use std::collections::VecDeque;

use core_types::{AlphaSignal, Bar, FeatureSet};

use crate::mean_reversion::{MeanReversionModel, MeanReversionParams};
use crate::model::AlphaModel;
use crate::momentum::{MomentumModel, MomentumParams};
use crate::volatility_breakout::{VolatilityBreakoutModel, VolatilityBreakoutParams};

/// The closed set of alpha models, dispatched without a class hierarchy.
#[derive(Debug, Clone)]
pub enum AlphaModelKind {
    Momentum(MomentumModel),
    MeanReversion(MeanReversionModel),
    VolatilityBreakout(VolatilityBreakoutModel),
}

impl AlphaModelKind {
    pub fn momentum(params: MomentumParams) -> Self {
        Self::Momentum(MomentumModel::new(params))
    }

    pub fn mean_reversion(params: MeanReversionParams) -> Self {
        Self::MeanReversion(MeanReversionModel::new(params))
    }

    pub fn volatility_breakout(params: VolatilityBreakoutParams) -> Self {
        Self::VolatilityBreakout(VolatilityBreakoutModel::new(params))
    }
}

impl AlphaModel for AlphaModelKind {
    fn name(&self) -> &str {
        match self {
            AlphaModelKind::Momentum(m) => m.name(),
            AlphaModelKind::MeanReversion(m) => m.name(),
            AlphaModelKind::VolatilityBreakout(m) => m.name(),
        }
    }

    fn required_features(&self) -> Vec<&'static str> {
        match self {
            AlphaModelKind::Momentum(m) => m.required_features(),
            AlphaModelKind::MeanReversion(m) => m.required_features(),
            AlphaModelKind::VolatilityBreakout(m) => m.required_features(),
        }
    }

    fn generate_signal(&mut self, bars: &[Bar], features: Option<&FeatureSet>) -> AlphaSignal {
        match self {
            AlphaModelKind::Momentum(m) => m.generate_signal(bars, features),
            AlphaModelKind::MeanReversion(m) => m.generate_signal(bars, features),
            AlphaModelKind::VolatilityBreakout(m) => m.generate_signal(bars, features),
        }
    }

    fn history(&self) -> &VecDeque<AlphaSignal> {
        match self {
            AlphaModelKind::Momentum(m) => m.history(),
            AlphaModelKind::MeanReversion(m) => m.history(),
            AlphaModelKind::VolatilityBreakout(m) => m.history(),
        }
    }
}
