pub mod kind;
pub mod mean_reversion;
pub mod model;
pub mod momentum;
pub mod volatility_breakout;

pub use kind::*;
pub use mean_reversion::*;
pub use model::*;
pub use momentum::*;
pub use volatility_breakout::*;
