pub mod bands;
pub mod moving_average;
pub mod momentum;
pub mod normalize;
pub mod persistence;
pub mod trend;
pub mod volatility;

pub use bands::*;
pub use moving_average::*;
pub use momentum::*;
pub use normalize::*;
pub use persistence::*;
pub use trend::*;
pub use volatility::*;
