pub mod adaptive;
pub mod lifecycle;
pub mod order_generation;
pub mod slippage;
pub mod twap;
pub mod vwap;

pub use adaptive::*;
pub use lifecycle::*;
pub use order_generation::*;
pub use slippage::*;
pub use twap::*;
pub use vwap::*;
