pub mod correlation;
pub mod kelly;
pub mod vol_target;

pub use correlation::*;
pub use kelly::*;
pub use vol_target::*;
