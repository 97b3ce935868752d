pub mod learner;
pub mod model_selector;
pub mod walk_forward;

pub use learner::*;
pub use model_selector::*;
pub use walk_forward::*;
