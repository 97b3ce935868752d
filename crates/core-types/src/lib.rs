pub mod bar;
pub mod decision_log;
pub mod error;
pub mod feature_set;
pub mod fill;
pub mod nav;
pub mod order;
pub mod position;
pub mod regime;
pub mod signal;

pub use bar::*;
pub use decision_log::*;
pub use error::*;
pub use feature_set::*;
pub use fill::*;
pub use nav::*;
pub use order::*;
pub use position::*;
pub use regime::*;
pub use signal::*;
