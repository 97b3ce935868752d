pub mod detector;
pub mod ks_test;
pub mod psi;
pub mod severity;

pub use detector::*;
pub use ks_test::*;
pub use psi::*;
pub use severity::*;
