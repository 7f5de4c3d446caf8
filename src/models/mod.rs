pub mod generation;
pub mod prediction;

pub use generation::*;
pub use prediction::*;
