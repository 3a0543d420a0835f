pub mod curve;
pub mod decay;

pub use curve::*;
pub use decay::*;
