pub mod strategy;
pub mod auction;
pub mod proposal;

pub use strategy::*;
pub use auction::*;
pub use proposal::*;
