pub mod chart;
pub mod indicators;
pub mod sample;


pub use chart::*;
pub use indicators::*;
pub use sample::*;
