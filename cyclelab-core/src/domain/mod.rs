//! Domain types for CycleLab: the observation stream and OHLCV bars.

pub mod bar;
pub mod observation;

pub use bar::Bar;
pub use observation::Observation;
