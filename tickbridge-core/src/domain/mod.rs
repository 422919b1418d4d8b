//! Domain types — ticks, timeframes, instruments.

pub mod instrument;
pub mod tick;
pub mod timeframe;

pub use instrument::Instrument;
pub use tick::{Side, Tick};
pub use timeframe::Timeframe;
