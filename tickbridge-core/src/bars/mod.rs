//! Bar sets — one (symbol, timeframe) group of series, and their registry.

pub mod bar_set;
pub mod registry;

pub use bar_set::{BarSet, SideSeries};
pub use registry::{BarSetRegistry, SubscriptionKey};
