//! Bar series — the per-field read/write contract and its two constructions.
//!
//! A [`Series`] exposes indexed history for one bar field (an OHLC price, a
//! volume total, or the bar open time). There are two implementations sharing
//! the read contract, selected once at construction:
//!
//! - replay series ([`replay`]) own a ring buffer and re-aggregate every raw
//!   tick locally;
//! - pass-through series ([`passthrough`]) read the host's native aggregated
//!   series, overriding the in-progress bar so a backtest never observes data
//!   that would not have been available at that bar's close.

pub mod passthrough;
pub mod replay;
pub mod ring_buffer;

pub use passthrough::{HostDataSeries, HostTimeSeries, HostVolumeSeries};
pub use replay::{DataSeries, TimeSeries, VolumeSeries};
pub use ring_buffer::{RingBuffer, DEFAULT_CAPACITY};

use crate::domain::Tick;
use serde::{Deserialize, Serialize};

/// Which OHLC field a price series carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OhlcField {
    Open,
    High,
    Low,
    Close,
}

/// Indexed access to one bar field, newest-first.
///
/// Index 0 is the in-progress, possibly still-forming bar; index `count()-1`
/// is the oldest retained bar. `at`/`last` fail loudly past `count()` —
/// strategies probing history depth use `get`.
pub trait Series<T: Copy> {
    fn count(&self) -> usize;

    /// Value `ago` bars behind the newest, or `None` past retained history.
    fn get(&self, ago: usize) -> Option<T>;

    /// Per-tick update. `new_bar` is true when this tick starts a new bar
    /// for the owning series group.
    fn on_tick(&mut self, tick: &Tick, new_bar: bool);

    /// Value `ago` bars behind the newest. Panics past `count()`.
    fn at(&self, ago: usize) -> T {
        match self.get(ago) {
            Some(v) => v,
            None => panic!("series index {ago} out of range (count {})", self.count()),
        }
    }

    /// Most recent, possibly still-forming value.
    fn last(&self) -> T {
        self.at(0)
    }
}
