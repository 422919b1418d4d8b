//! Tick — one raw market update from the host feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Quote side of the book. Bar series and footprint buckets are kept
/// separately per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

/// A single market update: best quotes plus the trade that printed with them.
///
/// Ticks are transient — once replayed into the ring buffers they are not
/// retained beyond buffer capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub time: DateTime<Utc>,
    pub bid: f64,
    pub ask: f64,
    pub trade_price: f64,
    pub trade_volume: f64,
}

impl Tick {
    /// Quote value for one side of the book.
    pub fn quote(&self, side: Side) -> f64 {
        match side {
            Side::Bid => self.bid,
            Side::Ask => self.ask,
        }
    }

    /// Classify the trade by aggressor side.
    ///
    /// Ask-side if the trade printed at or above the ask, bid-side if at or
    /// below the bid. A zero-spread tick (`bid == ask`) cannot be classified
    /// and returns `None`, as does a trade inside the spread.
    pub fn aggressor_side(&self) -> Option<Side> {
        if self.bid == self.ask {
            return None;
        }
        if self.trade_price >= self.ask {
            Some(Side::Ask)
        } else if self.trade_price <= self.bid {
            Some(Side::Bid)
        } else {
            None
        }
    }
}
