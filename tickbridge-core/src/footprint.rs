//! Footprint — per-bar, per-price-level traded volume by aggressor side.
//!
//! Buckets are scoped to the lifetime of one in-progress bar and cleared at
//! every new-bar boundary before the first tick of the new bar is processed.

use crate::domain::{Side, Tick};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct FootprintAccumulator {
    tick_size: f64,
    bid: BTreeMap<i64, f64>,
    ask: BTreeMap<i64, f64>,
}

impl FootprintAccumulator {
    /// `tick_size` must be positive; validated upstream as a config error.
    pub fn new(tick_size: f64) -> Self {
        Self {
            tick_size,
            bid: BTreeMap::new(),
            ask: BTreeMap::new(),
        }
    }

    /// Quantize a price to an integer level in instrument ticks.
    pub fn level_of(&self, price: f64) -> i64 {
        (price / self.tick_size).round() as i64
    }

    /// Price represented by an integer level.
    pub fn price_of(&self, level: i64) -> f64 {
        level as f64 * self.tick_size
    }

    /// Accumulate one tick's trade volume into the classified side's bucket.
    /// Ticks the spread cannot classify (zero spread, inside the spread)
    /// contribute nothing.
    pub fn record(&mut self, tick: &Tick) {
        let Some(side) = tick.aggressor_side() else {
            return;
        };
        let level = self.level_of(tick.trade_price);
        *self.buckets_mut(side).entry(level).or_insert(0.0) += tick.trade_volume;
    }

    /// Clear all buckets. Called at every new-bar boundary.
    pub fn reset(&mut self) {
        self.bid.clear();
        self.ask.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.bid.is_empty() && self.ask.is_empty()
    }

    /// Accumulated volume at one price level for one side.
    pub fn volume_at(&self, side: Side, level: i64) -> f64 {
        self.buckets(side).get(&level).copied().unwrap_or(0.0)
    }

    /// Total accumulated volume for one side of the in-progress bar.
    pub fn side_total(&self, side: Side) -> f64 {
        self.buckets(side).values().sum()
    }

    /// Occupied levels for one side, lowest price first.
    pub fn levels(&self, side: Side) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.buckets(side).iter().map(|(&level, &vol)| (level, vol))
    }

    fn buckets(&self, side: Side) -> &BTreeMap<i64, f64> {
        match side {
            Side::Bid => &self.bid,
            Side::Ask => &self.ask,
        }
    }

    fn buckets_mut(&mut self, side: Side) -> &mut BTreeMap<i64, f64> {
        match side {
            Side::Bid => &mut self.bid,
            Side::Ask => &mut self.ask,
        }
    }
}
