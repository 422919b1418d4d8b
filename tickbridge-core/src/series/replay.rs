//! Tick-replay series — ring-buffer-backed, locally re-aggregated.
//!
//! In tick-replay mode the series is the sole source of truth: every tick
//! either appends a fresh slot (on a new-bar boundary) or rewrites the newest
//! slot in place, applying the per-field aggregation rule.

use crate::domain::{Side, Tick, Timeframe};
use crate::series::ring_buffer::RingBuffer;
use crate::series::{OhlcField, Series};
use chrono::{DateTime, Utc};

/// Bar open times for one replayed series group.
#[derive(Debug)]
pub struct TimeSeries {
    buf: RingBuffer<DateTime<Utc>>,
    timeframe: Timeframe,
}

impl TimeSeries {
    pub fn new(timeframe: Timeframe, capacity: usize) -> Self {
        Self {
            buf: RingBuffer::new(capacity),
            timeframe,
        }
    }
}

impl Series<DateTime<Utc>> for TimeSeries {
    fn count(&self) -> usize {
        self.buf.len()
    }

    fn get(&self, ago: usize) -> Option<DateTime<Utc>> {
        self.buf.get(ago).copied()
    }

    fn on_tick(&mut self, tick: &Tick, new_bar: bool) {
        if new_bar || self.buf.is_empty() {
            self.buf.append(self.timeframe.bar_open(tick.time));
        } else {
            // Open time is fixed for the lifetime of the bar.
            self.buf.keep_last();
        }
    }
}

/// One OHLC price field for one quote side.
#[derive(Debug)]
pub struct DataSeries {
    buf: RingBuffer<f64>,
    side: Side,
    field: OhlcField,
}

impl DataSeries {
    pub fn new(side: Side, field: OhlcField, capacity: usize) -> Self {
        Self {
            buf: RingBuffer::new(capacity),
            side,
            field,
        }
    }
}

impl Series<f64> for DataSeries {
    fn count(&self) -> usize {
        self.buf.len()
    }

    fn get(&self, ago: usize) -> Option<f64> {
        self.buf.get(ago).copied()
    }

    fn on_tick(&mut self, tick: &Tick, new_bar: bool) {
        let quote = tick.quote(self.side);
        if new_bar || self.buf.is_empty() {
            // First tick of the bar seeds every field.
            self.buf.append(quote);
            return;
        }
        let prior = *self.buf.at(0);
        let merged = match self.field {
            OhlcField::Open => prior,
            OhlcField::High => prior.max(quote),
            OhlcField::Low => prior.min(quote),
            OhlcField::Close => quote,
        };
        self.buf.replace_last(merged);
    }
}

/// Side-classified traded volume per bar.
///
/// Volume is attributed by trade-aggressor side, consistent with the
/// footprint accumulator: a tick the spread cannot classify contributes to
/// neither side's volume.
#[derive(Debug)]
pub struct VolumeSeries {
    buf: RingBuffer<f64>,
    side: Side,
}

impl VolumeSeries {
    pub fn new(side: Side, capacity: usize) -> Self {
        Self {
            buf: RingBuffer::new(capacity),
            side,
        }
    }
}

impl Series<f64> for VolumeSeries {
    fn count(&self) -> usize {
        self.buf.len()
    }

    fn get(&self, ago: usize) -> Option<f64> {
        self.buf.get(ago).copied()
    }

    fn on_tick(&mut self, tick: &Tick, new_bar: bool) {
        let add = if tick.aggressor_side() == Some(self.side) {
            tick.trade_volume
        } else {
            0.0
        };
        if new_bar || self.buf.is_empty() {
            self.buf.append(add);
        } else {
            let total = *self.buf.at(0);
            self.buf.replace_last(total + add);
        }
    }
}
