//! BarSet — the full OHLCV + footprint state for one (symbol, timeframe).

use crate::bars::registry::SubscriptionKey;
use crate::config::ConfigError;
use crate::domain::{Instrument, Side, Tick, Timeframe};
use crate::footprint::FootprintAccumulator;
use crate::series::passthrough::{
    HostDataSeries, HostHandle, HostTimeSeries, HostVolumeSeries,
};
use crate::series::replay::{DataSeries, TimeSeries, VolumeSeries};
use crate::series::{OhlcField, Series};
use chrono::{DateTime, Utc};

/// The five per-side series of a bar set. Fields are public for indexed
/// strategy reads (`set.bid().close.at(1)`).
pub struct SideSeries {
    pub open: Box<dyn Series<f64>>,
    pub high: Box<dyn Series<f64>>,
    pub low: Box<dyn Series<f64>>,
    pub close: Box<dyn Series<f64>>,
    pub volume: Box<dyn Series<f64>>,
}

impl SideSeries {
    fn replay(side: Side, capacity: usize) -> Self {
        Self {
            open: Box::new(DataSeries::new(side, OhlcField::Open, capacity)),
            high: Box::new(DataSeries::new(side, OhlcField::High, capacity)),
            low: Box::new(DataSeries::new(side, OhlcField::Low, capacity)),
            close: Box::new(DataSeries::new(side, OhlcField::Close, capacity)),
            volume: Box::new(VolumeSeries::new(side, capacity)),
        }
    }

    fn passthrough(host: &HostHandle, side: Side) -> Self {
        Self {
            open: Box::new(HostDataSeries::new(host.clone(), side, OhlcField::Open)),
            high: Box::new(HostDataSeries::new(host.clone(), side, OhlcField::High)),
            low: Box::new(HostDataSeries::new(host.clone(), side, OhlcField::Low)),
            close: Box::new(HostDataSeries::new(host.clone(), side, OhlcField::Close)),
            volume: Box::new(HostVolumeSeries::new(host.clone(), side)),
        }
    }

    fn on_tick(&mut self, tick: &Tick, new_bar: bool) {
        self.open.on_tick(tick, new_bar);
        self.high.on_tick(tick, new_bar);
        self.low.on_tick(tick, new_bar);
        self.close.on_tick(tick, new_bar);
        self.volume.on_tick(tick, new_bar);
    }
}

/// Open times, bid/ask OHLC, bid/ask volume, and footprint for one
/// (symbol, timeframe) pair. Owns new-bar detection.
pub struct BarSet {
    key: SubscriptionKey,
    open_times: Box<dyn Series<DateTime<Utc>>>,
    bid: SideSeries,
    ask: SideSeries,
    footprint: FootprintAccumulator,
    prev_bucket: Option<i64>,
    new_bar: bool,
}

impl BarSet {
    /// Tick-replay mode: every series owns a ring buffer and re-aggregates
    /// the raw tick stream locally.
    pub fn replay(
        instrument: &Instrument,
        timeframe: Timeframe,
        capacity: usize,
    ) -> Result<Self, ConfigError> {
        instrument.validate()?;
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self {
            key: SubscriptionKey::new(&instrument.symbol, timeframe),
            open_times: Box::new(TimeSeries::new(timeframe, capacity)),
            bid: SideSeries::replay(Side::Bid, capacity),
            ask: SideSeries::replay(Side::Ask, capacity),
            footprint: FootprintAccumulator::new(instrument.tick_size),
            prev_bucket: None,
            new_bar: false,
        })
    }

    /// Pass-through mode: closed bars come from the host's own aggregation;
    /// only the live quote and footprint are tracked locally.
    pub fn passthrough(
        instrument: &Instrument,
        timeframe: Timeframe,
        host: HostHandle,
    ) -> Result<Self, ConfigError> {
        instrument.validate()?;
        Ok(Self {
            key: SubscriptionKey::new(&instrument.symbol, timeframe),
            open_times: Box::new(HostTimeSeries::new(host.clone())),
            bid: SideSeries::passthrough(&host, Side::Bid),
            ask: SideSeries::passthrough(&host, Side::Ask),
            footprint: FootprintAccumulator::new(instrument.tick_size),
            prev_bucket: None,
            new_bar: false,
        })
    }

    /// Process one tick: detect the bar boundary, reset the footprint on a
    /// boundary, then fan the tick into every owned series.
    pub fn on_tick(&mut self, tick: &Tick) {
        let bucket = self.key.timeframe.bucket(tick.time);
        let starts_bar = match self.prev_bucket {
            None => true,
            Some(prev) => prev != bucket,
        };
        if starts_bar {
            // Raised here, cleared only by the sync barrier after the
            // strategy callback has observed it (postponed reset).
            self.new_bar = true;
            self.footprint.reset();
        }

        self.open_times.on_tick(tick, starts_bar);
        self.bid.on_tick(tick, starts_bar);
        self.ask.on_tick(tick, starts_bar);
        self.footprint.record(tick);

        self.prev_bucket = Some(bucket);
    }

    /// True from the first tick of a bar until the barrier clears it.
    pub fn is_new_bar(&self) -> bool {
        self.new_bar
    }

    pub(crate) fn clear_new_bar(&mut self) {
        self.new_bar = false;
    }

    /// Number of bars available. Index 0 of every series is the forming bar.
    pub fn count(&self) -> usize {
        self.open_times.count()
    }

    pub fn key(&self) -> &SubscriptionKey {
        &self.key
    }

    pub fn symbol(&self) -> &str {
        &self.key.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.key.timeframe
    }

    pub fn open_times(&self) -> &dyn Series<DateTime<Utc>> {
        self.open_times.as_ref()
    }

    pub fn bid(&self) -> &SideSeries {
        &self.bid
    }

    pub fn ask(&self) -> &SideSeries {
        &self.ask
    }

    pub fn footprint(&self) -> &FootprintAccumulator {
        &self.footprint
    }
}
