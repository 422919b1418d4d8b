//! Pass-through series — thin readers over host-native aggregation.
//!
//! In pass-through mode the host platform already aggregates bars; the series
//! only forwards reads. Two invariants hold at index 0 (the in-progress,
//! not-yet-closed bar) so a backtest never peeks into the future:
//!
//! - a price series returns the instrument's current bid/ask, not the host's
//!   still-mutating aggregate;
//! - a volume series returns 0, not a partial total.

use crate::domain::{Side, Tick};
use crate::host::HostSeries;
use crate::series::{OhlcField, Series};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to the host's aggregated bars. Single-threaded callback
/// dispatch makes `Rc<RefCell<_>>` the right ownership shape here.
pub type HostHandle = Rc<RefCell<dyn HostSeries>>;

/// Bar open times read straight from the host.
pub struct HostTimeSeries {
    host: HostHandle,
}

impl HostTimeSeries {
    pub fn new(host: HostHandle) -> Self {
        Self { host }
    }
}

impl Series<DateTime<Utc>> for HostTimeSeries {
    fn count(&self) -> usize {
        self.host.borrow().count()
    }

    fn get(&self, ago: usize) -> Option<DateTime<Utc>> {
        self.host.borrow().open_time(ago)
    }

    fn on_tick(&mut self, _tick: &Tick, _new_bar: bool) {
        // The host owns the data; nothing to write.
    }
}

/// One OHLC field for one side, with the live-quote override at index 0.
pub struct HostDataSeries {
    host: HostHandle,
    side: Side,
    field: OhlcField,
    live_quote: Option<f64>,
}

impl HostDataSeries {
    pub fn new(host: HostHandle, side: Side, field: OhlcField) -> Self {
        Self {
            host,
            side,
            field,
            live_quote: None,
        }
    }
}

impl Series<f64> for HostDataSeries {
    fn count(&self) -> usize {
        self.host.borrow().count()
    }

    fn get(&self, ago: usize) -> Option<f64> {
        let host = self.host.borrow();
        if ago >= host.count() {
            return None;
        }
        if ago == 0 {
            // The forming bar's aggregate is not yet knowable; expose the
            // current quote instead. Before the first tick arrives the host
            // value is all there is.
            return self
                .live_quote
                .or_else(|| host.price(self.side, self.field, 0));
        }
        host.price(self.side, self.field, ago)
    }

    fn on_tick(&mut self, tick: &Tick, _new_bar: bool) {
        self.live_quote = Some(tick.quote(self.side));
    }
}

/// Per-bar volume for one side, reporting 0 for the forming bar.
pub struct HostVolumeSeries {
    host: HostHandle,
    side: Side,
}

impl HostVolumeSeries {
    pub fn new(host: HostHandle, side: Side) -> Self {
        Self { host, side }
    }
}

impl Series<f64> for HostVolumeSeries {
    fn count(&self) -> usize {
        self.host.borrow().count()
    }

    fn get(&self, ago: usize) -> Option<f64> {
        let host = self.host.borrow();
        if ago >= host.count() {
            return None;
        }
        if ago == 0 {
            // A partial total would leak intrabar information.
            return Some(0.0);
        }
        host.volume(self.side, ago)
    }

    fn on_tick(&mut self, _tick: &Tick, _new_bar: bool) {}
}
