//! Timeframe — the bar period of a subscribed series.

use crate::config::ConfigError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bar period in whole seconds.
///
/// A zero or negative period is rejected at construction — the engine cannot
/// bucket ticks into bars without a positive period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timeframe {
    secs: i64,
}

impl Timeframe {
    pub fn from_secs(secs: i64) -> Result<Self, ConfigError> {
        if secs <= 0 {
            return Err(ConfigError::ZeroBarPeriod(secs));
        }
        Ok(Self { secs })
    }

    pub fn minutes(n: i64) -> Result<Self, ConfigError> {
        Self::from_secs(n * 60)
    }

    pub fn hours(n: i64) -> Result<Self, ConfigError> {
        Self::from_secs(n * 3600)
    }

    pub fn secs(&self) -> i64 {
        self.secs
    }

    /// Bucket index of a timestamp: `floor(unix_time / period)`.
    ///
    /// Two ticks belong to the same bar iff their buckets are equal.
    pub fn bucket(&self, ts: DateTime<Utc>) -> i64 {
        ts.timestamp().div_euclid(self.secs)
    }

    /// Open time of the bar containing `ts`.
    pub fn bar_open(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let open_secs = self.bucket(ts) * self.secs;
        DateTime::from_timestamp(open_secs, 0).expect("bar open time in chrono range")
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.secs % 3600 == 0 {
            write!(f, "H{}", self.secs / 3600)
        } else if self.secs % 60 == 0 {
            write!(f, "M{}", self.secs / 60)
        } else {
            write!(f, "S{}", self.secs)
        }
    }
}
