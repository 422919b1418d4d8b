//! History — append-only record of closed trades.

use crate::orders::pending::TradeSide;
use crate::orders::signal::Signal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable closed-trade record. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalTrade {
    pub signal: Signal,
    pub symbol: String,
    pub side: TradeSide,
    pub volume: f64,
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
    pub exit_price: f64,
    pub exit_time: DateTime<Utc>,
    pub gross_profit: f64,
    pub commission: f64,
    pub net_profit: f64,
}

impl HistoricalTrade {
    pub fn is_winner(&self) -> bool {
        self.net_profit > 0.0
    }
}

/// Closed trades, oldest first. Append-only for the strategy's lifetime;
/// nothing is persisted beyond it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    trades: Vec<HistoricalTrade>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, trade: HistoricalTrade) {
        self.trades.push(trade);
    }

    pub fn count(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&HistoricalTrade> {
        self.trades.get(index)
    }

    pub fn last(&self) -> Option<&HistoricalTrade> {
        self.trades.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoricalTrade> {
        self.trades.iter()
    }

    /// Sum of net profits across all closed trades.
    pub fn net_profit(&self) -> f64 {
        self.trades.iter().map(|t| t.net_profit).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(net: f64) -> HistoricalTrade {
        HistoricalTrade {
            signal: Signal::new("t", "").unwrap(),
            symbol: "EURUSD".into(),
            side: TradeSide::Buy,
            volume: 1000.0,
            entry_price: 1.1000,
            entry_time: Utc::now(),
            exit_price: 1.1010,
            exit_time: Utc::now(),
            gross_profit: net,
            commission: 0.0,
            net_profit: net,
        }
    }

    #[test]
    fn append_only_accumulation() {
        let mut history = History::new();
        assert!(history.is_empty());
        history.push(trade(1.0));
        history.push(trade(-0.5));
        assert_eq!(history.count(), 2);
        assert!((history.net_profit() - 0.5).abs() < 1e-12);
        assert!(history.get(0).unwrap().is_winner());
        assert!(!history.last().unwrap().is_winner());
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let t = trade(2.5);
        let json = serde_json::to_string(&t).unwrap();
        let deser: HistoricalTrade = serde_json::from_str(&json).unwrap();
        assert_eq!(t, deser);
    }
}
