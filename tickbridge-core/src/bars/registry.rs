//! BarSetRegistry — explicit, insertion-ordered registry of subscriptions.
//!
//! Replaces ambient per-strategy dictionaries keyed by (period, symbol):
//! built once at strategy setup and passed to the components that need it.
//! Insertion order is the subscription order the sync barrier relies on.

use crate::bars::bar_set::BarSet;
use crate::config::ConfigError;
use crate::domain::Timeframe;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identity of one subscribed series: (symbol, timeframe).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionKey {
    pub symbol: String,
    pub timeframe: Timeframe,
}

impl SubscriptionKey {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
        }
    }
}

impl fmt::Display for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.timeframe)
    }
}

/// Insertion-ordered collection of bar sets with keyed lookup.
#[derive(Default)]
pub struct BarSetRegistry {
    sets: Vec<BarSet>,
    index: HashMap<SubscriptionKey, usize>,
}

impl BarSetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bar set. Subscription order is preserved; a second set for
    /// the same (symbol, timeframe) is a configuration error.
    pub fn insert(&mut self, set: BarSet) -> Result<(), ConfigError> {
        let key = set.key().clone();
        if self.index.contains_key(&key) {
            return Err(ConfigError::DuplicateSubscription(key));
        }
        self.index.insert(key, self.sets.len());
        self.sets.push(set);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn get(&self, key: &SubscriptionKey) -> Option<&BarSet> {
        self.index.get(key).map(|&i| &self.sets[i])
    }

    pub fn get_mut(&mut self, key: &SubscriptionKey) -> Option<&mut BarSet> {
        self.index.get(key).copied().map(move |i| &mut self.sets[i])
    }

    /// Convenience lookup without building a key.
    pub fn bar_set(&self, symbol: &str, timeframe: Timeframe) -> Option<&BarSet> {
        self.get(&SubscriptionKey::new(symbol, timeframe))
    }

    /// Key of the last subscription in registration order — the series whose
    /// per-tick update completes a logical tick.
    pub fn last_key(&self) -> Option<&SubscriptionKey> {
        self.sets.last().map(|s| s.key())
    }

    /// Bar sets in subscription order.
    pub fn iter(&self) -> impl Iterator<Item = &BarSet> {
        self.sets.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut BarSet> {
        self.sets.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Instrument;

    fn set(symbol: &str, minutes: i64) -> BarSet {
        let inst = Instrument::new(symbol, 0.0001, 1000.0, "USD");
        BarSet::replay(&inst, Timeframe::minutes(minutes).unwrap(), 16).unwrap()
    }

    #[test]
    fn preserves_subscription_order() {
        let mut reg = BarSetRegistry::new();
        reg.insert(set("EURUSD", 1)).unwrap();
        reg.insert(set("EURUSD", 5)).unwrap();
        reg.insert(set("GBPUSD", 1)).unwrap();

        let keys: Vec<String> = reg.iter().map(|s| s.key().to_string()).collect();
        assert_eq!(keys, vec!["EURUSD@M1", "EURUSD@M5", "GBPUSD@M1"]);
        assert_eq!(reg.last_key().unwrap().to_string(), "GBPUSD@M1");
    }

    #[test]
    fn duplicate_subscription_rejected() {
        let mut reg = BarSetRegistry::new();
        reg.insert(set("EURUSD", 1)).unwrap();
        let err = reg.insert(set("EURUSD", 1));
        assert!(matches!(err, Err(ConfigError::DuplicateSubscription(_))));
    }

    #[test]
    fn keyed_lookup() {
        let mut reg = BarSetRegistry::new();
        reg.insert(set("EURUSD", 1)).unwrap();
        let tf = Timeframe::minutes(1).unwrap();
        assert!(reg.bar_set("EURUSD", tf).is_some());
        assert!(reg.bar_set("USDJPY", tf).is_none());
    }
}
