//! SyncBarrier — exactly-once strategy dispatch per logical tick.
//!
//! Every subscribed series receives its own per-tick update from the host,
//! in a stable but series-order-dependent sequence. The barrier withholds
//! the strategy callback until the whole snapshot is consistent: every bar
//! set has produced at least one bar, and the update belonging to the last
//! subscription has been processed for this tick. After the callback
//! returns, the barrier clears every bar set's new-bar flag.

use crate::bars::registry::{BarSetRegistry, SubscriptionKey};
use log::debug;

#[derive(Debug, Default)]
pub struct SyncBarrier {
    updates_in_tick: usize,
}

impl SyncBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one per-series update. Returns true when the strategy hook
    /// should fire: this was the last subscription's update and every bar
    /// set has a bar to show.
    pub fn on_series_update(
        &mut self,
        key: &SubscriptionKey,
        registry: &BarSetRegistry,
    ) -> bool {
        self.updates_in_tick += 1;

        if registry.last_key() != Some(key) {
            return false;
        }

        // Logical tick complete. Fire only once every set is warm; a
        // pass-through set with no host bars yet holds the barrier closed.
        let ready = registry.iter().all(|set| set.count() > 0);
        if ready && self.updates_in_tick != registry.len() {
            // The host skipped or double-delivered a per-series update.
            debug!(
                "logical tick completed after {} updates for {} subscriptions",
                self.updates_in_tick,
                registry.len()
            );
        }
        if !ready {
            self.updates_in_tick = 0;
        }
        ready
    }

    /// Post-callback bookkeeping: clear all new-bar flags so the next
    /// logical tick starts from a clean snapshot.
    pub fn complete_tick(&mut self, registry: &mut BarSetRegistry) {
        for set in registry.iter_mut() {
            set.clear_new_bar();
        }
        self.updates_in_tick = 0;
    }

    /// Updates seen since the last completed logical tick.
    pub fn updates_in_tick(&self) -> usize {
        self.updates_in_tick
    }
}
