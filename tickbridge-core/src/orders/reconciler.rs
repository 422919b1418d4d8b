//! OrderReconciler — maps host order/execution callbacks onto the
//! PendingOrder → Position → HistoricalTrade lifecycle.
//!
//! The reconciler is registered-before-submitted: a pending order exists
//! locally, keyed by its signal, before the host's submission primitive is
//! invoked, and the native handle is bound later on the first callback that
//! echoes the signal (deferred binding — the host does not guarantee a
//! handle synchronously). Terminal host events are idempotent: replaying
//! one never creates a second position or trade.

use crate::orders::events::{
    ExecutionUpdate, HostOrderState, OrderRequest, OrderUpdate, ReconcileEvent,
};
use crate::orders::history::{HistoricalTrade, History};
use crate::orders::pending::{OrderRef, PendingOrder};
use crate::orders::position::Position;
use crate::orders::signal::Signal;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("label or comment contains the reserved signal separator")]
    ReservedSeparator,

    #[error("an order or position already exists for signal {0}")]
    DuplicateSignal(Signal),

    #[error("no pending order or position for signal {0}")]
    UnknownSignal(Signal),
}

/// Exclusive owner of the pending-order and position collections, and of
/// the append-only history.
pub struct OrderReconciler {
    pending: HashMap<Signal, PendingOrder>,
    positions: HashMap<Signal, Position>,
    history: History,
    commission_per_unit: f64,
    seen_executions: HashSet<String>,
}

impl OrderReconciler {
    pub fn new(commission_per_unit: f64) -> Self {
        Self {
            pending: HashMap::new(),
            positions: HashMap::new(),
            history: History::new(),
            commission_per_unit,
            seen_executions: HashSet::new(),
        }
    }

    /// Register a pending order for a submission intent. Must be called
    /// before the host's submission primitive so the first host callback
    /// finds the order to bind to.
    pub fn submit(
        &mut self,
        request: OrderRequest,
        now: DateTime<Utc>,
    ) -> Result<(PendingOrder, Vec<ReconcileEvent>), ReconcileError> {
        let signal = Signal::new(request.label, request.comment)?;
        if self.pending.contains_key(&signal) || self.positions.contains_key(&signal) {
            return Err(ReconcileError::DuplicateSignal(signal));
        }

        let order = PendingOrder {
            signal: signal.clone(),
            symbol: request.symbol,
            side: request.side,
            volume: request.volume,
            kind: request.kind,
            stop_loss: request.stop_loss,
            take_profit: request.take_profit,
            expiration: request.expiration,
            host_ref: OrderRef::Unbound(signal.clone()),
            created_at: now,
        };
        self.pending.insert(signal, order.clone());
        let events = vec![ReconcileEvent::PendingCreated(order.clone())];
        Ok((order, events))
    }

    /// Forget a pending order whose host submission failed synchronously —
    /// no callback will ever arrive for it.
    pub fn drop_pending(&mut self, signal: &Signal) {
        self.pending.remove(signal);
    }

    /// Amend protective levels on a pending order or open position.
    pub fn modify(
        &mut self,
        signal: &Signal,
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
    ) -> Result<Vec<ReconcileEvent>, ReconcileError> {
        if let Some(order) = self.pending.get_mut(signal) {
            order.stop_loss = stop_loss;
            order.take_profit = take_profit;
            return Ok(Vec::new());
        }
        if let Some(pos) = self.positions.get_mut(signal) {
            pos.stop_loss = stop_loss;
            pos.take_profit = take_profit;
            return Ok(vec![ReconcileEvent::PositionModified(pos.clone())]);
        }
        Err(ReconcileError::UnknownSignal(signal.clone()))
    }

    /// Handle one host order-status callback.
    pub fn on_order_update(&mut self, update: &OrderUpdate) -> Vec<ReconcileEvent> {
        let signal = Signal::decode(&update.name);

        // Deferred binding: the first callback echoing our signal carries
        // the native handle. Never retried — a callback is guaranteed once
        // the order reaches a reportable state.
        if let Some(sig) = &signal {
            if let Some(order) = self.pending.get_mut(sig) {
                order.host_ref.bind(update.id.clone());
            }
        }

        match update.state {
            s if s.is_intermediate() => {
                debug!("ignoring intermediate state {s:?} for {}", update.name);
                Vec::new()
            }
            HostOrderState::Working => Vec::new(),
            HostOrderState::Filled => self.on_filled(update, signal),
            HostOrderState::Cancelled | HostOrderState::Expired => {
                self.on_pending_removed(signal, ReconcileEvent::PendingCancelled)
            }
            HostOrderState::Rejected => {
                self.on_pending_removed(signal, ReconcileEvent::PendingRejected)
            }
            // is_intermediate covered above; listed states are exhaustive.
            _ => Vec::new(),
        }
    }

    /// Handle one host execution callback (hosts that separate execution
    /// events from order-status events).
    pub fn on_execution_update(&mut self, update: &ExecutionUpdate) -> Vec<ReconcileEvent> {
        if !self.seen_executions.insert(update.execution_id.clone()) {
            debug!("duplicate execution {} ignored", update.execution_id);
            return Vec::new();
        }

        let signal = Signal::decode(&update.name);

        if update.is_entry {
            if let Some(sig) = &signal {
                if let Some(mut order) = self.pending.remove(sig) {
                    if let Some(id) = &update.order_id {
                        order.host_ref.bind(id.clone());
                    }
                    return self.open_position(order, update.price, update.time);
                }
                warn!("entry execution for unknown signal {sig}");
            } else {
                warn!(
                    "entry execution {} with undecodable identity {:?}",
                    update.execution_id, update.name
                );
            }
            return Vec::new();
        }

        if update.is_exit {
            if let Some(sig) = &signal {
                if self.positions.contains_key(sig) {
                    return self.close_position(sig.clone(), update.price, update.time);
                }
            }
            // Protective exits and session closes do not echo the signal;
            // fall back to symbol matching.
            return self.close_by_symbol(&update.symbol, update.price, update.time);
        }

        debug!("execution {} is neither entry nor exit", update.execution_id);
        Vec::new()
    }

    fn on_filled(
        &mut self,
        update: &OrderUpdate,
        signal: Option<Signal>,
    ) -> Vec<ReconcileEvent> {
        if let Some(sig) = signal {
            if let Some(order) = self.pending.remove(&sig) {
                let price = update
                    .avg_fill_price
                    .or(update.limit_price)
                    .or_else(|| order.target_price());
                let Some(entry_price) = price else {
                    warn!("fill for {sig} carries no price; transition deferred");
                    self.pending.insert(sig, order);
                    return Vec::new();
                };
                return self.open_position(order, entry_price, update.time);
            }

            if let Some(pos) = self.positions.get(&sig) {
                // A replayed entry fill references the position's own entry
                // order; idempotence demands it changes nothing.
                if pos.host_ref.handle() == Some(&update.id) {
                    debug!("duplicate entry fill for {sig} ignored");
                    return Vec::new();
                }
                let Some(exit_price) = update.avg_fill_price.or(update.limit_price) else {
                    warn!("closing fill for {sig} carries no price");
                    return Vec::new();
                };
                return self.close_position(sig, exit_price, update.time);
            }

            // Decodable signal with no state behind it: a reconciliation
            // bug, or a terminal-event replay after the close settled.
            warn!("fill for unknown signal {sig}");
            return Vec::new();
        }

        // No signal: host-initiated close (protective exit, session close).
        let Some(price) = update.avg_fill_price.or(update.limit_price) else {
            debug!("unsignalled fill without price on {}", update.symbol);
            return Vec::new();
        };
        self.close_by_symbol(&update.symbol, price, update.time)
    }

    fn on_pending_removed(
        &mut self,
        signal: Option<Signal>,
        event: fn(PendingOrder) -> ReconcileEvent,
    ) -> Vec<ReconcileEvent> {
        if let Some(sig) = signal {
            if let Some(order) = self.pending.remove(&sig) {
                return vec![event(order)];
            }
            debug!("terminal update for already-settled signal {sig}");
        }
        Vec::new()
    }

    fn open_position(
        &mut self,
        order: PendingOrder,
        entry_price: f64,
        entry_time: DateTime<Utc>,
    ) -> Vec<ReconcileEvent> {
        let handle = order
            .host_ref
            .handle()
            .cloned()
            .unwrap_or_else(|| crate::orders::events::HostOrderId::new(order.signal.encode()));
        let position = Position::open_from(&order, entry_price, entry_time, handle);
        self.positions.insert(order.signal.clone(), position.clone());
        vec![
            ReconcileEvent::PendingFilled(order),
            ReconcileEvent::PositionOpened(position),
        ]
    }

    fn close_position(
        &mut self,
        signal: Signal,
        exit_price: f64,
        exit_time: DateTime<Utc>,
    ) -> Vec<ReconcileEvent> {
        let Some(position) = self.positions.remove(&signal) else {
            return Vec::new();
        };
        let gross_profit = position.gross_profit(exit_price);
        // Entry and exit fills each pay commission.
        let commission = self.commission_per_unit * position.volume * 2.0;
        let trade = HistoricalTrade {
            signal: position.signal,
            symbol: position.symbol,
            side: position.side,
            volume: position.volume,
            entry_price: position.entry_price,
            entry_time: position.entry_time,
            exit_price,
            exit_time,
            gross_profit,
            commission,
            net_profit: gross_profit - commission,
        };
        self.history.push(trade.clone());
        vec![ReconcileEvent::PositionClosed(trade)]
    }

    fn close_by_symbol(
        &mut self,
        symbol: &str,
        price: f64,
        time: DateTime<Utc>,
    ) -> Vec<ReconcileEvent> {
        let found = self
            .positions
            .iter()
            .find(|(_, pos)| pos.symbol == symbol)
            .map(|(sig, _)| sig.clone());
        match found {
            Some(sig) => self.close_position(sig, price, time),
            None => {
                // Known automatic-close path that already settled; silent
                // at warn level by design of the error taxonomy.
                debug!("no position on {symbol} for host-initiated close");
                Vec::new()
            }
        }
    }

    // ── Read access ──────────────────────────────────────────────────

    pub fn pending(&self, signal: &Signal) -> Option<&PendingOrder> {
        self.pending.get(signal)
    }

    pub fn position(&self, signal: &Signal) -> Option<&Position> {
        self.positions.get(signal)
    }

    pub fn pending_orders(&self) -> impl Iterator<Item = &PendingOrder> {
        self.pending.values()
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    /// Current host reference for a signal, pending or open.
    pub fn host_ref(&self, signal: &Signal) -> Option<OrderRef> {
        self.pending
            .get(signal)
            .map(|o| o.host_ref.clone())
            .or_else(|| self.positions.get(signal).map(|p| p.host_ref.clone()))
    }

    pub fn history(&self) -> &History {
        &self.history
    }
}
