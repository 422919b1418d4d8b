//! Engine — single-threaded callback dispatcher tying series replay,
//! the sync barrier, and order reconciliation together.
//!
//! The host pushes three kinds of callbacks: per-series tick updates,
//! order-status updates, and execution updates. The engine routes each to
//! the right component and guards every strategy hook: a panic inside user
//! code is caught here, logged, reported through `Strategy::on_error`, and
//! never unwinds into the host.

use crate::bars::registry::{BarSetRegistry, SubscriptionKey};
use crate::config::{ConfigError, EngineConfig};
use crate::domain::{Tick, Timeframe};
use crate::host::{GatewayError, OrderGateway, Strategy};
use crate::orders::{
    ExecutionUpdate, OrderReconciler, OrderRequest, OrderUpdate, ReconcileError, ReconcileEvent,
    Signal,
};
use log::{debug, error, warn};
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{context}: {message}")]
    Technical { context: String, message: String },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// An order action requested by the strategy during a callback. Actions
/// are collected while the strategy runs and applied afterwards, once the
/// engine has exclusive access to the reconciler and gateway again.
#[derive(Debug, Clone)]
pub enum OrderAction {
    Submit(OrderRequest),
    Modify {
        signal: Signal,
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
    },
    Cancel(Signal),
    Close(Signal),
}

/// Read access plus deferred order actions, handed to `Strategy::on_tick`.
pub struct TickContext<'a> {
    bars: &'a BarSetRegistry,
    orders: &'a OrderReconciler,
    actions: Vec<OrderAction>,
}

impl<'a> TickContext<'a> {
    pub fn bars(&self) -> &BarSetRegistry {
        self.bars
    }

    pub fn orders(&self) -> &OrderReconciler {
        self.orders
    }

    pub fn submit(&mut self, request: OrderRequest) {
        self.actions.push(OrderAction::Submit(request));
    }

    pub fn modify(
        &mut self,
        signal: Signal,
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
    ) {
        self.actions.push(OrderAction::Modify {
            signal,
            stop_loss,
            take_profit,
        });
    }

    pub fn cancel(&mut self, signal: Signal) {
        self.actions.push(OrderAction::Cancel(signal));
    }

    pub fn close(&mut self, signal: Signal) {
        self.actions.push(OrderAction::Close(signal));
    }

    fn into_actions(self) -> Vec<OrderAction> {
        self.actions
    }
}

pub struct Engine<S: Strategy, G: OrderGateway> {
    registry: BarSetRegistry,
    barrier: crate::sync::SyncBarrier,
    reconciler: OrderReconciler,
    strategy: S,
    gateway: G,
    stopped: bool,
}

impl<S: Strategy, G: OrderGateway> Engine<S, G> {
    pub fn new(
        config: EngineConfig,
        registry: BarSetRegistry,
        strategy: S,
        gateway: G,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if registry.is_empty() {
            return Err(ConfigError::NoSubscriptions);
        }
        Ok(Self {
            registry,
            barrier: crate::sync::SyncBarrier::new(),
            reconciler: OrderReconciler::new(config.commission_per_unit),
            strategy,
            gateway,
            stopped: false,
        })
    }

    /// One per-series tick update from the host. When this update completes
    /// a logical tick, the strategy's `on_tick` fires exactly once.
    pub fn on_series_tick(&mut self, symbol: &str, timeframe: Timeframe, tick: &Tick) {
        if self.stopped {
            return;
        }
        let key = SubscriptionKey::new(symbol, timeframe);
        let Some(set) = self.registry.get_mut(&key) else {
            warn!("tick for unsubscribed series {key}");
            return;
        };
        set.on_tick(tick);

        if self.barrier.on_series_update(&key, &self.registry) {
            self.fire_strategy_tick();
            self.barrier.complete_tick(&mut self.registry);
        }
    }

    /// One order-status callback from the host.
    pub fn on_order_update(&mut self, update: &OrderUpdate) {
        if self.stopped {
            return;
        }
        let events = self.reconciler.on_order_update(update);
        self.dispatch_events(events);
    }

    /// One execution callback from the host.
    pub fn on_execution_update(&mut self, update: &ExecutionUpdate) {
        if self.stopped {
            return;
        }
        let events = self.reconciler.on_execution_update(update);
        self.dispatch_events(events);
    }

    /// Stop the engine. Every later host callback is discarded.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        let strategy = &mut self.strategy;
        if let Err(message) = guard("on_stop", AssertUnwindSafe(|| strategy.on_stop())) {
            error!("on_stop: {message}");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn bars(&self) -> &BarSetRegistry {
        &self.registry
    }

    pub fn orders(&self) -> &OrderReconciler {
        &self.reconciler
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    fn fire_strategy_tick(&mut self) {
        let mut ctx = TickContext {
            bars: &self.registry,
            orders: &self.reconciler,
            actions: Vec::new(),
        };
        let strategy = &mut self.strategy;
        let outcome = guard("on_tick", AssertUnwindSafe(|| strategy.on_tick(&mut ctx)));
        let actions = ctx.into_actions();
        match outcome {
            Ok(()) => self.process_actions(actions),
            Err(message) => self.report_error(&message),
        }
    }

    fn process_actions(&mut self, actions: Vec<OrderAction>) {
        for action in actions {
            if let Err(err) = self.apply_action(action) {
                let message = err.to_string();
                self.report_error(&message);
            }
        }
    }

    fn apply_action(&mut self, action: OrderAction) -> Result<(), EngineError> {
        match action {
            OrderAction::Submit(request) => {
                let now = chrono::Utc::now();
                let (order, events) = self
                    .reconciler
                    .submit(request, now)
                    .map_err(reconcile_error("submit"))?;
                if let Err(err) = self.gateway.submit(&order) {
                    // Synchronous failure means no callback will arrive;
                    // roll the registration back.
                    self.reconciler.drop_pending(&order.signal);
                    return Err(err.into());
                }
                self.dispatch_events(events);
                Ok(())
            }
            OrderAction::Modify {
                signal,
                stop_loss,
                take_profit,
            } => {
                let Some(order_ref) = self.reconciler.host_ref(&signal) else {
                    return Err(reconcile_error("modify")(ReconcileError::UnknownSignal(
                        signal,
                    )));
                };
                self.gateway.modify(&order_ref, stop_loss, take_profit)?;
                let events = self
                    .reconciler
                    .modify(&signal, stop_loss, take_profit)
                    .map_err(reconcile_error("modify"))?;
                self.dispatch_events(events);
                Ok(())
            }
            OrderAction::Cancel(signal) => {
                let Some(order) = self.reconciler.pending(&signal) else {
                    return Err(reconcile_error("cancel")(ReconcileError::UnknownSignal(
                        signal,
                    )));
                };
                // Removal happens when the host confirms via callback.
                self.gateway.cancel(&order.host_ref.clone())?;
                Ok(())
            }
            OrderAction::Close(signal) => {
                let Some(position) = self.reconciler.position(&signal) else {
                    return Err(reconcile_error("close")(ReconcileError::UnknownSignal(
                        signal,
                    )));
                };
                self.gateway.close(&position.clone())?;
                Ok(())
            }
        }
    }

    fn dispatch_events(&mut self, events: Vec<ReconcileEvent>) {
        for event in events {
            let strategy = &mut self.strategy;
            let outcome = match &event {
                ReconcileEvent::PendingCreated(o) => {
                    guard("on_pending_created", AssertUnwindSafe(|| {
                        strategy.on_pending_created(o)
                    }))
                }
                ReconcileEvent::PendingFilled(o) => {
                    guard("on_pending_filled", AssertUnwindSafe(|| {
                        strategy.on_pending_filled(o)
                    }))
                }
                ReconcileEvent::PendingCancelled(o) => {
                    guard("on_pending_cancelled", AssertUnwindSafe(|| {
                        strategy.on_pending_cancelled(o)
                    }))
                }
                ReconcileEvent::PendingRejected(o) => {
                    guard("on_pending_rejected", AssertUnwindSafe(|| {
                        strategy.on_pending_rejected(o)
                    }))
                }
                ReconcileEvent::PositionOpened(p) => {
                    guard("on_position_opened", AssertUnwindSafe(|| {
                        strategy.on_position_opened(p)
                    }))
                }
                ReconcileEvent::PositionModified(p) => {
                    guard("on_position_modified", AssertUnwindSafe(|| {
                        strategy.on_position_modified(p)
                    }))
                }
                ReconcileEvent::PositionClosed(t) => {
                    guard("on_position_closed", AssertUnwindSafe(|| {
                        strategy.on_position_closed(t)
                    }))
                }
            };
            if let Err(message) = outcome {
                self.report_error(&message);
            }
        }
    }

    fn report_error(&mut self, message: &str) {
        error!("{message}");
        let strategy = &mut self.strategy;
        if guard("on_error", AssertUnwindSafe(|| strategy.on_error(message))).is_err() {
            // The error hook itself failed; logging is all that is left.
            debug!("on_error hook panicked");
        }
    }
}

fn reconcile_error(context: &str) -> impl Fn(ReconcileError) -> EngineError + '_ {
    move |err| EngineError::Technical {
        context: context.to_string(),
        message: err.to_string(),
    }
}

/// Run a strategy hook behind a panic boundary, turning a panic into an
/// error message.
fn guard<F>(context: &str, hook: F) -> Result<(), String>
where
    F: FnOnce() + std::panic::UnwindSafe,
{
    catch_unwind(hook).map_err(|payload| {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic with non-string payload".to_string());
        format!("{context} panicked: {detail}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bars::bar_set::BarSet;
    use crate::domain::Instrument;
    use crate::host::{GatewayError, OrderGateway};
    use crate::orders::{OrderKind, OrderRef, PendingOrder, Position, TradeSide};
    use chrono::{TimeZone, Utc};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct RecordingGateway {
        submitted: Vec<String>,
        fail_submit: bool,
    }

    impl OrderGateway for RecordingGateway {
        fn submit(&mut self, order: &PendingOrder) -> Result<(), GatewayError> {
            if self.fail_submit {
                return Err(GatewayError("submit refused".into()));
            }
            self.submitted.push(order.signal.encode());
            Ok(())
        }

        fn modify(
            &mut self,
            _order_ref: &OrderRef,
            _sl: Option<f64>,
            _tp: Option<f64>,
        ) -> Result<(), GatewayError> {
            Ok(())
        }

        fn cancel(&mut self, _order_ref: &OrderRef) -> Result<(), GatewayError> {
            Ok(())
        }

        fn close(&mut self, _position: &Position) -> Result<(), GatewayError> {
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct Journal {
        ticks: Rc<RefCell<usize>>,
        errors: Rc<RefCell<Vec<String>>>,
        stopped: Rc<RefCell<bool>>,
    }

    struct TestStrategy {
        journal: Journal,
        submit_on_first_tick: bool,
        panic_on_tick: bool,
    }

    impl Strategy for TestStrategy {
        fn on_tick(&mut self, ctx: &mut TickContext<'_>) {
            *self.journal.ticks.borrow_mut() += 1;
            if self.panic_on_tick {
                panic!("boom");
            }
            if self.submit_on_first_tick && *self.journal.ticks.borrow() == 1 {
                ctx.submit(OrderRequest {
                    label: "b1".into(),
                    comment: "entry".into(),
                    symbol: "EURUSD".into(),
                    side: TradeSide::Buy,
                    volume: 1000.0,
                    kind: OrderKind::Limit { price: 1.0950 },
                    stop_loss: None,
                    take_profit: None,
                    expiration: None,
                });
            }
        }

        fn on_error(&mut self, message: &str) {
            self.journal.errors.borrow_mut().push(message.to_string());
        }

        fn on_stop(&mut self) {
            *self.journal.stopped.borrow_mut() = true;
        }
    }

    fn registry() -> BarSetRegistry {
        let inst = Instrument::new("EURUSD", 0.0001, 1000.0, "USD");
        let mut reg = BarSetRegistry::new();
        reg.insert(BarSet::replay(&inst, Timeframe::minutes(1).unwrap(), 16).unwrap())
            .unwrap();
        reg
    }

    fn tick(sec: u32) -> Tick {
        Tick {
            time: Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, sec).unwrap(),
            bid: 1.1000,
            ask: 1.1002,
            trade_price: 1.1002,
            trade_volume: 1.0,
        }
    }

    fn engine(
        journal: Journal,
        submit: bool,
        panic_on_tick: bool,
        fail_submit: bool,
    ) -> Engine<TestStrategy, RecordingGateway> {
        Engine::new(
            EngineConfig::default(),
            registry(),
            TestStrategy {
                journal,
                submit_on_first_tick: submit,
                panic_on_tick,
            },
            RecordingGateway {
                fail_submit,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn empty_registry_is_a_config_error() {
        let result = Engine::new(
            EngineConfig::default(),
            BarSetRegistry::new(),
            TestStrategy {
                journal: Journal::default(),
                submit_on_first_tick: false,
                panic_on_tick: false,
            },
            RecordingGateway::default(),
        );
        assert!(matches!(result, Err(ConfigError::NoSubscriptions)));
    }

    #[test]
    fn tick_fires_strategy_and_submits_through_gateway() {
        let journal = Journal::default();
        let mut engine = engine(journal.clone(), true, false, false);
        engine.on_series_tick("EURUSD", Timeframe::minutes(1).unwrap(), &tick(0));

        assert_eq!(*journal.ticks.borrow(), 1);
        assert_eq!(engine.gateway.submitted.len(), 1);
        assert_eq!(engine.orders().pending_orders().count(), 1);
    }

    #[test]
    fn synchronous_gateway_failure_rolls_back_pending() {
        let journal = Journal::default();
        let mut engine = engine(journal.clone(), true, false, true);
        engine.on_series_tick("EURUSD", Timeframe::minutes(1).unwrap(), &tick(0));

        assert_eq!(engine.orders().pending_orders().count(), 0);
        assert_eq!(journal.errors.borrow().len(), 1);
    }

    #[test]
    fn panicking_strategy_is_contained_and_reported() {
        let journal = Journal::default();
        let mut engine = engine(journal.clone(), false, true, false);
        engine.on_series_tick("EURUSD", Timeframe::minutes(1).unwrap(), &tick(0));

        assert_eq!(*journal.ticks.borrow(), 1);
        let errors = journal.errors.borrow();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("boom"));
    }

    #[test]
    fn stopped_engine_discards_callbacks() {
        let journal = Journal::default();
        let mut engine = engine(journal.clone(), false, false, false);
        engine.stop();
        assert!(*journal.stopped.borrow());

        engine.on_series_tick("EURUSD", Timeframe::minutes(1).unwrap(), &tick(0));
        assert_eq!(*journal.ticks.borrow(), 0);
    }

    #[test]
    fn unsubscribed_series_tick_is_ignored() {
        let journal = Journal::default();
        let mut engine = engine(journal.clone(), false, false, false);
        engine.on_series_tick("USDJPY", Timeframe::minutes(1).unwrap(), &tick(0));
        assert_eq!(*journal.ticks.borrow(), 0);
    }
}
