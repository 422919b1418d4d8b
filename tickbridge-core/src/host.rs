//! Traits at the host-platform boundary.
//!
//! The engine talks to its host through three seams: [`HostSeries`] for
//! reading host-aggregated bars (pass-through mode), [`OrderGateway`] for
//! order submission primitives, and [`Strategy`] for the user's callback
//! surface. Backtests swap in fakes at each seam.

use crate::engine::TickContext;
use crate::orders::{HistoricalTrade, OrderRef, PendingOrder, Position};
use crate::series::OhlcField;
use crate::Side;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Read access to a host-aggregated bar series. `ago` counts backwards
/// from the forming bar (0 = in progress, 1 = last closed).
pub trait HostSeries {
    fn count(&self) -> usize;
    fn open_time(&self, ago: usize) -> Option<DateTime<Utc>>;
    fn price(&self, side: Side, field: OhlcField, ago: usize) -> Option<f64>;
    fn volume(&self, side: Side, ago: usize) -> Option<f64>;
}

/// A host order primitive failed synchronously.
#[derive(Debug, Error)]
#[error("host gateway: {0}")]
pub struct GatewayError(pub String);

/// The host's order submission primitives. Implementations translate the
/// engine's typed requests into whatever the platform's API expects; the
/// asynchronous outcome flows back through order/execution callbacks.
pub trait OrderGateway {
    fn submit(&mut self, order: &PendingOrder) -> Result<(), GatewayError>;
    fn modify(
        &mut self,
        order_ref: &OrderRef,
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
    ) -> Result<(), GatewayError>;
    fn cancel(&mut self, order_ref: &OrderRef) -> Result<(), GatewayError>;
    fn close(&mut self, position: &Position) -> Result<(), GatewayError>;
}

/// The user strategy's callback surface.
///
/// All hooks run on the engine's single dispatch thread. A panic inside
/// any of them is caught at the engine boundary and reported through
/// [`Strategy::on_error`]; it never unwinds into the host.
pub trait Strategy {
    /// One logical market tick, fired after every subscribed series has
    /// absorbed it.
    fn on_tick(&mut self, ctx: &mut TickContext<'_>);

    /// A callback raised an error or panicked. Default: ignore (the engine
    /// already logs it).
    fn on_error(&mut self, _message: &str) {}

    fn on_pending_created(&mut self, _order: &PendingOrder) {}
    fn on_pending_filled(&mut self, _order: &PendingOrder) {}
    fn on_pending_cancelled(&mut self, _order: &PendingOrder) {}
    fn on_pending_rejected(&mut self, _order: &PendingOrder) {}
    fn on_position_opened(&mut self, _position: &Position) {}
    fn on_position_modified(&mut self, _position: &Position) {}
    fn on_position_closed(&mut self, _trade: &HistoricalTrade) {}

    /// The engine is stopping; last chance to release resources.
    fn on_stop(&mut self) {}
}
