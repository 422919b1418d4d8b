//! Order lifecycle — signal identity, pending orders, positions, history,
//! and the reconciliation state machine that maps host callbacks onto them.

pub mod events;
pub mod history;
pub mod pending;
pub mod position;
pub mod reconciler;
pub mod signal;

pub use events::{
    ExecutionUpdate, HostOrderId, HostOrderState, OrderRequest, OrderUpdate, ReconcileEvent,
};
pub use history::{HistoricalTrade, History};
pub use pending::{OrderKind, OrderRef, PendingOrder, TradeSide};
pub use position::Position;
pub use reconciler::{OrderReconciler, ReconcileError};
pub use signal::{Signal, SIGNAL_SEPARATOR};
