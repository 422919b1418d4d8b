//! Host-side order/execution events and engine-side reconciliation events.

use crate::orders::history::HistoricalTrade;
use crate::orders::pending::{OrderKind, PendingOrder, TradeSide};
use crate::orders::position::Position;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The host platform's native order handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostOrderId(pub String);

impl HostOrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for HostOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order state as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostOrderState {
    Submitted,
    Accepted,
    Working,
    Filled,
    Cancelled,
    Rejected,
    CancelPending,
    Expired,
}

impl HostOrderState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            HostOrderState::Filled
                | HostOrderState::Cancelled
                | HostOrderState::Rejected
                | HostOrderState::Expired
        )
    }

    /// States that carry no actionable transition for the reconciler.
    pub fn is_intermediate(&self) -> bool {
        matches!(
            self,
            HostOrderState::Submitted | HostOrderState::Accepted | HostOrderState::CancelPending
        )
    }
}

/// One order-status callback from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub id: HostOrderId,
    /// The host's single identity field; echoes our encoded signal for
    /// engine-issued orders.
    pub name: String,
    pub symbol: String,
    pub state: HostOrderState,
    pub limit_price: Option<f64>,
    pub avg_fill_price: Option<f64>,
    pub time: DateTime<Utc>,
}

/// One execution callback, for hosts that separate executions from order
/// status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionUpdate {
    pub execution_id: String,
    pub order_id: Option<HostOrderId>,
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub quantity: f64,
    pub is_entry: bool,
    pub is_exit: bool,
    pub time: DateTime<Utc>,
}

/// A strategy's order submission intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub label: String,
    pub comment: String,
    pub symbol: String,
    pub side: TradeSide,
    pub volume: f64,
    pub kind: OrderKind,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub expiration: Option<DateTime<Utc>>,
}

/// Lifecycle events produced by the reconciler, forwarded to the strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileEvent {
    PendingCreated(PendingOrder),
    PendingFilled(PendingOrder),
    PendingCancelled(PendingOrder),
    PendingRejected(PendingOrder),
    PositionOpened(Position),
    PositionModified(Position),
    PositionClosed(HistoricalTrade),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_and_intermediate_partition() {
        assert!(HostOrderState::Filled.is_terminal());
        assert!(HostOrderState::Rejected.is_terminal());
        assert!(!HostOrderState::Working.is_terminal());
        assert!(HostOrderState::Submitted.is_intermediate());
        assert!(HostOrderState::CancelPending.is_intermediate());
        assert!(!HostOrderState::Filled.is_intermediate());
    }

    #[test]
    fn order_update_serialization_roundtrip() {
        let update = OrderUpdate {
            id: HostOrderId::new("17"),
            name: "lbl|#|cmt".into(),
            symbol: "EURUSD".into(),
            state: HostOrderState::Working,
            limit_price: Some(1.0950),
            avg_fill_price: None,
            time: Utc::now(),
        };
        let json = serde_json::to_string(&update).unwrap();
        let deser: OrderUpdate = serde_json::from_str(&json).unwrap();
        assert_eq!(update, deser);
    }
}
