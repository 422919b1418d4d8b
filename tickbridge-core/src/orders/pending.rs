use crate::orders::events::HostOrderId;
use crate::orders::signal::Signal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a strategy order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// +1 for buys, -1 for sells; the profit sign convention.
    pub fn sign(&self) -> f64 {
        match self {
            TradeSide::Buy => 1.0,
            TradeSide::Sell => -1.0,
        }
    }
}

/// Order type at submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderKind {
    Market,
    Limit { price: f64 },
}

/// Reference to the host's native order handle.
///
/// The host does not guarantee the handle is available synchronously after
/// submission, so the reference starts unbound (carrying only the signal)
/// and is bound once, on the first host callback echoing the same signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderRef {
    Unbound(Signal),
    Bound(HostOrderId),
}

impl OrderRef {
    pub fn is_bound(&self) -> bool {
        matches!(self, OrderRef::Bound(_))
    }

    pub fn handle(&self) -> Option<&HostOrderId> {
        match self {
            OrderRef::Bound(id) => Some(id),
            OrderRef::Unbound(_) => None,
        }
    }

    /// Bind the native handle. Idempotent once bound.
    pub fn bind(&mut self, id: HostOrderId) {
        if let OrderRef::Unbound(_) = self {
            *self = OrderRef::Bound(id);
        }
    }
}

/// A strategy order registered before submission and alive until the host
/// reports fill, cancellation, or rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub signal: Signal,
    pub symbol: String,
    pub side: TradeSide,
    pub volume: f64,
    pub kind: OrderKind,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub expiration: Option<DateTime<Utc>>,
    pub host_ref: OrderRef,
    pub created_at: DateTime<Utc>,
}

impl PendingOrder {
    /// Price the order is working at, if any (limit orders only).
    pub fn target_price(&self) -> Option<f64> {
        match self.kind {
            OrderKind::Limit { price } => Some(price),
            OrderKind::Market => None,
        }
    }
}
