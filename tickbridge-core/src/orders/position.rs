use crate::orders::events::HostOrderId;
use crate::orders::pending::{OrderRef, PendingOrder, TradeSide};
use crate::orders::signal::Signal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An open position, created when an order fills and destroyed when it
/// closes (at which point it becomes a [`HistoricalTrade`]).
///
/// [`HistoricalTrade`]: crate::orders::history::HistoricalTrade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub signal: Signal,
    pub symbol: String,
    pub side: TradeSide,
    pub volume: f64,
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub host_ref: OrderRef,
}

impl Position {
    /// Open from a filled pending order, carrying over label/comment and
    /// protective levels. `entry_handle` is the host order that filled.
    pub fn open_from(
        pending: &PendingOrder,
        entry_price: f64,
        entry_time: DateTime<Utc>,
        entry_handle: HostOrderId,
    ) -> Self {
        Self {
            signal: pending.signal.clone(),
            symbol: pending.symbol.clone(),
            side: pending.side,
            volume: pending.volume,
            entry_price,
            entry_time,
            stop_loss: pending.stop_loss,
            take_profit: pending.take_profit,
            host_ref: OrderRef::Bound(entry_handle),
        }
    }

    /// Signed gross profit of closing the full position at `exit_price`.
    pub fn gross_profit(&self, exit_price: f64) -> f64 {
        self.side.sign() * (exit_price - self.entry_price) * self.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::pending::OrderKind;

    fn pending(side: TradeSide) -> PendingOrder {
        let sig = Signal::new("p", "c").unwrap();
        PendingOrder {
            signal: sig.clone(),
            symbol: "EURUSD".into(),
            side,
            volume: 1000.0,
            kind: OrderKind::Market,
            stop_loss: Some(1.0900),
            take_profit: Some(1.1100),
            expiration: None,
            host_ref: OrderRef::Unbound(sig),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn open_carries_over_protective_levels() {
        let p = pending(TradeSide::Buy);
        let pos = Position::open_from(&p, 1.1000, Utc::now(), HostOrderId::new("7"));
        assert_eq!(pos.stop_loss, Some(1.0900));
        assert_eq!(pos.take_profit, Some(1.1100));
        assert_eq!(pos.entry_price, 1.1000);
        assert!(pos.host_ref.is_bound());
    }

    #[test]
    fn gross_profit_sign_follows_side() {
        let long = Position::open_from(
            &pending(TradeSide::Buy),
            1.1000,
            Utc::now(),
            HostOrderId::new("1"),
        );
        assert!((long.gross_profit(1.1050) - 5.0).abs() < 1e-9);

        let short = Position::open_from(
            &pending(TradeSide::Sell),
            1.1000,
            Utc::now(),
            HostOrderId::new("2"),
        );
        assert!((short.gross_profit(1.1050) + 5.0).abs() < 1e-9);
    }
}
