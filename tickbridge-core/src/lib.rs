//! TickBridge Core — tick replay, bar synthesis, and order reconciliation.
//!
//! This crate contains the adapter engine between a host trading platform
//! and a strategy written against synthesized bid/ask bar series:
//! - Domain types (ticks, timeframes, instruments)
//! - Bounded ring buffer with most-recent-first indexing
//! - Bar series in two modes: tick-replay synthesis and host pass-through
//! - Per-bar volume footprint by price level
//! - Bar sets with a postponed-reset new-bar flag
//! - Sync barrier for exactly-once strategy dispatch per logical tick
//! - Order reconciler mapping host callbacks onto the
//!   pending → position → trade lifecycle
//! - Engine with a panic boundary around every strategy hook

pub mod bars;
pub mod config;
pub mod domain;
pub mod engine;
pub mod footprint;
pub mod host;
pub mod orders;
pub mod series;
pub mod sync;

pub use bars::{BarSet, BarSetRegistry, SubscriptionKey};
pub use config::{ConfigError, EngineConfig};
pub use domain::{Instrument, Side, Tick, Timeframe};
pub use engine::{Engine, EngineError, OrderAction, TickContext};
pub use footprint::FootprintAccumulator;
pub use host::{GatewayError, HostSeries, OrderGateway, Strategy};
pub use orders::{
    ExecutionUpdate, HistoricalTrade, History, HostOrderId, HostOrderState, OrderKind,
    OrderReconciler, OrderRef, OrderRequest, OrderUpdate, PendingOrder, Position,
    ReconcileError, ReconcileEvent, Signal, TradeSide,
};
pub use series::{OhlcField, RingBuffer, Series};
pub use sync::SyncBarrier;
