//! Property tests for series and reconciliation invariants.
//!
//! Uses proptest to verify:
//! 1. Ring buffer bounds and most-recent-first ordering
//! 2. OHLC containment — high/low always bracket open and close
//! 3. Footprint totals equal side-classified bar volume
//! 4. Reconciler terminal-event idempotence under replayed callbacks

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use tickbridge_core::{
    BarSet, HostOrderId, HostOrderState, Instrument, OrderKind, OrderReconciler, OrderRequest,
    OrderUpdate, RingBuffer, Series, Side, Tick, Timeframe, TradeSide,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..2.0_f64).prop_map(|p| (p * 10_000.0).round() / 10_000.0)
}

fn arb_volume() -> impl Strategy<Value = f64> {
    (0.1..100.0_f64).prop_map(|v| (v * 10.0).round() / 10.0)
}

fn arb_tick() -> impl Strategy<Value = Tick> {
    (arb_price(), 1u32..40, arb_volume(), 0u8..3, 0i64..3600).prop_map(
        |(bid, spread_ticks, volume, aggressor, offset_sec)| {
            let ask = bid + spread_ticks as f64 * 0.0001;
            let trade_price = match aggressor {
                0 => bid,
                1 => ask,
                _ => (bid + ask) / 2.0,
            };
            Tick {
                time: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
                    + chrono::Duration::seconds(offset_sec),
                bid,
                ask,
                trade_price,
                trade_volume: volume,
            }
        },
    )
}

// ── 1. Ring buffer ───────────────────────────────────────────────────

proptest! {
    /// Length never exceeds capacity, and the retained suffix is readable
    /// most-recent-first.
    #[test]
    fn ring_buffer_bounds_and_order(
        values in prop::collection::vec(any::<i64>(), 0..200),
        capacity in 1usize..32,
    ) {
        let mut buf = RingBuffer::new(capacity);
        for &v in &values {
            buf.append(v);
        }
        prop_assert!(buf.len() <= capacity);
        prop_assert_eq!(buf.len(), values.len().min(capacity));

        for ago in 0..buf.len() {
            let expected = values[values.len() - 1 - ago];
            prop_assert_eq!(*buf.at(ago), expected);
        }
        prop_assert_eq!(buf.get(buf.len()), None);
    }
}

// ── 2. OHLC containment ──────────────────────────────────────────────

proptest! {
    /// For every retained bar, low <= open, close <= high, on both sides.
    #[test]
    fn ohlc_brackets_hold(ticks in prop::collection::vec(arb_tick(), 1..150)) {
        let mut ticks = ticks;
        ticks.sort_by_key(|t| t.time);

        let inst = Instrument::new("EURUSD", 0.0001, 1000.0, "USD");
        let mut set = BarSet::replay(&inst, Timeframe::minutes(1).unwrap(), 128).unwrap();
        for t in &ticks {
            set.on_tick(t);
        }

        for ago in 0..set.count() {
            for series in [set.bid(), set.ask()] {
                let (o, h, l, c) = (
                    series.open.at(ago),
                    series.high.at(ago),
                    series.low.at(ago),
                    series.close.at(ago),
                );
                prop_assert!(l <= o && o <= h);
                prop_assert!(l <= c && c <= h);
            }
        }
    }
}

// ── 3. Footprint totals ──────────────────────────────────────────────

proptest! {
    /// Footprint buckets for the in-progress bar sum exactly to that bar's
    /// side-classified volume.
    #[test]
    fn footprint_totals_match_bar_volume(ticks in prop::collection::vec(arb_tick(), 1..150)) {
        let mut ticks = ticks;
        ticks.sort_by_key(|t| t.time);

        let inst = Instrument::new("EURUSD", 0.0001, 1000.0, "USD");
        let mut set = BarSet::replay(&inst, Timeframe::minutes(1).unwrap(), 128).unwrap();
        for t in &ticks {
            set.on_tick(t);
        }

        for side in [Side::Bid, Side::Ask] {
            let bar_volume = match side {
                Side::Bid => set.bid().volume.at(0),
                Side::Ask => set.ask().volume.at(0),
            };
            prop_assert!((set.footprint().side_total(side) - bar_volume).abs() < 1e-9);
        }
    }
}

// ── 4. Reconciler idempotence ────────────────────────────────────────

proptest! {
    /// Replaying a terminal callback any number of times leaves exactly one
    /// position (for fills) or zero pendings (for cancels), never more.
    #[test]
    fn terminal_callbacks_are_idempotent(
        price in arb_price(),
        replays in 1usize..6,
        cancel in any::<bool>(),
    ) {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let mut rec = OrderReconciler::new(0.0);
        let (order, _) = rec
            .submit(
                OrderRequest {
                    label: "p1".into(),
                    comment: "entry".into(),
                    symbol: "EURUSD".into(),
                    side: TradeSide::Buy,
                    volume: 1000.0,
                    kind: OrderKind::Limit { price },
                    stop_loss: None,
                    take_profit: None,
                    expiration: None,
                },
                now,
            )
            .unwrap();

        let terminal = OrderUpdate {
            id: HostOrderId::new("o-1"),
            name: order.signal.encode(),
            symbol: "EURUSD".into(),
            state: if cancel {
                HostOrderState::Cancelled
            } else {
                HostOrderState::Filled
            },
            limit_price: Some(price),
            avg_fill_price: (!cancel).then_some(price),
            time: now,
        };
        for _ in 0..replays {
            rec.on_order_update(&terminal);
        }

        prop_assert!(rec.pending(&order.signal).is_none());
        if cancel {
            prop_assert!(rec.position(&order.signal).is_none());
        } else {
            prop_assert!(rec.position(&order.signal).is_some());
            prop_assert_eq!(rec.position(&order.signal).unwrap().entry_price, price);
        }
        prop_assert_eq!(rec.history().count(), 0);
    }
}
