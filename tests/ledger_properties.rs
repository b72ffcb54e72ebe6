//! Property tests for ledger accounting.
//!
//! Tests cover:
//! - Cash conservation across arbitrary buy/sell sequences
//! - Average cost is zero exactly when the position is flat
//! - Partial sells never move the average cost
//! - Position never goes negative

mod common;

use chrono::Duration;
use common::*;
use ouncebook::domain::ledger::Ledger;
use ouncebook::domain::trade::{Order, Side};
use proptest::prelude::*;

fn order_strategy() -> impl Strategy<Value = (bool, f64, f64)> {
    (any::<bool>(), 0.01f64..50.0, 1.0f64..100.0)
}

proptest! {
    #[test]
    fn cash_moves_by_trade_totals(orders in prop::collection::vec(order_strategy(), 1..30)) {
        let initial = 1_000_000.0;
        let mut ledger = Ledger::new(state_with_cash(initial));
        let start = utc(2026, 3, 2, 9, 0);
        let mut expected = initial;

        for (i, (is_buy, quantity, price)) in orders.into_iter().enumerate() {
            let order = if is_buy {
                Order::buy(quantity, price)
            } else {
                Order::sell(quantity, price)
            };
            expected += match order.side {
                Side::Buy => -quantity * price,
                Side::Sell => quantity * price,
            };
            ledger.execute(&order, start + Duration::seconds(i as i64)).unwrap();
        }

        prop_assert!((ledger.state().cash_balance - expected).abs() < 1e-6);
    }

    #[test]
    fn flat_position_has_zero_average_cost(orders in prop::collection::vec(order_strategy(), 1..30)) {
        let mut ledger = Ledger::new(state_with_cash(1_000_000.0));
        let start = utc(2026, 3, 2, 9, 0);

        for (i, (is_buy, quantity, price)) in orders.into_iter().enumerate() {
            let order = if is_buy {
                Order::buy(quantity, price)
            } else {
                Order::sell(quantity, price)
            };
            ledger.execute(&order, start + Duration::seconds(i as i64)).unwrap();

            let state = ledger.state();
            prop_assert!(state.position_quantity >= 0.0);
            if state.position_quantity == 0.0 {
                prop_assert_eq!(state.average_cost_per_unit, 0.0);
            } else {
                prop_assert!(state.average_cost_per_unit > 0.0);
            }
        }
    }

    #[test]
    fn partial_sell_keeps_average_cost(
        buys in prop::collection::vec((0.5f64..50.0, 1.0f64..100.0), 1..10),
        fraction in 0.01f64..0.99,
        sell_price in 1.0f64..100.0,
    ) {
        let mut ledger = Ledger::new(state_with_cash(1_000_000.0));
        let start = utc(2026, 3, 2, 9, 0);
        for (i, (quantity, price)) in buys.iter().enumerate() {
            ledger
                .execute(&Order::buy(*quantity, *price), start + Duration::seconds(i as i64))
                .unwrap();
        }
        let avg_before = ledger.state().average_cost_per_unit;
        let to_sell = ledger.state().position_quantity * fraction;

        ledger
            .execute(&Order::sell(to_sell, sell_price), start + Duration::hours(1))
            .unwrap();

        prop_assert_eq!(ledger.state().average_cost_per_unit, avg_before);
        prop_assert!(ledger.state().position_quantity > 0.0);
    }

    #[test]
    fn average_cost_stays_within_buy_prices(
        buys in prop::collection::vec((0.5f64..50.0, 1.0f64..100.0), 1..10),
    ) {
        let mut ledger = Ledger::new(state_with_cash(1_000_000.0));
        let start = utc(2026, 3, 2, 9, 0);
        for (i, (quantity, price)) in buys.iter().enumerate() {
            ledger
                .execute(&Order::buy(*quantity, *price), start + Duration::seconds(i as i64))
                .unwrap();
        }
        let lo = buys.iter().map(|b| b.1).fold(f64::INFINITY, f64::min);
        let hi = buys.iter().map(|b| b.1).fold(f64::NEG_INFINITY, f64::max);
        let avg = ledger.state().average_cost_per_unit;
        prop_assert!(avg >= lo - 1e-9 && avg <= hi + 1e-9);
    }
}
