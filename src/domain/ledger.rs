//! Ledger core: trade application and the single owner of [`TradingState`].
//!
//! [`execute_trade`] and [`apply_trade`] are pure. [`Ledger`] wraps a state,
//! funnels every mutation through one commit point, and notifies subscribed
//! [`StateObserver`]s after each commit. Admissibility (cash, inventory,
//! daily limits) is the caller's job; see [`crate::domain::guardrail`].

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use super::alert::{Alert, AlertTrigger};
use super::error::OunceError;
use super::state::{DisplayCurrency, TradingState};
use super::trade::{normalize_note, Order, Side, Trade};
use crate::ports::observer_port::StateObserver;

fn validate_order(order: &Order) -> Result<(), OunceError> {
    if !order.quantity.is_finite() || order.quantity <= 0.0 {
        return Err(OunceError::InvalidOrder {
            reason: format!("quantity must be positive, got {}", order.quantity),
        });
    }
    if !order.unit_price.is_finite() || order.unit_price <= 0.0 {
        return Err(OunceError::InvalidOrder {
            reason: format!("unit price must be positive, got {}", order.unit_price),
        });
    }
    Ok(())
}

/// Apply an already-built trade to a state.
///
/// BUY: cash falls by the cost and the average cost becomes the
/// volume-weighted mean of the old position and the new lot.
/// SELL: cash rises by the proceeds; the position floors at zero and the
/// average cost is kept unless the position is fully closed, in which case
/// it resets to zero.
pub fn apply_trade(state: &TradingState, trade: Trade) -> TradingState {
    let mut next = state.clone();
    let notional = trade.quantity * trade.unit_price;

    match trade.side {
        Side::Buy => {
            let new_position = state.position_quantity + trade.quantity;
            next.cash_balance = state.cash_balance - notional;
            next.position_quantity = new_position;
            next.average_cost_per_unit = if new_position > 0.0 {
                (state.average_cost_per_unit * state.position_quantity + notional) / new_position
            } else {
                0.0
            };
        }
        Side::Sell => {
            let new_position = (state.position_quantity - trade.quantity).max(0.0);
            next.cash_balance = state.cash_balance + notional;
            next.position_quantity = new_position;
            // exact zero only: a sub-unit remainder keeps its average cost
            if new_position == 0.0 {
                next.average_cost_per_unit = 0.0;
            }
        }
    }

    next.trade_history.insert(0, trade);
    next
}

/// Validate an order, stamp it as a [`Trade`], and apply it.
pub fn execute_trade(
    state: &TradingState,
    order: &Order,
    id: Uuid,
    timestamp: DateTime<Utc>,
) -> Result<TradingState, OunceError> {
    validate_order(order)?;
    let trade = Trade {
        id,
        side: order.side,
        quantity: order.quantity,
        unit_price: order.unit_price,
        timestamp,
        note: normalize_note(order.note.as_deref()),
    };
    Ok(apply_trade(state, trade))
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Owner of the trading state. Every write goes through a single commit point.
pub struct Ledger {
    state: TradingState,
    observers: Vec<Box<dyn StateObserver>>,
}

impl Ledger {
    pub fn new(state: TradingState) -> Self {
        Ledger {
            state,
            observers: Vec::new(),
        }
    }

    pub fn state(&self) -> &TradingState {
        &self.state
    }

    pub fn subscribe(&mut self, observer: Box<dyn StateObserver>) {
        self.observers.push(observer);
    }

    fn commit(&mut self, next: TradingState) {
        self.state = next;
        for observer in self.observers.iter_mut() {
            observer.on_state_changed(&self.state);
        }
    }

    /// Execute an order without guardrail checks.
    pub fn execute(&mut self, order: &Order, timestamp: DateTime<Utc>) -> Result<&Trade, OunceError> {
        let next = execute_trade(&self.state, order, Uuid::new_v4(), timestamp)?;
        self.commit(next);

        // execute_trade always prepends
        let trade = &self.state.trade_history[0];
        info!(
            side = %trade.side,
            quantity = trade.quantity,
            unit_price = trade.unit_price,
            cash = self.state.cash_balance,
            position = self.state.position_quantity,
            "trade executed"
        );
        Ok(trade)
    }

    pub fn set_display_currency(&mut self, currency: DisplayCurrency) {
        if self.state.display_currency == currency {
            return;
        }
        let mut next = self.state.clone();
        next.display_currency = currency;
        self.commit(next);
    }

    /// Returns false (and leaves the state alone) for a non-positive rate.
    pub fn set_fx_rate(&mut self, rate: f64) -> bool {
        if !positive(rate) {
            return false;
        }
        if self.state.fx_rate != rate {
            let mut next = self.state.clone();
            next.fx_rate = rate;
            self.commit(next);
        }
        true
    }

    /// Fractional limits are floored. Returns false when the limit is rejected.
    pub fn set_daily_trade_limit(&mut self, limit: f64) -> bool {
        let floored = limit.floor();
        if !positive(floored) || floored > f64::from(u32::MAX) {
            return false;
        }
        let limit = floored as u32;
        if self.state.daily_trade_limit == limit {
            return true;
        }
        let mut next = self.state.clone();
        next.daily_trade_limit = limit;
        self.commit(next);
        info!(limit, "daily trade limit updated");
        true
    }

    /// Flip cooling-off and return the new value.
    pub fn toggle_cooling_off(&mut self) -> bool {
        let mut next = self.state.clone();
        next.cooling_off = !next.cooling_off;
        self.commit(next);
        info!(cooling_off = self.state.cooling_off, "cooling-off toggled");
        self.state.cooling_off
    }

    pub fn set_max_position_quantity(&mut self, limit: f64) -> bool {
        if !positive(limit) {
            return false;
        }
        if self.state.max_position_quantity == limit {
            return true;
        }
        let mut next = self.state.clone();
        next.max_position_quantity = limit;
        self.commit(next);
        info!(limit, "max position updated");
        true
    }

    /// Add an alert in front of the existing ones.
    pub fn add_alert(&mut self, trigger: AlertTrigger, now: DateTime<Utc>) -> Result<Alert, OunceError> {
        if !positive(trigger.threshold()) {
            return Err(OunceError::InvalidAlert {
                reason: format!("threshold must be positive, got {}", trigger.threshold()),
            });
        }
        let alert = Alert {
            id: Uuid::new_v4(),
            trigger,
            created_at: now,
        };
        let mut next = self.state.clone();
        next.alerts.insert(0, alert.clone());
        self.commit(next);
        Ok(alert)
    }

    /// Remove an alert by id. Unknown ids are ignored.
    pub fn remove_alert(&mut self, id: Uuid) -> bool {
        if !self.state.alerts.iter().any(|a| a.id == id) {
            return false;
        }
        let mut next = self.state.clone();
        next.alerts.retain(|a| a.id != id);
        self.commit(next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alert::Direction;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn state(cash: f64, qty: f64, avg: f64) -> TradingState {
        TradingState {
            cash_balance: cash,
            position_quantity: qty,
            average_cost_per_unit: avg,
            ..TradingState::default()
        }
    }

    fn exec(state: &TradingState, order: Order) -> TradingState {
        execute_trade(state, &order, Uuid::new_v4(), Utc::now()).unwrap()
    }

    struct Recorder(Rc<RefCell<Vec<TradingState>>>);

    impl StateObserver for Recorder {
        fn on_state_changed(&mut self, state: &TradingState) {
            self.0.borrow_mut().push(state.clone());
        }
    }

    #[test]
    fn buys_accumulate_weighted_average() {
        let s0 = state(1000.0, 0.0, 0.0);
        let s1 = exec(&s0, Order::buy(10.0, 20.0));
        assert_relative_eq!(s1.cash_balance, 800.0);
        assert_relative_eq!(s1.position_quantity, 10.0);
        assert_relative_eq!(s1.average_cost_per_unit, 20.0);

        let s2 = exec(&s1, Order::buy(5.0, 30.0));
        assert_relative_eq!(s2.cash_balance, 650.0);
        assert_relative_eq!(s2.position_quantity, 15.0);
        assert_relative_eq!(s2.average_cost_per_unit, 23.3333, epsilon = 1e-4);
        assert_eq!(s2.trade_history.len(), 2);
        assert!((s2.trade_history[0].unit_price - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_sell_keeps_average_cost() {
        let next = exec(&state(500.0, 10.0, 25.0), Order::sell(4.0, 30.0));
        assert_relative_eq!(next.position_quantity, 6.0);
        assert_relative_eq!(next.average_cost_per_unit, 25.0);
        assert_relative_eq!(next.cash_balance, 620.0);
    }

    #[test]
    fn full_sell_resets_average_cost() {
        let next = exec(&state(500.0, 4.0, 25.0), Order::sell(4.0, 30.0));
        assert_relative_eq!(next.cash_balance, 620.0);
        assert_eq!(next.position_quantity, 0.0);
        assert_eq!(next.average_cost_per_unit, 0.0);
    }

    #[test]
    fn oversell_floors_position_at_zero() {
        let next = exec(&state(0.0, 2.0, 25.0), Order::sell(5.0, 10.0));
        assert_eq!(next.position_quantity, 0.0);
        assert_eq!(next.average_cost_per_unit, 0.0);
        assert_relative_eq!(next.cash_balance, 50.0);
    }

    #[test]
    fn rejects_non_positive_quantity_and_price() {
        let s = state(1000.0, 0.0, 0.0);
        for order in [
            Order::buy(0.0, 20.0),
            Order::buy(-1.0, 20.0),
            Order::buy(1.0, 0.0),
            Order::sell(1.0, -3.0),
            Order::buy(f64::NAN, 20.0),
            Order::buy(1.0, f64::INFINITY),
        ] {
            let result = execute_trade(&s, &order, Uuid::new_v4(), Utc::now());
            assert!(
                matches!(result, Err(OunceError::InvalidOrder { .. })),
                "accepted {order:?}"
            );
        }
    }

    #[test]
    fn trade_record_carries_note_and_timestamp() {
        let ts = Utc::now();
        let id = Uuid::new_v4();
        let next = execute_trade(
            &state(1000.0, 0.0, 0.0),
            &Order::buy(1.0, 30.0).with_note("  first lot "),
            id,
            ts,
        )
        .unwrap();
        let trade = &next.trade_history[0];
        assert_eq!(trade.id, id);
        assert_eq!(trade.timestamp, ts);
        assert_eq!(trade.note.as_deref(), Some("first lot"));
    }

    #[test]
    fn ledger_notifies_observers_on_commit() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut ledger = Ledger::new(state(1000.0, 0.0, 0.0));
        ledger.subscribe(Box::new(Recorder(seen.clone())));

        ledger.execute(&Order::buy(2.0, 30.0), Utc::now()).unwrap();
        ledger.toggle_cooling_off();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_relative_eq!(seen[0].cash_balance, 940.0);
        assert!(seen[1].cooling_off);
    }

    #[test]
    fn failed_execute_does_not_notify() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut ledger = Ledger::new(TradingState::default());
        ledger.subscribe(Box::new(Recorder(seen.clone())));

        assert!(ledger.execute(&Order::buy(0.0, 30.0), Utc::now()).is_err());
        assert!(seen.borrow().is_empty());
        assert!(ledger.state().trade_history.is_empty());
    }

    #[test]
    fn settings_reject_non_positive_values() {
        let mut ledger = Ledger::new(TradingState::default());
        assert!(!ledger.set_fx_rate(0.0));
        assert!(!ledger.set_daily_trade_limit(0.5));
        assert!(!ledger.set_daily_trade_limit(f64::NAN));
        assert!(!ledger.set_max_position_quantity(-1.0));
        assert_eq!(ledger.state(), &TradingState::default());
    }

    #[test]
    fn daily_limit_is_floored() {
        let mut ledger = Ledger::new(TradingState::default());
        assert!(ledger.set_daily_trade_limit(7.9));
        assert_eq!(ledger.state().daily_trade_limit, 7);
    }

    #[test]
    fn unchanged_fx_rate_skips_commit() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut ledger = Ledger::new(TradingState::default());
        ledger.subscribe(Box::new(Recorder(seen.clone())));

        assert!(ledger.set_fx_rate(TradingState::default().fx_rate));
        assert!(seen.borrow().is_empty());
        assert!(ledger.set_fx_rate(1.4));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn alerts_add_newest_first_and_remove_by_id() {
        let mut ledger = Ledger::new(TradingState::default());
        let first = ledger
            .add_alert(
                AlertTrigger::Price {
                    direction: Direction::Above,
                    threshold: 32.0,
                },
                Utc::now(),
            )
            .unwrap();
        let second = ledger
            .add_alert(
                AlertTrigger::Move {
                    direction: Direction::Below,
                    threshold: 2.0,
                },
                Utc::now(),
            )
            .unwrap();

        assert_eq!(ledger.state().alerts[0].id, second.id);
        assert_eq!(ledger.state().alerts[1].id, first.id);

        assert!(ledger.remove_alert(first.id));
        assert!(!ledger.remove_alert(first.id));
        assert_eq!(ledger.state().alerts.len(), 1);
    }

    #[test]
    fn alert_threshold_must_be_positive() {
        let mut ledger = Ledger::new(TradingState::default());
        let result = ledger.add_alert(
            AlertTrigger::Move {
                direction: Direction::Below,
                threshold: -2.0,
            },
            Utc::now(),
        );
        assert!(matches!(result, Err(OunceError::InvalidAlert { .. })));
        assert!(ledger.state().alerts.is_empty());
    }

    #[test]
    fn unchanged_limits_skip_commit() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut ledger = Ledger::new(TradingState::default());
        ledger.subscribe(Box::new(Recorder(seen.clone())));

        let defaults = TradingState::default();
        assert!(ledger.set_daily_trade_limit(f64::from(defaults.daily_trade_limit) + 0.4));
        assert!(ledger.set_max_position_quantity(defaults.max_position_quantity));
        assert!(seen.borrow().is_empty());

        assert!(ledger.set_daily_trade_limit(8.0));
        assert!(ledger.set_max_position_quantity(60.0));
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn selling_exact_float_position_resets_cost() {
        let s1 = exec(&state(100.0, 0.0, 0.0), Order::buy(0.1, 20.0));
        let s2 = exec(&s1, Order::buy(0.2, 20.0));
        let held = s2.position_quantity;

        let flat = exec(&s2, Order::sell(held, 21.0));
        assert_eq!(flat.position_quantity, 0.0);
        assert_eq!(flat.average_cost_per_unit, 0.0);

        // selling the rounded display quantity leaves dust that keeps its cost
        let dusty = exec(&s2, Order::sell(0.3, 21.0));
        assert!(dusty.position_quantity > 0.0 && dusty.position_quantity < 1e-12);
        assert_relative_eq!(dusty.average_cost_per_unit, 20.0, epsilon = 1e-9);
    }
}
