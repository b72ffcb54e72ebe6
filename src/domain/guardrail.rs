//! Pre-trade admissibility checks.
//!
//! Checks run in a fixed order and the first failure wins:
//! cooling-off, daily trade limit, position sufficiency (sells), cash
//! sufficiency (buys). An admitted trade carries an advisory flag when the
//! projected position would exceed the configured maximum.

use chrono::{DateTime, TimeZone};

use super::state::TradingState;
use super::trade::{Order, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Denial {
    CoolingOff,
    DailyLimit,
    InsufficientPosition,
    InsufficientCash,
}

impl Denial {
    pub fn code(&self) -> &'static str {
        match self {
            Denial::CoolingOff => "COOLING_OFF",
            Denial::DailyLimit => "DAILY_LIMIT",
            Denial::InsufficientPosition => "INSUFFICIENT_POSITION",
            Denial::InsufficientCash => "INSUFFICIENT_CASH",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Denial::CoolingOff => "cooling off is enabled; disable it to trade",
            Denial::DailyLimit => "daily trade limit reached",
            Denial::InsufficientPosition => "not enough units to sell",
            Denial::InsufficientCash => "not enough cash for this buy",
        }
    }
}

impl std::fmt::Display for Denial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admissible { exceeds_max_position: bool },
    Denied(Denial),
}

impl Admission {
    pub fn is_admissible(&self) -> bool {
        matches!(self, Admission::Admissible { .. })
    }
}

/// Trades whose timestamp falls on the same calendar day as `now`, in `now`'s zone.
pub fn trades_today<Tz: TimeZone>(state: &TradingState, now: &DateTime<Tz>) -> usize {
    let zone = now.timezone();
    let today = now.date_naive();
    state
        .trade_history
        .iter()
        .filter(|t| t.timestamp.with_timezone(&zone).date_naive() == today)
        .count()
}

pub fn trades_remaining<Tz: TimeZone>(state: &TradingState, now: &DateTime<Tz>) -> usize {
    (state.daily_trade_limit as usize).saturating_sub(trades_today(state, now))
}

/// Position after the order, floored at zero for sells.
pub fn projected_position(state: &TradingState, order: &Order) -> f64 {
    match order.side {
        Side::Buy => state.position_quantity + order.quantity,
        Side::Sell => (state.position_quantity - order.quantity).max(0.0),
    }
}

pub fn can_execute<Tz: TimeZone>(
    state: &TradingState,
    order: &Order,
    now: &DateTime<Tz>,
) -> Admission {
    if state.cooling_off {
        return Admission::Denied(Denial::CoolingOff);
    }
    if trades_today(state, now) >= state.daily_trade_limit as usize {
        return Admission::Denied(Denial::DailyLimit);
    }
    match order.side {
        Side::Sell if order.quantity > state.position_quantity => {
            return Admission::Denied(Denial::InsufficientPosition);
        }
        Side::Buy if order.notional() > state.cash_balance => {
            return Admission::Denied(Denial::InsufficientCash);
        }
        _ => {}
    }

    Admission::Admissible {
        exceeds_max_position: projected_position(state, order) > state.max_position_quantity,
    }
}
