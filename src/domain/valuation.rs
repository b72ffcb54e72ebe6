//! Portfolio valuation against a feed snapshot.

use super::feed::PriceFeedSnapshot;
use super::state::TradingState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioValuation {
    pub position_value: f64,
    pub cost_basis: f64,
    pub unrealized_pnl: f64,
    pub total_value: f64,
    pub daily_pnl: f64,
    /// Zero when there is no cost basis.
    pub total_return_pct: f64,
}

pub fn value_portfolio(state: &TradingState, feed: &PriceFeedSnapshot) -> PortfolioValuation {
    let position_value = state.position_quantity * feed.spot_price;
    let cost_basis = state.position_quantity * state.average_cost_per_unit;
    let unrealized_pnl = position_value - cost_basis;
    let total_return_pct = if cost_basis > 0.0 {
        unrealized_pnl / cost_basis * 100.0
    } else {
        0.0
    };

    PortfolioValuation {
        position_value,
        cost_basis,
        unrealized_pnl,
        total_value: state.cash_balance + position_value,
        daily_pnl: state.position_quantity * (feed.ohlc.close - feed.ohlc.open),
        total_return_pct,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskPreview {
    pub before: f64,
    pub after: f64,
    pub change: f64,
}

/// What a holding of `quantity` would be worth if the spot moved by `move_pct` percent.
pub fn risk_preview(quantity: f64, spot_price: f64, move_pct: f64) -> RiskPreview {
    let delta = spot_price * (move_pct / 100.0);
    let before = quantity * spot_price;
    let after = quantity * (spot_price + delta);
    RiskPreview {
        before,
        after,
        change: after - before,
    }
}
